//! API handlers

use std::collections::HashMap;
use std::str::FromStr;

use axum::{
    extract::Multipart,
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use pt_services::{Attachment, Download};

use crate::error::{ApiError, ApiResult};

pub mod auth;
pub mod documents;
pub mod leads;
pub mod notifications;
pub mod projects;
pub mod tasks;
pub mod users;

/// Text fields and the optional `file` part of a multipart form
#[derive(Debug, Default)]
pub(crate) struct UploadForm {
    fields: HashMap<String, String>,
    file: Option<Attachment>,
}

impl UploadForm {
    pub async fn read(mut multipart: Multipart) -> ApiResult<Self> {
        let mut form = UploadForm::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::bad_request(e.to_string()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            if name == "file" {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(e.to_string()))?;
                // browsers send an empty part when no file was picked
                if !bytes.is_empty() {
                    form.file = Some(Attachment { filename, bytes });
                }
            } else {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(e.to_string()))?;
                form.fields.insert(name, value);
            }
        }
        Ok(form)
    }

    pub fn text(&self, name: &str) -> String {
        self.fields.get(name).cloned().unwrap_or_default()
    }

    /// Parsed value of a non-empty field
    pub fn parse<T: FromStr>(&self, name: &str) -> ApiResult<Option<T>> {
        match self.fields.get(name).map(|v| v.trim()).filter(|v| !v.is_empty()) {
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| ApiError::bad_request(format!("Invalid value for {}", name))),
            None => Ok(None),
        }
    }

    pub fn take_file(&mut self) -> Option<Attachment> {
        self.file.take()
    }
}

/// Send a stored file as an attachment
pub(crate) fn file_response(filename: &str, content_type: &str, bytes: impl Into<Bytes>) -> Response {
    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        filename.replace('"', "")
    ))
    .unwrap_or_else(|_| HeaderValue::from_static("attachment"));
    let content_type = HeaderValue::from_str(content_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
    let body: Bytes = bytes.into();

    (
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response()
}

pub(crate) fn download_response(download: Download) -> Response {
    file_response(&download.filename, &download.content_type, download.bytes)
}
