//! Core error types for Project Tracker
//!
//! Every engine operation classifies its failure into one of these kinds; the
//! outer request layer decides how to present them.

use std::collections::BTreeMap;
use thiserror::Error;

/// Core error type for all tracker operations
#[derive(Error, Debug)]
pub enum TrackerError {
    /// No identity was presented with the request
    #[error("Authentication required")]
    Unauthenticated,

    /// Identity present, but the role or ownership guard failed
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    /// Entity does not exist, or exists outside the caller's scope
    #[error("Not found: {entity} with id={id}")]
    NotFound { entity: &'static str, id: String },

    /// Requested transition is not allowed from the current state
    #[error("Invalid state: {message}")]
    InvalidState { message: String },

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl TrackerError {
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Shortcut for a single-field validation failure
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add(field, message);
        Self::Validation(errors)
    }

    /// HTTP status code mapping for errors
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Unauthenticated => 401,
            Self::Forbidden { .. } => 403,
            Self::NotFound { .. } => 404,
            Self::InvalidState { .. } => 409,
            Self::Validation(_) => 422,
            Self::Database(_) | Self::Storage(_) | Self::Internal(_) | Self::Config(_) => 500,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::Forbidden { .. } => "forbidden",
            Self::NotFound { .. } => "not_found",
            Self::InvalidState { .. } => "invalid_state",
            Self::Validation(_) => "validation_failed",
            Self::Database(_) => "database_error",
            Self::Storage(_) => "storage_error",
            Self::Internal(_) => "internal_error",
            Self::Config(_) => "configuration_error",
        }
    }

    /// Whether the failure was caused by the caller rather than the system
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

/// Validation errors collection, keyed by field name
#[derive(Error, Debug, Default, Clone, PartialEq, Eq)]
#[error("{}", self.full_messages().join(", "))]
pub struct ValidationErrors {
    /// Field-specific errors: field_name -> messages
    pub errors: BTreeMap<String, Vec<String>>,
    /// Errors not tied to a specific field
    pub base_errors: Vec<String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn add_base(&mut self, message: impl Into<String>) {
        self.base_errors.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.base_errors.is_empty()
    }

    /// Check if there are errors for a specific field
    pub fn has_error(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&Vec<String>> {
        self.errors.get(field)
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, messages) in other.errors {
            self.errors.entry(field).or_default().extend(messages);
        }
        self.base_errors.extend(other.base_errors);
    }

    pub fn full_messages(&self) -> Vec<String> {
        let mut messages = self.base_errors.clone();
        for (field, field_messages) in &self.errors {
            for msg in field_messages {
                messages.push(format!("{} {}", field, msg));
            }
        }
        messages
    }

    /// `Ok(())` when empty, otherwise the collected errors
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_collect() {
        let mut errors = ValidationErrors::new();
        assert!(errors.is_empty());

        errors.add("title", "can't be blank");
        errors.add("title", "is too long");
        errors.add_base("Project is closed");

        assert!(errors.has_error("title"));
        assert!(!errors.has_error("description"));
        assert_eq!(errors.get("title").map(|v| v.len()), Some(2));
        assert_eq!(
            errors.full_messages(),
            vec![
                "Project is closed".to_string(),
                "title can't be blank".to_string(),
                "title is too long".to_string(),
            ]
        );
    }

    #[test]
    fn test_merge() {
        let mut a = ValidationErrors::new();
        a.add("title", "can't be blank");
        let mut b = ValidationErrors::new();
        b.add("title", "is too long");
        b.add("cost", "must not be negative");

        a.merge(b);
        assert_eq!(a.get("title").map(|v| v.len()), Some(2));
        assert!(a.has_error("cost"));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(TrackerError::Unauthenticated.status_code(), 401);
        assert_eq!(TrackerError::forbidden("no").status_code(), 403);
        assert_eq!(TrackerError::not_found("Task", 1).status_code(), 404);
        assert_eq!(TrackerError::invalid_state("done").status_code(), 409);
        assert_eq!(
            TrackerError::invalid_field("title", "can't be blank").status_code(),
            422
        );
        assert!(!TrackerError::Database("down".into()).is_client_error());
    }

    #[test]
    fn test_validation_display() {
        let mut errors = ValidationErrors::new();
        errors.add("email", "is invalid");
        errors.add_base("Profile is locked");
        assert_eq!(errors.to_string(), "Profile is locked, email is invalid");

        let err = TrackerError::from(errors);
        assert_eq!(
            err.to_string(),
            "Validation failed: Profile is locked, email is invalid"
        );
    }

    #[test]
    fn test_not_found_message() {
        let err = TrackerError::not_found("Lead", 42);
        assert_eq!(err.to_string(), "Not found: Lead with id=42");
        assert_eq!(err.error_code(), "not_found");
    }
}
