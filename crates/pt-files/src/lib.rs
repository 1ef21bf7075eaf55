//! # pt-files
//!
//! Blob storage for uploaded documents and lead attachments.
//!
//! The engine never interprets file contents: bytes go in with a filename
//! hint and come back out with a content type.

pub mod storage;

pub use storage::{
    content_type_for, original_filename, storage_key, FileMetadata, LocalStorage, MemoryStorage, Storage,
    StorageError, StorageResult,
};
