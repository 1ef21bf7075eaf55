//! # pt-core
//!
//! Core types, traits, and utilities for Project Tracker.
//!
//! This crate provides the foundational building blocks used across all other crates:
//! - Common error types and the `TrackerResult` alias
//! - Core traits (Entity, Identifiable, Timestamped, ProjectScoped)
//! - Domain enumerations (roles and the three status machines)
//! - Configuration types

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::*;
pub use result::*;
pub use traits::*;
pub use types::*;
