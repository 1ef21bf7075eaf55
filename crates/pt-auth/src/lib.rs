//! # pt-auth
//!
//! Authentication and authorization for Project Tracker.
//!
//! ## Features
//!
//! - JWT session tokens
//! - Argon2 password hashing
//! - Explicit per-request identity context
//! - Table-driven role policy: read scopes and write guards

pub mod context;
pub mod error;
pub mod jwt;
pub mod password;
pub mod policy;

pub use context::{CurrentUser, RequestContext};
pub use error::AuthError;
pub use jwt::{extract_bearer_token, Claims, JwtError, JwtService};
pub use password::{hash_password, verify_password};
pub use policy::{Action, Policy, Scope};
