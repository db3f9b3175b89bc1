//! # Schoolhouse Core
//!
//! Core types, errors, and utilities shared by every Schoolhouse crate.
//!
//! - [`errors`]: the error taxonomy and its HTTP response conversion
//! - [`ownership`]: who may modify or remove a student profile
//! - [`pagination`]: limit/offset/page query handling
//! - [`password`]: bcrypt hashing and verification
//! - [`serde`]: lenient query-string deserializers
//!
//! # Example
//!
//! ```ignore
//! use schoolhouse_core::{AppError, ErrorKind};
//!
//! let err = AppError::not_found(anyhow::anyhow!("Department not found"));
//! assert_eq!(err.kind, ErrorKind::NotFound);
//! ```

pub mod errors;
pub mod ownership;
pub mod pagination;
pub mod password;
pub mod serde;

pub use errors::{AppError, ErrorKind, ErrorResponse};
pub use pagination::{PaginationMeta, PaginationParams};
pub use password::{hash_password, verify_password};
