//! # Schoolhouse Auth
//!
//! Stateless bearer tokens for the Schoolhouse API.
//!
//! - [`claims`]: what an access token asserts about its holder
//! - [`jwt`]: signing and verification
//!
//! ```ignore
//! use schoolhouse_auth::{create_access_token, verify_token};
//!
//! let token = create_access_token(account.id, &account.email, account.role, &config)?;
//! let claims = verify_token(&token, &config)?;
//! assert_eq!(claims.email, account.email);
//! ```

pub mod claims;
pub mod jwt;

pub use claims::Claims;
pub use jwt::{create_access_token, verify_token};
