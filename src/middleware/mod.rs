//! Request extractors and middleware for cross-cutting concerns.
//!
//! - [`auth`]: bearer-token authentication and the caller identity used by
//!   ownership checks
//! - [`role`]: role guards (`RequireTeacher`, `RequireStudent`)
//! - [`rate_limit`]: per-client throttling for the auth endpoints
//!
//! # Authentication flow
//!
//! 1. Client sends `Authorization: Bearer <token>`
//! 2. [`auth::AuthUser`] verifies the JWT and yields its claims
//! 3. A role guard, if present, checks the claimed role
//! 4. The service applies any ownership rule with the caller's email
//!
//! ```ignore
//! use crate::middleware::role::RequireTeacher;
//!
//! async fn list_students(RequireTeacher(auth_user): RequireTeacher) -> impl IntoResponse {
//!     // only TEACHER tokens reach this point
//! }
//! ```

pub mod auth;
pub mod rate_limit;
pub mod role;
