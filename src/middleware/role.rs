//! Role guards.
//!
//! Each guard authenticates the request and then checks the token's role,
//! rejecting other roles with `UNAUTHORIZED` (403).
//!
//! ```rust,ignore
//! use crate::middleware::role::RequireStudent;
//!
//! pub async fn get_my_profile(
//!     RequireStudent(auth_user): RequireStudent,
//! ) -> Result<Json<Student>, AppError> {
//!     // only students get here
//! }
//! ```

use schoolhouse_core::AppError;
use schoolhouse_models::Role;

use crate::middleware::auth::AuthUser;

/// Fails with `UNAUTHORIZED` unless the caller holds `required`.
pub fn check_role(auth_user: &AuthUser, required: Role) -> Result<(), AppError> {
    if auth_user.role() != required {
        return Err(AppError::forbidden(format!(
            "Access denied. {} role required",
            required
        )));
    }
    Ok(())
}

macro_rules! require_role {
    ($name:ident, $role:expr) => {
        #[derive(Debug, Clone)]
        pub struct $name(pub $crate::middleware::auth::AuthUser);

        impl axum::extract::FromRequestParts<$crate::state::AppState> for $name {
            type Rejection = schoolhouse_core::AppError;

            async fn from_request_parts(
                parts: &mut axum::http::request::Parts,
                state: &$crate::state::AppState,
            ) -> Result<Self, Self::Rejection> {
                let auth_user =
                    $crate::middleware::auth::AuthUser::from_request_parts(parts, state).await?;
                check_role(&auth_user, $role)?;
                Ok($name(auth_user))
            }
        }
    };
}

require_role!(RequireTeacher, Role::Teacher);
require_role!(RequireStudent, Role::Student);

#[cfg(test)]
mod tests {
    use super::*;
    use schoolhouse_auth::Claims;
    use schoolhouse_core::ErrorKind;

    fn auth_user(role: Role) -> AuthUser {
        AuthUser(Claims {
            sub: "1".to_string(),
            email: "someone@school.edu".to_string(),
            role,
            exp: 9999999999,
            iat: 1234567890,
        })
    }

    #[test]
    fn test_matching_role_passes() {
        assert!(check_role(&auth_user(Role::Teacher), Role::Teacher).is_ok());
        assert!(check_role(&auth_user(Role::Student), Role::Student).is_ok());
    }

    #[test]
    fn test_other_role_is_forbidden() {
        let err = check_role(&auth_user(Role::Student), Role::Teacher).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unauthorized);
        assert_eq!(err.error.to_string(), "Access denied. TEACHER role required");
    }
}
