use axum::{
    extract::FromRequestParts,
    http::{HeaderName, header, request::Parts},
};

use schoolhouse_auth::{Claims, verify_token};
use schoolhouse_core::AppError;
use schoolhouse_models::{AccountId, Role};

use crate::state::AppState;

/// Header that names the acting principal for ownership checks.
pub const USER_EMAIL_HEADER: HeaderName = HeaderName::from_static("x-user-email");

/// Extractor that validates the bearer token and provides its claims.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn account_id(&self) -> Result<AccountId, AppError> {
        self.0
            .account_id()
            .ok_or_else(|| AppError::unauthenticated("Invalid account id in token"))
    }

    pub fn email(&self) -> &str {
        &self.0.email
    }

    pub fn role(&self) -> Role {
        self.0.role
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthenticated("Missing authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::unauthenticated("Invalid authorization header format"))?;

        let claims = verify_token(token, &state.jwt_config)?;

        Ok(AuthUser(claims))
    }
}

/// The authenticated caller plus the email that ownership rules compare
/// against.
///
/// The email is the token's, unless the request carries a non-empty
/// `X-User-Email` header, in which case the header value is used.
#[derive(Debug, Clone)]
pub struct Requester {
    pub auth: AuthUser,
    pub email: String,
}

impl FromRequestParts<AppState> for Requester {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = AuthUser::from_request_parts(parts, state).await?;

        let email = parts
            .headers
            .get(&USER_EMAIL_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| auth.email().to_string());

        Ok(Requester { auth, email })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(sub: &str) -> Claims {
        Claims {
            sub: sub.to_string(),
            email: "ada@school.edu".to_string(),
            role: Role::Teacher,
            exp: 9999999999,
            iat: 1234567890,
        }
    }

    #[test]
    fn test_account_id_parses_subject() {
        let user = AuthUser(claims("12"));
        assert_eq!(user.account_id().unwrap(), AccountId(12));
        assert_eq!(user.email(), "ada@school.edu");
        assert_eq!(user.role(), Role::Teacher);
    }

    #[test]
    fn test_bad_subject_is_unauthenticated() {
        let err = AuthUser(claims("abc")).account_id().unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::UNAUTHORIZED);
    }
}
