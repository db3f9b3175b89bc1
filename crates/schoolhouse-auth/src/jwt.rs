//! HS256 access tokens.
//!
//! Tokens are signed with `JWT_SECRET` and expire after
//! `JWT_ACCESS_EXPIRY` seconds. There are no refresh tokens; clients log in
//! again when a token expires.

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use schoolhouse_config::JwtConfig;
use schoolhouse_core::AppError;
use schoolhouse_models::{AccountId, Role};

use crate::claims::Claims;

pub fn create_access_token(
    account_id: AccountId,
    email: &str,
    role: Role,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    let now = Utc::now().timestamp() as usize;
    let exp = now + jwt_config.access_token_expiry.max(0) as usize;

    let claims = Claims {
        sub: account_id.to_string(),
        email: email.to_string(),
        role,
        exp,
        iat: now,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(|e| AppError::internal(anyhow::anyhow!("Failed to create token: {}", e)))
}

/// Verifies signature and expiry.
///
/// Every failure maps to `Unauthenticated`; the cause is not disclosed.
pub fn verify_token(token: &str, jwt_config: &JwtConfig) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::unauthenticated("Invalid or expired token"))
}
