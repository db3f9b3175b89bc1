use schoolhouse_models::{AccountId, Role};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Access token claims.
///
/// Carries enough to authorize a request without a database lookup: the
/// account id, the email used for ownership checks, and the fixed role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    /// Account id (subject)
    pub sub: String,
    pub email: String,
    pub role: Role,
    /// Expiration (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

impl Claims {
    /// Parses the subject back into an [`AccountId`].
    pub fn account_id(&self) -> Option<AccountId> {
        self.sub.parse().ok()
    }

    pub fn is_teacher(&self) -> bool {
        self.role == Role::Teacher
    }

    pub fn is_student(&self) -> bool {
        self.role == Role::Student
    }
}
