//! Login accounts and authentication DTOs.
//!
//! An account is a login principal: email, password hash and a fixed
//! [`Role`]. Teacher and student *profiles* live in their own tables and
//! are matched to accounts by email.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use utoipa::ToSchema;
use validator::Validate;

use crate::ids::AccountId;
use crate::validation::non_blank;

/// Role of a login account. Set at creation and never changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "account_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Teacher,
    Student,
}

impl Role {
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Teacher => "TEACHER",
            Role::Student => "STUDENT",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Account {
    pub id: AccountId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
    pub date_of_birth: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Self-registration of a teacher account.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterTeacherDto {
    #[validate(
        length(min = 1, max = 50, message = "First name must be 1-50 characters"),
        custom(function = "non_blank")
    )]
    pub first_name: String,
    #[validate(
        length(min = 1, max = 50, message = "Last name must be 1-50 characters"),
        custom(function = "non_blank")
    )]
    pub last_name: String,
    #[validate(
        email(message = "Email must be valid"),
        length(max = 100, message = "Email must be at most 100 characters")
    )]
    pub email: String,
    #[validate(length(min = 6, max = 100, message = "Password must be 6-100 characters"))]
    #[schema(example = "secret123")]
    pub password: String,
    #[schema(example = "secret123")]
    pub confirm_password: String,
    pub date_of_birth: Option<NaiveDate>,
}

impl RegisterTeacherDto {
    pub fn passwords_match(&self) -> bool {
        self.password == self.confirm_password
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Email must be valid"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "secret123")]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    /// Seconds until the access token expires
    pub expires_in: i64,
    pub email: String,
    pub role: Role,
    pub full_name: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileDto {
    #[validate(
        length(min = 1, max = 50, message = "First name must be 1-50 characters"),
        custom(function = "non_blank")
    )]
    pub first_name: String,
    #[validate(
        length(min = 1, max = 50, message = "Last name must be 1-50 characters"),
        custom(function = "non_blank")
    )]
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ChangePasswordDto {
    #[validate(length(min = 6, max = 100, message = "Password must be at least 6 characters"))]
    pub new_password: String,
    pub confirm_password: String,
}

impl ChangePasswordDto {
    pub fn passwords_match(&self) -> bool {
        self.new_password == self.confirm_password
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
