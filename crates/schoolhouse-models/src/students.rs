//! Student profile models and DTOs.
//!
//! Students never register themselves. A teacher provisions the profile,
//! and the teacher's email is stored in `created_by`.

use chrono::{DateTime, NaiveDate, Utc};
use schoolhouse_core::PaginationMeta;
use schoolhouse_core::serde::deserialize_optional_i64;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::ids::{DepartmentId, StudentId};
use crate::validation::non_blank;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
pub struct Student {
    pub id: StudentId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// School-issued student number
    pub student_id: String,
    pub date_of_birth: Option<NaiveDate>,
    pub enrollment_date: NaiveDate,
    /// Email of the teacher who provisioned this profile
    pub created_by: String,
    pub department_id: Option<DepartmentId>,
    pub department_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /api/teachers/{teacher_email}/students`.
///
/// When `password` is present a STUDENT login account is provisioned for
/// the same email.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateStudentByTeacherDto {
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
    #[validate(length(min = 1, max = 20, message = "Student ID must be 1-20 characters"))]
    pub student_id: String,
    pub date_of_birth: Option<NaiveDate>,
    pub department_id: DepartmentId,
    #[validate(length(min = 6, max = 100, message = "Password must be 6-100 characters"))]
    pub password: Option<String>,
}

/// Partial patch; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateStudentDto {
    #[validate(
        length(min = 1, max = 50, message = "First name must be 1-50 characters"),
        custom(function = "non_blank")
    )]
    pub first_name: Option<String>,
    #[validate(
        length(min = 1, max = 50, message = "Last name must be 1-50 characters"),
        custom(function = "non_blank")
    )]
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub department_id: Option<DepartmentId>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedStudentsResponse {
    pub data: Vec<Student>,
    pub meta: PaginationMeta,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StudentFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub department_id: Option<i64>,
    /// Only students provisioned by this teacher email
    pub created_by: Option<String>,
}
