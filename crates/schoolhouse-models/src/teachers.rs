//! Teacher profile models and DTOs.

use chrono::{DateTime, NaiveDate, Utc};
use schoolhouse_core::PaginationMeta;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::ids::{DepartmentId, TeacherId};
use crate::validation::non_blank;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
pub struct Teacher {
    pub id: TeacherId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Staff identifier issued by the school, e.g. `T-0042`
    pub teacher_id: String,
    pub date_of_birth: Option<NaiveDate>,
    pub hire_date: Option<NaiveDate>,
    pub specialization: Option<String>,
    pub department_id: Option<DepartmentId>,
    pub department_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateTeacherDto {
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
    #[validate(length(min = 1, max = 20, message = "Teacher ID must be 1-20 characters"))]
    pub teacher_id: String,
    pub date_of_birth: Option<NaiveDate>,
    pub hire_date: Option<NaiveDate>,
    #[validate(length(max = 500, message = "Specialization must be at most 500 characters"))]
    pub specialization: Option<String>,
    pub department_id: Option<DepartmentId>,
}

/// Email and teacher ID are fixed once the profile exists.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateTeacherDto {
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
    pub hire_date: Option<NaiveDate>,
    #[validate(length(max = 500, message = "Specialization must be at most 500 characters"))]
    pub specialization: Option<String>,
    pub department_id: Option<DepartmentId>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedTeachersResponse {
    pub data: Vec<Teacher>,
    pub meta: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_teacher_id_required() {
        let dto = CreateTeacherDto {
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
            email: "grace@school.edu".to_string(),
            teacher_id: String::new(),
            date_of_birth: None,
            hire_date: None,
            specialization: None,
            department_id: None,
        };
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("teacher_id"));
    }
}
