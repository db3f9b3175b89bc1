//! Course models and DTOs.

use chrono::{DateTime, Utc};
use schoolhouse_core::PaginationMeta;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::ids::{CourseId, DepartmentId};

/// A course with its department's code and name joined in.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
pub struct Course {
    pub id: CourseId,
    pub name: String,
    #[schema(example = "CS101")]
    pub code: String,
    pub credits: i32,
    pub description: Option<String>,
    pub department_id: Option<DepartmentId>,
    pub department_code: Option<String>,
    pub department_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCourseDto {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 20, message = "Code must be 1-20 characters"))]
    pub code: String,
    #[validate(range(min = 0, max = 60, message = "Credits must be between 0 and 60"))]
    pub credits: i32,
    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,
    pub department_id: Option<DepartmentId>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCourseDto {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 20, message = "Code must be 1-20 characters"))]
    pub code: Option<String>,
    #[validate(range(min = 0, max = 60, message = "Credits must be between 0 and 60"))]
    pub credits: Option<i32>,
    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,
    pub department_id: Option<DepartmentId>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedCoursesResponse {
    pub data: Vec<Course>,
    pub meta: PaginationMeta,
}
