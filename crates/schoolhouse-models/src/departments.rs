//! Department models and DTOs.

use chrono::{DateTime, NaiveDate, Utc};
use schoolhouse_core::PaginationMeta;
use schoolhouse_core::serde::deserialize_optional_i64;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::ids::DepartmentId;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
pub struct Department {
    pub id: DepartmentId,
    pub name: String,
    /// Short unique code, e.g. `CS`
    pub code: String,
    pub established_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateDepartmentDto {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    #[schema(example = "Computer Science")]
    pub name: String,
    #[validate(length(min = 1, max = 10, message = "Code must be 1-10 characters"))]
    #[schema(example = "CS")]
    pub code: String,
    pub established_date: Option<NaiveDate>,
    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,
}

/// Only provided fields overwrite the stored department.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateDepartmentDto {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 10, message = "Code must be 1-10 characters"))]
    pub code: Option<String>,
    pub established_date: Option<NaiveDate>,
    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedDepartmentsResponse {
    pub data: Vec<Department>,
    pub meta: PaginationMeta,
}

/// Narrows a listing to records filed under one department.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DepartmentFilter {
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub department_id: Option<i64>,
}

impl DepartmentFilter {
    pub fn department_id(&self) -> Option<DepartmentId> {
        self.department_id.map(DepartmentId::from)
    }
}
