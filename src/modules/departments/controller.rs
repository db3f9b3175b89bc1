use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::StatusCode,
};
use tracing::instrument;

use schoolhouse_core::{AppError, ErrorResponse, PaginationParams};
use schoolhouse_models::DepartmentId;

use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::validator::{ValidatedJson, invalid_query};

use super::model::{
    CreateDepartmentDto, Department, PaginatedDepartmentsResponse, UpdateDepartmentDto,
};
use super::service::DepartmentService;

#[utoipa::path(
    post,
    path = "/api/departments",
    request_body = CreateDepartmentDto,
    responses(
        (status = 201, description = "Department created", body = Department),
        (status = 400, description = "Duplicate code or name, or invalid input", body = ErrorResponse),
        (status = 401, description = "Unauthenticated", body = ErrorResponse)
    ),
    tag = "Departments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_department(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateDepartmentDto>,
) -> Result<(StatusCode, Json<Department>), AppError> {
    let department = DepartmentService::create_department(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(department)))
}

#[utoipa::path(
    get,
    path = "/api/departments",
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated departments", body = PaginatedDepartmentsResponse),
        (status = 401, description = "Unauthenticated", body = ErrorResponse)
    ),
    tag = "Departments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, pagination))]
pub async fn get_departments(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    pagination: Result<Query<PaginationParams>, QueryRejection>,
) -> Result<Json<PaginatedDepartmentsResponse>, AppError> {
    let Query(pagination) = pagination.map_err(invalid_query)?;
    let departments = DepartmentService::get_departments(&state.db, pagination).await?;
    Ok(Json(departments))
}

#[utoipa::path(
    get,
    path = "/api/departments/{id}",
    params(("id" = i64, Path, description = "Department ID")),
    responses(
        (status = 200, description = "Department details", body = Department),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 404, description = "Department not found", body = ErrorResponse)
    ),
    tag = "Departments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_department(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<DepartmentId>,
) -> Result<Json<Department>, AppError> {
    let department = DepartmentService::get_department_by_id(&state.db, id).await?;
    Ok(Json(department))
}

#[utoipa::path(
    put,
    path = "/api/departments/{id}",
    params(("id" = i64, Path, description = "Department ID")),
    request_body = UpdateDepartmentDto,
    responses(
        (status = 200, description = "Department updated", body = Department),
        (status = 400, description = "Duplicate code or name, or invalid input", body = ErrorResponse),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 404, description = "Department not found", body = ErrorResponse)
    ),
    tag = "Departments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_department(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<DepartmentId>,
    ValidatedJson(dto): ValidatedJson<UpdateDepartmentDto>,
) -> Result<Json<Department>, AppError> {
    let department = DepartmentService::update_department(&state.db, id, dto).await?;
    Ok(Json(department))
}

#[utoipa::path(
    delete,
    path = "/api/departments/{id}",
    params(("id" = i64, Path, description = "Department ID")),
    responses(
        (status = 204, description = "Department and its dependents deleted"),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 404, description = "Department not found", body = ErrorResponse)
    ),
    tag = "Departments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_department(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<DepartmentId>,
) -> Result<StatusCode, AppError> {
    DepartmentService::delete_department(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
