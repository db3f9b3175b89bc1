use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::StatusCode,
};
use tracing::instrument;

use schoolhouse_core::{AppError, ErrorResponse, PaginationParams};
use schoolhouse_models::{CourseId, DepartmentFilter, Student, Teacher};

use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::validator::{ValidatedJson, invalid_query};

use super::model::{Course, CreateCourseDto, PaginatedCoursesResponse, UpdateCourseDto};
use super::service::CourseService;

#[utoipa::path(
    post,
    path = "/api/courses",
    request_body = CreateCourseDto,
    responses(
        (status = 201, description = "Course created", body = Course),
        (status = 400, description = "Duplicate code or invalid input", body = ErrorResponse),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 404, description = "Department not found", body = ErrorResponse)
    ),
    tag = "Courses",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_course(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateCourseDto>,
) -> Result<(StatusCode, Json<Course>), AppError> {
    let course = CourseService::create_course(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

#[utoipa::path(
    get,
    path = "/api/courses",
    params(DepartmentFilter, PaginationParams),
    responses(
        (status = 200, description = "Paginated courses", body = PaginatedCoursesResponse),
        (status = 401, description = "Unauthenticated", body = ErrorResponse)
    ),
    tag = "Courses",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, filter, pagination))]
pub async fn get_courses(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    filter: Result<Query<DepartmentFilter>, QueryRejection>,
    pagination: Result<Query<PaginationParams>, QueryRejection>,
) -> Result<Json<PaginatedCoursesResponse>, AppError> {
    let Query(filter) = filter.map_err(invalid_query)?;
    let Query(pagination) = pagination.map_err(invalid_query)?;
    let courses =
        CourseService::get_courses(&state.db, filter.department_id(), pagination).await?;
    Ok(Json(courses))
}

#[utoipa::path(
    get,
    path = "/api/courses/{id}",
    params(("id" = i64, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course with its department code and name", body = Course),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse)
    ),
    tag = "Courses",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_course(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<CourseId>,
) -> Result<Json<Course>, AppError> {
    let course = CourseService::get_course_by_id(&state.db, id).await?;
    Ok(Json(course))
}

#[utoipa::path(
    put,
    path = "/api/courses/{id}",
    params(("id" = i64, Path, description = "Course ID")),
    request_body = UpdateCourseDto,
    responses(
        (status = 200, description = "Course updated", body = Course),
        (status = 400, description = "Duplicate code or invalid input", body = ErrorResponse),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 404, description = "Course or department not found", body = ErrorResponse)
    ),
    tag = "Courses",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_course(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<CourseId>,
    ValidatedJson(dto): ValidatedJson<UpdateCourseDto>,
) -> Result<Json<Course>, AppError> {
    let course = CourseService::update_course(&state.db, id, dto).await?;
    Ok(Json(course))
}

#[utoipa::path(
    delete,
    path = "/api/courses/{id}",
    params(("id" = i64, Path, description = "Course ID")),
    responses(
        (status = 204, description = "Course deleted"),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse)
    ),
    tag = "Courses",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_course(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<CourseId>,
) -> Result<StatusCode, AppError> {
    CourseService::delete_course(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/courses/{id}/teachers",
    params(("id" = i64, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Teachers assigned to the course", body = Vec<Teacher>),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse)
    ),
    tag = "Courses",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_course_teachers(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<CourseId>,
) -> Result<Json<Vec<Teacher>>, AppError> {
    let teachers = CourseService::get_course_teachers(&state.db, id).await?;
    Ok(Json(teachers))
}

#[utoipa::path(
    get,
    path = "/api/courses/{id}/students",
    params(("id" = i64, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Students enrolled in the course", body = Vec<Student>),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse)
    ),
    tag = "Courses",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_course_students(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<CourseId>,
) -> Result<Json<Vec<Student>>, AppError> {
    let students = CourseService::get_course_students(&state.db, id).await?;
    Ok(Json(students))
}
