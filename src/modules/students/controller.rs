use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::StatusCode,
};
use tracing::instrument;

use schoolhouse_core::{AppError, ErrorResponse, PaginationParams};
use schoolhouse_models::{CourseId, DepartmentId, StudentId};

use crate::middleware::auth::{AuthUser, Requester};
use crate::middleware::role::{RequireStudent, RequireTeacher};
use crate::state::AppState;
use crate::validator::{ValidatedJson, invalid_query};

use super::model::{PaginatedStudentsResponse, Student, StudentFilterParams, UpdateStudentDto};
use super::service::StudentService;

#[utoipa::path(
    get,
    path = "/api/students",
    params(StudentFilterParams, PaginationParams),
    responses(
        (status = 200, description = "Paginated students", body = PaginatedStudentsResponse),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 403, description = "Teachers only", body = ErrorResponse)
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, filter, pagination))]
pub async fn get_students(
    State(state): State<AppState>,
    _teacher: RequireTeacher,
    filter: Result<Query<StudentFilterParams>, QueryRejection>,
    pagination: Result<Query<PaginationParams>, QueryRejection>,
) -> Result<Json<PaginatedStudentsResponse>, AppError> {
    let Query(filter) = filter.map_err(invalid_query)?;
    let Query(pagination) = pagination.map_err(invalid_query)?;

    let students = StudentService::get_students(
        &state.db,
        filter.department_id.map(DepartmentId::from),
        filter.created_by,
        pagination,
    )
    .await?;
    Ok(Json(students))
}

#[utoipa::path(
    get,
    path = "/api/students/me",
    responses(
        (status = 200, description = "The caller's student profile", body = Student),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 403, description = "Students only", body = ErrorResponse),
        (status = 404, description = "No profile for this account", body = ErrorResponse)
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_my_profile(
    State(state): State<AppState>,
    RequireStudent(auth_user): RequireStudent,
) -> Result<Json<Student>, AppError> {
    let student = StudentService::get_student_by_email(&state.db, auth_user.email()).await?;
    Ok(Json(student))
}

#[utoipa::path(
    put,
    path = "/api/students/me",
    request_body = UpdateStudentDto,
    responses(
        (status = 200, description = "Profile updated", body = Student),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 403, description = "Students only", body = ErrorResponse),
        (status = 404, description = "No profile for this account, or department not found", body = ErrorResponse)
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn update_my_profile(
    State(state): State<AppState>,
    RequireStudent(auth_user): RequireStudent,
    ValidatedJson(dto): ValidatedJson<UpdateStudentDto>,
) -> Result<Json<Student>, AppError> {
    let student = StudentService::update_own_profile(&state.db, auth_user.email(), dto).await?;
    Ok(Json(student))
}

#[utoipa::path(
    get,
    path = "/api/students/{id}",
    params(("id" = i64, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Student details", body = Student),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_student(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<StudentId>,
) -> Result<Json<Student>, AppError> {
    let student = StudentService::get_student_by_id(&state.db, id).await?;
    Ok(Json(student))
}

#[utoipa::path(
    put,
    path = "/api/students/{id}",
    params(
        ("id" = i64, Path, description = "Student ID"),
        ("X-User-Email" = Option<String>, Header, description = "Acting principal's email; defaults to the token's")
    ),
    request_body = UpdateStudentDto,
    responses(
        (status = 200, description = "Student updated", body = Student),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 403, description = "Caller is neither the student nor the creating teacher", body = ErrorResponse),
        (status = 404, description = "Student or department not found", body = ErrorResponse)
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, requester, dto), fields(requester = %requester.email))]
pub async fn update_student(
    State(state): State<AppState>,
    requester: Requester,
    Path(id): Path<StudentId>,
    ValidatedJson(dto): ValidatedJson<UpdateStudentDto>,
) -> Result<Json<Student>, AppError> {
    let student = StudentService::update_student(&state.db, id, dto, &requester.email).await?;
    Ok(Json(student))
}

#[utoipa::path(
    delete,
    path = "/api/students/{id}",
    params(
        ("id" = i64, Path, description = "Student ID"),
        ("X-User-Email" = Option<String>, Header, description = "Acting principal's email; defaults to the token's")
    ),
    responses(
        (status = 204, description = "Student deleted"),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 403, description = "Caller is not the creating teacher", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, requester), fields(requester = %requester.email))]
pub async fn delete_student(
    State(state): State<AppState>,
    requester: Requester,
    Path(id): Path<StudentId>,
) -> Result<StatusCode, AppError> {
    StudentService::delete_student(&state.db, id, &requester.email).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/students/{id}/courses/{course_id}",
    params(
        ("id" = i64, Path, description = "Student ID"),
        ("course_id" = i64, Path, description = "Course ID"),
        ("X-User-Email" = Option<String>, Header, description = "Acting principal's email; defaults to the token's")
    ),
    responses(
        (status = 204, description = "Student enrolled"),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 403, description = "Caller is neither the student nor the creating teacher", body = ErrorResponse),
        (status = 404, description = "Student or course not found", body = ErrorResponse)
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, requester), fields(requester = %requester.email))]
pub async fn enroll_student(
    State(state): State<AppState>,
    requester: Requester,
    Path((id, course_id)): Path<(StudentId, CourseId)>,
) -> Result<StatusCode, AppError> {
    StudentService::enroll_student(&state.db, id, course_id, &requester.email).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/api/students/{id}/courses/{course_id}",
    params(
        ("id" = i64, Path, description = "Student ID"),
        ("course_id" = i64, Path, description = "Course ID"),
        ("X-User-Email" = Option<String>, Header, description = "Acting principal's email; defaults to the token's")
    ),
    responses(
        (status = 204, description = "Student unenrolled"),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 403, description = "Caller is neither the student nor the creating teacher", body = ErrorResponse),
        (status = 404, description = "Student or course not found", body = ErrorResponse)
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, requester), fields(requester = %requester.email))]
pub async fn unenroll_student(
    State(state): State<AppState>,
    requester: Requester,
    Path((id, course_id)): Path<(StudentId, CourseId)>,
) -> Result<StatusCode, AppError> {
    StudentService::unenroll_student(&state.db, id, course_id, &requester.email).await?;
    Ok(StatusCode::NO_CONTENT)
}
