use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::StatusCode,
};
use tracing::instrument;

use schoolhouse_core::{AppError, ErrorResponse, PaginationParams};
use schoolhouse_models::{
    CourseId, CreateStudentByTeacherDto, DepartmentFilter, Student, TeacherId,
};

use crate::middleware::auth::AuthUser;
use crate::middleware::role::RequireTeacher;
use crate::modules::students::service::StudentService;
use crate::state::AppState;
use crate::validator::{ValidatedJson, invalid_query};

use super::model::{CreateTeacherDto, PaginatedTeachersResponse, Teacher, UpdateTeacherDto};
use super::service::TeacherService;

#[utoipa::path(
    post,
    path = "/api/teachers",
    request_body = CreateTeacherDto,
    responses(
        (status = 201, description = "Teacher profile created", body = Teacher),
        (status = 400, description = "Duplicate email or teacher ID, or invalid input", body = ErrorResponse),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 404, description = "Department not found", body = ErrorResponse)
    ),
    tag = "Teachers",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_teacher(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateTeacherDto>,
) -> Result<(StatusCode, Json<Teacher>), AppError> {
    let teacher = TeacherService::create_teacher(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(teacher)))
}

#[utoipa::path(
    get,
    path = "/api/teachers",
    params(DepartmentFilter, PaginationParams),
    responses(
        (status = 200, description = "Paginated teachers", body = PaginatedTeachersResponse),
        (status = 401, description = "Unauthenticated", body = ErrorResponse)
    ),
    tag = "Teachers",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, filter, pagination))]
pub async fn get_teachers(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    filter: Result<Query<DepartmentFilter>, QueryRejection>,
    pagination: Result<Query<PaginationParams>, QueryRejection>,
) -> Result<Json<PaginatedTeachersResponse>, AppError> {
    let Query(filter) = filter.map_err(invalid_query)?;
    let Query(pagination) = pagination.map_err(invalid_query)?;
    let teachers =
        TeacherService::get_teachers(&state.db, filter.department_id(), pagination).await?;
    Ok(Json(teachers))
}

#[utoipa::path(
    get,
    path = "/api/teachers/{id}",
    params(("id" = i64, Path, description = "Teacher ID")),
    responses(
        (status = 200, description = "Teacher details", body = Teacher),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 404, description = "Teacher not found", body = ErrorResponse)
    ),
    tag = "Teachers",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_teacher(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<TeacherId>,
) -> Result<Json<Teacher>, AppError> {
    let teacher = TeacherService::get_teacher_by_id(&state.db, id).await?;
    Ok(Json(teacher))
}

#[utoipa::path(
    put,
    path = "/api/teachers/{id}",
    params(("id" = i64, Path, description = "Teacher ID")),
    request_body = UpdateTeacherDto,
    responses(
        (status = 200, description = "Teacher updated", body = Teacher),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 404, description = "Teacher or department not found", body = ErrorResponse)
    ),
    tag = "Teachers",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_teacher(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<TeacherId>,
    ValidatedJson(dto): ValidatedJson<UpdateTeacherDto>,
) -> Result<Json<Teacher>, AppError> {
    let teacher = TeacherService::update_teacher(&state.db, id, dto).await?;
    Ok(Json(teacher))
}

#[utoipa::path(
    delete,
    path = "/api/teachers/{id}",
    params(("id" = i64, Path, description = "Teacher ID")),
    responses(
        (status = 204, description = "Teacher deleted"),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 404, description = "Teacher not found", body = ErrorResponse)
    ),
    tag = "Teachers",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_teacher(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<TeacherId>,
) -> Result<StatusCode, AppError> {
    TeacherService::delete_teacher(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/teachers/{id}/courses/{course_id}",
    params(
        ("id" = i64, Path, description = "Teacher ID"),
        ("course_id" = i64, Path, description = "Course ID")
    ),
    responses(
        (status = 204, description = "Course assigned"),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 404, description = "Teacher or course not found", body = ErrorResponse)
    ),
    tag = "Teachers",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn assign_course(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path((id, course_id)): Path<(TeacherId, CourseId)>,
) -> Result<StatusCode, AppError> {
    TeacherService::assign_course(&state.db, id, course_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/api/teachers/{id}/courses/{course_id}",
    params(
        ("id" = i64, Path, description = "Teacher ID"),
        ("course_id" = i64, Path, description = "Course ID")
    ),
    responses(
        (status = 204, description = "Course unassigned"),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 404, description = "Teacher or course not found", body = ErrorResponse)
    ),
    tag = "Teachers",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn unassign_course(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path((id, course_id)): Path<(TeacherId, CourseId)>,
) -> Result<StatusCode, AppError> {
    TeacherService::unassign_course(&state.db, id, course_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Routed as `/{id}/students`; the segment carries the teacher's email.
#[utoipa::path(
    post,
    path = "/api/teachers/{teacher_email}/students",
    params(("teacher_email" = String, Path, description = "Email of the provisioning teacher; must be the caller's")),
    request_body = CreateStudentByTeacherDto,
    responses(
        (status = 201, description = "Student provisioned", body = Student),
        (status = 400, description = "Duplicate email or student ID, or invalid input", body = ErrorResponse),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 403, description = "Caller is not this teacher", body = ErrorResponse),
        (status = 404, description = "Teacher profile or department not found", body = ErrorResponse)
    ),
    tag = "Teachers",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn create_student_by_teacher(
    State(state): State<AppState>,
    RequireTeacher(auth_user): RequireTeacher,
    Path(teacher_email): Path<String>,
    ValidatedJson(dto): ValidatedJson<CreateStudentByTeacherDto>,
) -> Result<(StatusCode, Json<Student>), AppError> {
    if auth_user.email() != teacher_email {
        return Err(AppError::forbidden(
            "Teachers can only create students under their own email",
        ));
    }

    let student = StudentService::create_student_by_teacher(&state.db, dto, &teacher_email).await?;
    Ok((StatusCode::CREATED, Json(student)))
}
