use axum::{Json, extract::State, http::StatusCode};
use tracing::instrument;

use schoolhouse_core::{AppError, ErrorResponse};

use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::model::{
    Account, ChangePasswordDto, LoginRequest, LoginResponse, MessageResponse,
    RegisterTeacherDto, UpdateProfileDto,
};
use super::service::AuthService;

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterTeacherDto,
    responses(
        (status = 201, description = "Teacher account created", body = Account),
        (status = 400, description = "Duplicate email, mismatched passwords or invalid input", body = ErrorResponse),
        (status = 429, description = "Too many requests", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn register_teacher(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<RegisterTeacherDto>,
) -> Result<(StatusCode, Json<Account>), AppError> {
    let account = AuthService::register_teacher(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Invalid email or password", body = ErrorResponse),
        (status = 429, description = "Too many requests", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let response = AuthService::login(&state.db, dto, &state.jwt_config).await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current account", body = Account),
        (status = 401, description = "Unauthenticated", body = ErrorResponse),
        (status = 404, description = "Account no longer exists", body = ErrorResponse)
    ),
    tag = "Authentication",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Account>, AppError> {
    let account = AuthService::get_account_by_email(&state.db, auth_user.email()).await?;
    Ok(Json(account))
}

#[utoipa::path(
    put,
    path = "/api/auth/me",
    request_body = UpdateProfileDto,
    responses(
        (status = 200, description = "Profile updated", body = Account),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Unauthenticated", body = ErrorResponse)
    ),
    tag = "Authentication",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn update_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<UpdateProfileDto>,
) -> Result<Json<Account>, AppError> {
    let account = AuthService::update_profile(&state.db, auth_user.email(), dto).await?;
    Ok(Json(account))
}

#[utoipa::path(
    put,
    path = "/api/auth/password",
    request_body = ChangePasswordDto,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Passwords do not match or too short", body = ErrorResponse),
        (status = 401, description = "Unauthenticated", body = ErrorResponse)
    ),
    tag = "Authentication",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn change_password(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<ChangePasswordDto>,
) -> Result<Json<MessageResponse>, AppError> {
    AuthService::change_password(&state.db, auth_user.email(), dto).await?;
    Ok(Json(MessageResponse::new("Password changed successfully")))
}
