use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

use super::controller::{change_password, get_profile, login, register_teacher, update_profile};

pub fn init_auth_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register_teacher))
        .route("/login", post(login))
        .route("/me", get(get_profile).put(update_profile))
        .route("/password", put(change_password))
}
