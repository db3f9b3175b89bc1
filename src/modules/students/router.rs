use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    delete_student, enroll_student, get_my_profile, get_student, get_students, unenroll_student,
    update_my_profile, update_student,
};

pub fn init_students_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_students))
        .route("/me", get(get_my_profile).put(update_my_profile))
        .route(
            "/{id}",
            get(get_student).put(update_student).delete(delete_student),
        )
        .route(
            "/{id}/courses/{course_id}",
            post(enroll_student).delete(unenroll_student),
        )
}
