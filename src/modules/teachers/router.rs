use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    assign_course, create_student_by_teacher, create_teacher, delete_teacher, get_teacher,
    get_teachers, unassign_course, update_teacher,
};

pub fn init_teachers_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_teacher).get(get_teachers))
        .route(
            "/{id}",
            get(get_teacher).put(update_teacher).delete(delete_teacher),
        )
        .route("/{id}/students", post(create_student_by_teacher))
        .route(
            "/{id}/courses/{course_id}",
            post(assign_course).delete(unassign_course),
        )
}
