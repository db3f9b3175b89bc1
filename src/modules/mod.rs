pub mod auth;
pub mod courses;
pub mod departments;
pub mod students;
pub mod teachers;
