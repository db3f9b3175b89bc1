use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use schoolhouse_auth::Claims;
use schoolhouse_core::{ErrorKind, ErrorResponse, PaginationMeta, PaginationParams};
use schoolhouse_models::{
    Account, ChangePasswordDto, Course, CreateCourseDto, CreateDepartmentDto,
    CreateStudentByTeacherDto, CreateTeacherDto, Department, LoginRequest, LoginResponse,
    MessageResponse, PaginatedCoursesResponse, PaginatedDepartmentsResponse,
    PaginatedStudentsResponse, PaginatedTeachersResponse, RegisterTeacherDto, Role, Student,
    Teacher, UpdateCourseDto, UpdateDepartmentDto, UpdateProfileDto, UpdateStudentDto,
    UpdateTeacherDto,
};

use crate::router::HealthResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::router::health,
        crate::modules::auth::controller::register_teacher,
        crate::modules::auth::controller::login,
        crate::modules::auth::controller::get_profile,
        crate::modules::auth::controller::update_profile,
        crate::modules::auth::controller::change_password,
        crate::modules::departments::controller::create_department,
        crate::modules::departments::controller::get_departments,
        crate::modules::departments::controller::get_department,
        crate::modules::departments::controller::update_department,
        crate::modules::departments::controller::delete_department,
        crate::modules::courses::controller::create_course,
        crate::modules::courses::controller::get_courses,
        crate::modules::courses::controller::get_course,
        crate::modules::courses::controller::update_course,
        crate::modules::courses::controller::delete_course,
        crate::modules::courses::controller::get_course_teachers,
        crate::modules::courses::controller::get_course_students,
        crate::modules::teachers::controller::create_teacher,
        crate::modules::teachers::controller::get_teachers,
        crate::modules::teachers::controller::get_teacher,
        crate::modules::teachers::controller::update_teacher,
        crate::modules::teachers::controller::delete_teacher,
        crate::modules::teachers::controller::assign_course,
        crate::modules::teachers::controller::unassign_course,
        crate::modules::teachers::controller::create_student_by_teacher,
        crate::modules::students::controller::get_students,
        crate::modules::students::controller::get_my_profile,
        crate::modules::students::controller::update_my_profile,
        crate::modules::students::controller::get_student,
        crate::modules::students::controller::update_student,
        crate::modules::students::controller::delete_student,
        crate::modules::students::controller::enroll_student,
        crate::modules::students::controller::unenroll_student,
    ),
    components(
        schemas(
            HealthResponse,
            Account,
            Role,
            Claims,
            RegisterTeacherDto,
            LoginRequest,
            LoginResponse,
            UpdateProfileDto,
            ChangePasswordDto,
            MessageResponse,
            Department,
            CreateDepartmentDto,
            UpdateDepartmentDto,
            PaginatedDepartmentsResponse,
            Course,
            CreateCourseDto,
            UpdateCourseDto,
            PaginatedCoursesResponse,
            Teacher,
            CreateTeacherDto,
            UpdateTeacherDto,
            PaginatedTeachersResponse,
            Student,
            CreateStudentByTeacherDto,
            UpdateStudentDto,
            PaginatedStudentsResponse,
            PaginationMeta,
            PaginationParams,
            ErrorResponse,
            ErrorKind,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness check"),
        (name = "Authentication", description = "Registration, login, profile and password"),
        (name = "Departments", description = "Department management"),
        (name = "Courses", description = "Course management and rosters"),
        (name = "Teachers", description = "Teacher profiles, course assignment and student provisioning"),
        (name = "Students", description = "Student profiles and enrollment")
    ),
    info(
        title = "Schoolhouse API",
        version = "0.1.0",
        description = "School management REST API with teacher-provisioned student profiles, built with Rust, Axum and PostgreSQL.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_student_routes() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        assert!(paths.contains_key("/api/teachers/{teacher_email}/students"));
        assert!(paths.contains_key("/api/students/{id}"));
        assert!(paths.contains_key("/api/students/me"));
        assert!(paths.contains_key("/health"));
    }

    #[test]
    fn test_bearer_scheme_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
