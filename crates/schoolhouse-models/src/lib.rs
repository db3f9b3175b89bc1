//! # Schoolhouse Models
//!
//! Database entities and request/response DTOs.
//!
//! - [`accounts`]: login accounts, roles and authentication payloads
//! - [`courses`]: courses
//! - [`departments`]: departments and the department filter
//! - [`ids`]: typed identifiers
//! - [`students`]: teacher-provisioned student profiles
//! - [`teachers`]: teacher profiles
//! - [`validation`]: custom validation rules
//!
//! Relations are carried as foreign-key ids (`department_id`) plus the few
//! joined display columns a response needs; no model owns another.

pub mod accounts;
pub mod courses;
pub mod departments;
pub mod ids;
pub mod students;
pub mod teachers;
pub mod validation;

pub use accounts::{
    Account, ChangePasswordDto, LoginRequest, LoginResponse, MessageResponse, RegisterTeacherDto,
    Role, UpdateProfileDto,
};
pub use courses::{Course, CreateCourseDto, PaginatedCoursesResponse, UpdateCourseDto};
pub use departments::{
    CreateDepartmentDto, Department, DepartmentFilter, PaginatedDepartmentsResponse,
    UpdateDepartmentDto,
};
pub use ids::{AccountId, CourseId, DepartmentId, StudentId, TeacherId};
pub use students::{
    CreateStudentByTeacherDto, PaginatedStudentsResponse, Student, StudentFilterParams,
    UpdateStudentDto,
};
pub use teachers::{CreateTeacherDto, PaginatedTeachersResponse, Teacher, UpdateTeacherDto};
