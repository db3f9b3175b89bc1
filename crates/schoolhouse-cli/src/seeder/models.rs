//! Seed records and the configuration controlling how many are generated.

use chrono::NaiveDate;
use schoolhouse_models::DepartmentId;

/// Prefix on every seeded department code; used to find them again on clear.
pub const SEED_DEPARTMENT_PREFIX: &str = "SD";
/// Every seeded account and profile uses this email domain.
pub const SEED_EMAIL_DOMAIN: &str = "example.com";
/// Password for every seeded login account.
pub const SEED_PASSWORD: &str = "password123";

pub struct DepartmentSeed {
    pub name: String,
    pub code: String,
    pub established_date: Option<NaiveDate>,
    pub description: Option<String>,
}

pub struct CourseSeed {
    pub name: String,
    pub code: String,
    pub credits: i32,
    pub department_id: DepartmentId,
}

pub struct TeacherSeed {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub teacher_id: String,
    pub hire_date: Option<NaiveDate>,
    pub specialization: Option<String>,
    pub department_id: DepartmentId,
}

pub struct StudentSeed {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub student_id: String,
    pub date_of_birth: Option<NaiveDate>,
    /// Email of the provisioning teacher
    pub created_by: String,
    pub department_id: DepartmentId,
}

/// A seeded teacher, as needed to provision its students.
#[derive(Clone, Debug)]
pub struct SeededTeacher {
    pub email: String,
    pub department_id: DepartmentId,
}

#[derive(Clone, Debug)]
pub struct SeedConfig {
    pub departments: usize,
    pub courses_per_department: usize,
    pub teachers_per_department: usize,
    pub students_per_teacher: usize,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            departments: 5,
            courses_per_department: 6,
            teachers_per_department: 4,
            students_per_teacher: 20,
        }
    }
}

impl SeedConfig {
    pub fn total_teachers(&self) -> usize {
        self.departments * self.teachers_per_department
    }

    pub fn total_students(&self) -> usize {
        self.total_teachers() * self.students_per_teacher
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals() {
        let config = SeedConfig {
            departments: 3,
            courses_per_department: 2,
            teachers_per_department: 4,
            students_per_teacher: 10,
        };
        assert_eq!(config.total_teachers(), 12);
        assert_eq!(config.total_students(), 120);
    }
}
