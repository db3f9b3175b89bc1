use anyhow::Context;
use sqlx::{PgConnection, PgPool};
use tracing::{info, instrument, warn};

use schoolhouse_core::ownership::{can_delete_student, can_update_student};
use schoolhouse_core::{AppError, PaginationMeta, PaginationParams, hash_password};
use schoolhouse_db::unique_violation;
use schoolhouse_models::{CourseId, DepartmentId, Role, StudentId};

use crate::metrics;
use crate::modules::courses::service::CourseService;
use crate::modules::departments::service::DepartmentService;
use crate::modules::teachers::service::TeacherService;

use super::model::{
    CreateStudentByTeacherDto, PaginatedStudentsResponse, Student, UpdateStudentDto,
};

/// Student columns plus the department name.
pub(crate) const STUDENT_SELECT: &str = "SELECT s.id, s.first_name, s.last_name, s.email, s.student_id,
        s.date_of_birth, s.enrollment_date, s.created_by, s.department_id,
        d.name AS department_name, s.created_at, s.updated_at
 FROM students s
 LEFT JOIN departments d ON d.id = s.department_id";

fn map_write_error(e: sqlx::Error, email: &str, student_id: &str) -> AppError {
    match unique_violation(&e) {
        Some("students_email_key") => AppError::duplicate(anyhow::anyhow!(
            "Student with email already exists: {}",
            email
        )),
        Some("accounts_email_key") => AppError::duplicate(anyhow::anyhow!(
            "User with email already exists: {}",
            email
        )),
        Some("students_student_id_key") => AppError::duplicate(anyhow::anyhow!(
            "Student ID already exists: {}",
            student_id
        )),
        _ => AppError::database(anyhow::Error::new(e).context("Failed to write student")),
    }
}

fn student_not_found(id: StudentId) -> AppError {
    AppError::not_found(anyhow::anyhow!("Student not found with id: {}", id))
}

async fn fetch_student(conn: &mut PgConnection, id: StudentId) -> Result<Student, AppError> {
    sqlx::query_as::<_, Student>(&format!("{STUDENT_SELECT} WHERE s.id = $1"))
        .bind(id)
        .fetch_optional(conn)
        .await
        .context("Failed to fetch student")
        .map_err(AppError::database)?
        .ok_or_else(|| student_not_found(id))
}

/// Loads the student and checks that `requester` may modify it.
async fn authorize_update(
    conn: &mut PgConnection,
    id: StudentId,
    requester: &str,
) -> Result<Student, AppError> {
    let student = fetch_student(conn, id).await?;

    if !can_update_student(&student.email, &student.created_by, requester) {
        warn!(student.id = %id, "Update denied for requester");
        return Err(AppError::forbidden(
            "Only the student or the teacher who created this profile can update it",
        ));
    }

    Ok(student)
}

async fn apply_update(
    conn: &mut PgConnection,
    id: StudentId,
    dto: &UpdateStudentDto,
    requester: &str,
) -> Result<Student, AppError> {
    let current = authorize_update(conn, id, requester).await?;

    if let Some(department_id) = dto.department_id
        && current.department_id != Some(department_id)
    {
        DepartmentService::ensure_exists(&mut *conn, department_id).await?;
    }

    sqlx::query(
        "UPDATE students
         SET first_name = COALESCE($2, first_name),
             last_name = COALESCE($3, last_name),
             date_of_birth = COALESCE($4, date_of_birth),
             department_id = COALESCE($5, department_id),
             updated_at = NOW()
         WHERE id = $1",
    )
    .bind(id)
    .bind(&dto.first_name)
    .bind(&dto.last_name)
    .bind(dto.date_of_birth)
    .bind(dto.department_id)
    .execute(&mut *conn)
    .await
    .context("Failed to update student")
    .map_err(AppError::database)?;

    fetch_student(conn, id).await
}

pub struct StudentService;

impl StudentService {
    /// Provisions a student on behalf of `teacher_email`.
    ///
    /// The teacher profile, both uniqueness checks, the department lookup
    /// and the insert share one transaction; any failure leaves nothing
    /// behind. With a `password`, a STUDENT login account is created in the
    /// same transaction.
    #[instrument(skip(db, dto), fields(student.email = %dto.email))]
    pub async fn create_student_by_teacher(
        db: &PgPool,
        dto: CreateStudentByTeacherDto,
        teacher_email: &str,
    ) -> Result<Student, AppError> {
        let mut tx = db
            .begin()
            .await
            .context("Failed to begin transaction")
            .map_err(AppError::database)?;

        let teacher = TeacherService::get_teacher_by_email(&mut *tx, teacher_email).await?;

        let (email_taken, id_taken) = sqlx::query_as::<_, (bool, bool)>(
            "SELECT EXISTS(SELECT 1 FROM students WHERE email = $1),
                    EXISTS(SELECT 1 FROM students WHERE student_id = $2)",
        )
        .bind(&dto.email)
        .bind(&dto.student_id)
        .fetch_one(&mut *tx)
        .await
        .context("Failed to check student uniqueness")
        .map_err(AppError::database)?;

        if email_taken {
            return Err(AppError::duplicate(anyhow::anyhow!(
                "Student with email already exists: {}",
                dto.email
            )));
        }
        if id_taken {
            return Err(AppError::duplicate(anyhow::anyhow!(
                "Student ID already exists: {}",
                dto.student_id
            )));
        }

        DepartmentService::ensure_exists(&mut *tx, dto.department_id).await?;

        let id = sqlx::query_scalar::<_, StudentId>(
            "INSERT INTO students
                 (first_name, last_name, email, student_id, date_of_birth, enrollment_date, created_by, department_id)
             VALUES ($1, $2, $3, $4, $5, CURRENT_DATE, $6, $7)
             RETURNING id",
        )
        .bind(&dto.first_name)
        .bind(&dto.last_name)
        .bind(&dto.email)
        .bind(&dto.student_id)
        .bind(dto.date_of_birth)
        .bind(&teacher.email)
        .bind(dto.department_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, &dto.email, &dto.student_id))?;

        if let Some(password) = &dto.password {
            let password_hash = hash_password(password)?;

            sqlx::query(
                "INSERT INTO accounts (first_name, last_name, email, password_hash, role, date_of_birth)
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(&dto.first_name)
            .bind(&dto.last_name)
            .bind(&dto.email)
            .bind(&password_hash)
            .bind(Role::Student)
            .bind(dto.date_of_birth)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_write_error(e, &dto.email, &dto.student_id))?;

            metrics::track_account_registered(Role::Student);
        }

        let student = fetch_student(&mut tx, id).await?;

        tx.commit()
            .await
            .context("Failed to commit student")
            .map_err(AppError::database)?;

        metrics::track_student_provisioned();
        info!(student.id = %student.id, created_by = %student.created_by, "Student provisioned");

        Ok(student)
    }

    #[instrument(skip(db))]
    pub async fn get_students(
        db: &PgPool,
        department_id: Option<DepartmentId>,
        created_by: Option<String>,
        pagination: PaginationParams,
    ) -> Result<PaginatedStudentsResponse, AppError> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM students
             WHERE ($1::BIGINT IS NULL OR department_id = $1)
               AND ($2::TEXT IS NULL OR created_by = $2)",
        )
        .bind(department_id)
        .bind(&created_by)
        .fetch_one(db)
        .await
        .context("Failed to count students")
        .map_err(AppError::database)?;

        let students = sqlx::query_as::<_, Student>(&format!(
            "{STUDENT_SELECT}
             WHERE ($1::BIGINT IS NULL OR s.department_id = $1)
               AND ($2::TEXT IS NULL OR s.created_by = $2)
             ORDER BY s.last_name, s.first_name
             LIMIT $3 OFFSET $4"
        ))
        .bind(department_id)
        .bind(&created_by)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(db)
        .await
        .context("Failed to fetch students")
        .map_err(AppError::database)?;

        Ok(PaginatedStudentsResponse {
            data: students,
            meta: PaginationMeta::new(total, &pagination),
        })
    }

    #[instrument(skip(db))]
    pub async fn get_student_by_id(db: &PgPool, id: StudentId) -> Result<Student, AppError> {
        let mut conn = db
            .acquire()
            .await
            .context("Failed to acquire connection")
            .map_err(AppError::database)?;
        fetch_student(&mut conn, id).await
    }

    #[instrument(skip(db))]
    pub async fn get_student_by_email(db: &PgPool, email: &str) -> Result<Student, AppError> {
        sqlx::query_as::<_, Student>(&format!("{STUDENT_SELECT} WHERE s.email = $1"))
            .bind(email)
            .fetch_optional(db)
            .await
            .context("Failed to fetch student")
            .map_err(AppError::database)?
            .ok_or_else(|| {
                AppError::not_found(anyhow::anyhow!("Student not found with email: {}", email))
            })
    }

    /// Applies the fields present in `dto` if `requester` is the student or
    /// the creating teacher.
    #[instrument(skip(db, dto))]
    pub async fn update_student(
        db: &PgPool,
        id: StudentId,
        dto: UpdateStudentDto,
        requester: &str,
    ) -> Result<Student, AppError> {
        let mut tx = db
            .begin()
            .await
            .context("Failed to begin transaction")
            .map_err(AppError::database)?;

        let student = apply_update(&mut tx, id, &dto, requester).await?;

        tx.commit()
            .await
            .context("Failed to commit student update")
            .map_err(AppError::database)?;

        info!(student.id = %id, "Student updated");
        Ok(student)
    }

    /// Updates the caller's own profile and keeps the login account's names
    /// and date of birth in step.
    #[instrument(skip(db, dto))]
    pub async fn update_own_profile(
        db: &PgPool,
        email: &str,
        dto: UpdateStudentDto,
    ) -> Result<Student, AppError> {
        let id = Self::get_student_by_email(db, email).await?.id;

        let mut tx = db
            .begin()
            .await
            .context("Failed to begin transaction")
            .map_err(AppError::database)?;

        let student = apply_update(&mut tx, id, &dto, email).await?;

        sqlx::query(
            "UPDATE accounts
             SET first_name = $2, last_name = $3, date_of_birth = $4, updated_at = NOW()
             WHERE email = $1",
        )
        .bind(email)
        .bind(&student.first_name)
        .bind(&student.last_name)
        .bind(student.date_of_birth)
        .execute(&mut *tx)
        .await
        .context("Failed to sync account profile")
        .map_err(AppError::database)?;

        tx.commit()
            .await
            .context("Failed to commit profile update")
            .map_err(AppError::database)?;

        info!(student.id = %id, "Student updated own profile");
        Ok(student)
    }

    /// Deletes the profile and its STUDENT login, if any. Only the creating
    /// teacher may do this; the student's own email is refused.
    #[instrument(skip(db))]
    pub async fn delete_student(
        db: &PgPool,
        id: StudentId,
        requester: &str,
    ) -> Result<(), AppError> {
        let mut tx = db
            .begin()
            .await
            .context("Failed to begin transaction")
            .map_err(AppError::database)?;

        let student = fetch_student(&mut tx, id).await?;

        if !can_delete_student(&student.created_by, requester) {
            warn!(student.id = %id, "Delete denied for requester");
            return Err(AppError::forbidden(
                "Only the teacher who created this profile can delete it",
            ));
        }

        sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("Failed to delete student")
            .map_err(AppError::database)?;

        sqlx::query("DELETE FROM accounts WHERE email = $1 AND role = $2")
            .bind(&student.email)
            .bind(Role::Student)
            .execute(&mut *tx)
            .await
            .context("Failed to delete student account")
            .map_err(AppError::database)?;

        tx.commit()
            .await
            .context("Failed to commit student delete")
            .map_err(AppError::database)?;

        info!(student.id = %id, "Student deleted");
        Ok(())
    }

    /// Enrolls the student in a course. Enrolling twice is a no-op.
    #[instrument(skip(db))]
    pub async fn enroll_student(
        db: &PgPool,
        id: StudentId,
        course_id: CourseId,
        requester: &str,
    ) -> Result<(), AppError> {
        let mut conn = db
            .acquire()
            .await
            .context("Failed to acquire connection")
            .map_err(AppError::database)?;

        authorize_update(&mut conn, id, requester).await?;
        CourseService::ensure_exists(db, course_id).await?;

        sqlx::query(
            "INSERT INTO student_courses (student_id, course_id) VALUES ($1, $2)
             ON CONFLICT DO NOTHING",
        )
        .bind(id)
        .bind(course_id)
        .execute(&mut *conn)
        .await
        .context("Failed to enroll student")
        .map_err(AppError::database)?;

        info!(student.id = %id, course.id = %course_id, "Student enrolled");
        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn unenroll_student(
        db: &PgPool,
        id: StudentId,
        course_id: CourseId,
        requester: &str,
    ) -> Result<(), AppError> {
        let mut conn = db
            .acquire()
            .await
            .context("Failed to acquire connection")
            .map_err(AppError::database)?;

        authorize_update(&mut conn, id, requester).await?;
        CourseService::ensure_exists(db, course_id).await?;

        sqlx::query("DELETE FROM student_courses WHERE student_id = $1 AND course_id = $2")
            .bind(id)
            .bind(course_id)
            .execute(&mut *conn)
            .await
            .context("Failed to unenroll student")
            .map_err(AppError::database)?;

        Ok(())
    }
}
