use anyhow::Context;
use sqlx::{PgExecutor, PgPool};
use tracing::{info, instrument, warn};

use schoolhouse_core::{AppError, PaginationMeta, PaginationParams};
use schoolhouse_db::unique_violation;
use schoolhouse_models::{CourseId, DepartmentId, TeacherId};

use crate::modules::courses::service::CourseService;
use crate::modules::departments::service::DepartmentService;

use super::model::{CreateTeacherDto, PaginatedTeachersResponse, Teacher, UpdateTeacherDto};

/// Teacher columns plus the department name.
pub(crate) const TEACHER_SELECT: &str = "SELECT t.id, t.first_name, t.last_name, t.email, t.teacher_id,
        t.date_of_birth, t.hire_date, t.specialization, t.department_id,
        d.name AS department_name, t.created_at, t.updated_at
 FROM teachers t
 LEFT JOIN departments d ON d.id = t.department_id";

fn map_write_error(e: sqlx::Error, email: &str, teacher_id: &str) -> AppError {
    match unique_violation(&e) {
        Some("teachers_email_key") => AppError::duplicate(anyhow::anyhow!(
            "Teacher with email already exists: {}",
            email
        )),
        Some("teachers_teacher_id_key") => AppError::duplicate(anyhow::anyhow!(
            "Teacher ID already exists: {}",
            teacher_id
        )),
        _ => AppError::database(anyhow::Error::new(e).context("Failed to write teacher")),
    }
}

fn teacher_not_found(id: TeacherId) -> AppError {
    AppError::not_found(anyhow::anyhow!("Teacher not found with id: {}", id))
}

pub struct TeacherService;

impl TeacherService {
    #[instrument(skip(db, dto), fields(teacher.email = %dto.email))]
    pub async fn create_teacher(db: &PgPool, dto: CreateTeacherDto) -> Result<Teacher, AppError> {
        let (email_taken, id_taken) = sqlx::query_as::<_, (bool, bool)>(
            "SELECT EXISTS(SELECT 1 FROM teachers WHERE email = $1),
                    EXISTS(SELECT 1 FROM teachers WHERE teacher_id = $2)",
        )
        .bind(&dto.email)
        .bind(&dto.teacher_id)
        .fetch_one(db)
        .await
        .context("Failed to check teacher uniqueness")
        .map_err(AppError::database)?;

        if email_taken {
            warn!("Teacher email already in use");
            return Err(AppError::duplicate(anyhow::anyhow!(
                "Teacher with email already exists: {}",
                dto.email
            )));
        }
        if id_taken {
            return Err(AppError::duplicate(anyhow::anyhow!(
                "Teacher ID already exists: {}",
                dto.teacher_id
            )));
        }

        if let Some(department_id) = dto.department_id {
            DepartmentService::ensure_exists(db, department_id).await?;
        }

        let id = sqlx::query_scalar::<_, TeacherId>(
            "INSERT INTO teachers
                 (first_name, last_name, email, teacher_id, date_of_birth, hire_date, specialization, department_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING id",
        )
        .bind(&dto.first_name)
        .bind(&dto.last_name)
        .bind(&dto.email)
        .bind(&dto.teacher_id)
        .bind(dto.date_of_birth)
        .bind(dto.hire_date)
        .bind(&dto.specialization)
        .bind(dto.department_id)
        .fetch_one(db)
        .await
        .map_err(|e| map_write_error(e, &dto.email, &dto.teacher_id))?;

        info!(teacher.id = %id, "Teacher created");
        Self::get_teacher_by_id(db, id).await
    }

    #[instrument(skip(db))]
    pub async fn get_teachers(
        db: &PgPool,
        department_id: Option<DepartmentId>,
        pagination: PaginationParams,
    ) -> Result<PaginatedTeachersResponse, AppError> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM teachers WHERE ($1::BIGINT IS NULL OR department_id = $1)",
        )
        .bind(department_id)
        .fetch_one(db)
        .await
        .context("Failed to count teachers")
        .map_err(AppError::database)?;

        let teachers = sqlx::query_as::<_, Teacher>(&format!(
            "{TEACHER_SELECT}
             WHERE ($1::BIGINT IS NULL OR t.department_id = $1)
             ORDER BY t.last_name, t.first_name
             LIMIT $2 OFFSET $3"
        ))
        .bind(department_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(db)
        .await
        .context("Failed to fetch teachers")
        .map_err(AppError::database)?;

        Ok(PaginatedTeachersResponse {
            data: teachers,
            meta: PaginationMeta::new(total, &pagination),
        })
    }

    #[instrument(skip(db))]
    pub async fn get_teacher_by_id(db: &PgPool, id: TeacherId) -> Result<Teacher, AppError> {
        sqlx::query_as::<_, Teacher>(&format!("{TEACHER_SELECT} WHERE t.id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await
            .context("Failed to fetch teacher")
            .map_err(AppError::database)?
            .ok_or_else(|| teacher_not_found(id))
    }

    /// Resolves a teacher profile by email. Runs on any executor so the
    /// student provisioning transaction can use it.
    pub async fn get_teacher_by_email<'e, E>(executor: E, email: &str) -> Result<Teacher, AppError>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Teacher>(&format!("{TEACHER_SELECT} WHERE t.email = $1"))
            .bind(email)
            .fetch_optional(executor)
            .await
            .context("Failed to fetch teacher")
            .map_err(AppError::database)?
            .ok_or_else(|| {
                AppError::not_found(anyhow::anyhow!("Teacher not found with email: {}", email))
            })
    }

    /// Overwrites names, dates, specialization and department. Email and
    /// teacher ID never change.
    #[instrument(skip(db, dto))]
    pub async fn update_teacher(
        db: &PgPool,
        id: TeacherId,
        dto: UpdateTeacherDto,
    ) -> Result<Teacher, AppError> {
        let current = Self::get_teacher_by_id(db, id).await?;

        if let Some(department_id) = dto.department_id {
            DepartmentService::ensure_exists(db, department_id).await?;
        }

        sqlx::query(
            "UPDATE teachers
             SET first_name = COALESCE($2, first_name),
                 last_name = COALESCE($3, last_name),
                 date_of_birth = COALESCE($4, date_of_birth),
                 hire_date = COALESCE($5, hire_date),
                 specialization = COALESCE($6, specialization),
                 department_id = COALESCE($7, department_id),
                 updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(&dto.first_name)
        .bind(&dto.last_name)
        .bind(dto.date_of_birth)
        .bind(dto.hire_date)
        .bind(&dto.specialization)
        .bind(dto.department_id)
        .execute(db)
        .await
        .map_err(|e| map_write_error(e, &current.email, &current.teacher_id))?;

        info!(teacher.id = %id, "Teacher updated");
        Self::get_teacher_by_id(db, id).await
    }

    #[instrument(skip(db))]
    pub async fn delete_teacher(db: &PgPool, id: TeacherId) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM teachers WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .context("Failed to delete teacher")
            .map_err(AppError::database)?;

        if result.rows_affected() == 0 {
            return Err(teacher_not_found(id));
        }

        info!(teacher.id = %id, "Teacher deleted");
        Ok(())
    }

    /// Links the teacher to the course. Assigning twice is a no-op.
    #[instrument(skip(db))]
    pub async fn assign_course(
        db: &PgPool,
        id: TeacherId,
        course_id: CourseId,
    ) -> Result<(), AppError> {
        Self::ensure_exists(db, id).await?;
        CourseService::ensure_exists(db, course_id).await?;

        sqlx::query(
            "INSERT INTO teacher_courses (teacher_id, course_id) VALUES ($1, $2)
             ON CONFLICT DO NOTHING",
        )
        .bind(id)
        .bind(course_id)
        .execute(db)
        .await
        .context("Failed to assign course")
        .map_err(AppError::database)?;

        info!(teacher.id = %id, course.id = %course_id, "Course assigned");
        Ok(())
    }

    /// Removes the link if present.
    #[instrument(skip(db))]
    pub async fn unassign_course(
        db: &PgPool,
        id: TeacherId,
        course_id: CourseId,
    ) -> Result<(), AppError> {
        Self::ensure_exists(db, id).await?;
        CourseService::ensure_exists(db, course_id).await?;

        sqlx::query("DELETE FROM teacher_courses WHERE teacher_id = $1 AND course_id = $2")
            .bind(id)
            .bind(course_id)
            .execute(db)
            .await
            .context("Failed to unassign course")
            .map_err(AppError::database)?;

        Ok(())
    }

    async fn ensure_exists(db: &PgPool, id: TeacherId) -> Result<(), AppError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM teachers WHERE id = $1)")
                .bind(id)
                .fetch_one(db)
                .await
                .context("Failed to check teacher")
                .map_err(AppError::database)?;

        if !exists {
            return Err(teacher_not_found(id));
        }
        Ok(())
    }
}
