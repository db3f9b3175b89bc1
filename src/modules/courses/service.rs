use anyhow::Context;
use sqlx::PgPool;
use tracing::{info, instrument, warn};

use schoolhouse_core::{AppError, PaginationMeta, PaginationParams};
use schoolhouse_db::unique_violation;
use schoolhouse_models::{CourseId, DepartmentId, Student, Teacher};

use crate::modules::departments::service::DepartmentService;
use crate::modules::students::service::STUDENT_SELECT;
use crate::modules::teachers::service::TEACHER_SELECT;

use super::model::{Course, CreateCourseDto, PaginatedCoursesResponse, UpdateCourseDto};

/// Course columns plus the owning department's code and name.
pub(crate) const COURSE_SELECT: &str = "SELECT c.id, c.name, c.code, c.credits, c.description, c.department_id,
        d.code AS department_code, d.name AS department_name, c.created_at, c.updated_at
 FROM courses c
 LEFT JOIN departments d ON d.id = c.department_id";

fn map_write_error(e: sqlx::Error, code: &str) -> AppError {
    match unique_violation(&e) {
        Some("courses_code_key") => AppError::duplicate(anyhow::anyhow!(
            "Course with code already exists: {}",
            code
        )),
        _ => AppError::database(anyhow::Error::new(e).context("Failed to write course")),
    }
}

pub(crate) fn course_not_found(id: CourseId) -> AppError {
    AppError::not_found(anyhow::anyhow!("Course not found with id: {}", id))
}

pub struct CourseService;

impl CourseService {
    #[instrument(skip(db, dto), fields(course.code = %dto.code))]
    pub async fn create_course(db: &PgPool, dto: CreateCourseDto) -> Result<Course, AppError> {
        let code_taken =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM courses WHERE code = $1)")
                .bind(&dto.code)
                .fetch_one(db)
                .await
                .context("Failed to check course code")
                .map_err(AppError::database)?;

        if code_taken {
            warn!("Course code already in use");
            return Err(AppError::duplicate(anyhow::anyhow!(
                "Course with code already exists: {}",
                dto.code
            )));
        }

        if let Some(department_id) = dto.department_id {
            DepartmentService::ensure_exists(db, department_id).await?;
        }

        let course = sqlx::query_as::<_, Course>(
            "WITH c AS (
                 INSERT INTO courses (name, code, credits, description, department_id)
                 VALUES ($1, $2, $3, $4, $5)
                 RETURNING *
             )
             SELECT c.id, c.name, c.code, c.credits, c.description, c.department_id,
                    d.code AS department_code, d.name AS department_name, c.created_at, c.updated_at
             FROM c
             LEFT JOIN departments d ON d.id = c.department_id",
        )
        .bind(&dto.name)
        .bind(&dto.code)
        .bind(dto.credits)
        .bind(&dto.description)
        .bind(dto.department_id)
        .fetch_one(db)
        .await
        .map_err(|e| map_write_error(e, &dto.code))?;

        info!(course.id = %course.id, "Course created");
        Ok(course)
    }

    #[instrument(skip(db))]
    pub async fn get_courses(
        db: &PgPool,
        department_id: Option<DepartmentId>,
        pagination: PaginationParams,
    ) -> Result<PaginatedCoursesResponse, AppError> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM courses WHERE ($1::BIGINT IS NULL OR department_id = $1)",
        )
        .bind(department_id)
        .fetch_one(db)
        .await
        .context("Failed to count courses")
        .map_err(AppError::database)?;

        let courses = sqlx::query_as::<_, Course>(&format!(
            "{COURSE_SELECT}
             WHERE ($1::BIGINT IS NULL OR c.department_id = $1)
             ORDER BY c.code
             LIMIT $2 OFFSET $3"
        ))
        .bind(department_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(db)
        .await
        .context("Failed to fetch courses")
        .map_err(AppError::database)?;

        Ok(PaginatedCoursesResponse {
            data: courses,
            meta: PaginationMeta::new(total, &pagination),
        })
    }

    #[instrument(skip(db))]
    pub async fn get_course_by_id(db: &PgPool, id: CourseId) -> Result<Course, AppError> {
        sqlx::query_as::<_, Course>(&format!("{COURSE_SELECT} WHERE c.id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await
            .context("Failed to fetch course")
            .map_err(AppError::database)?
            .ok_or_else(|| course_not_found(id))
    }

    /// Overwrites the fields present in `dto`, re-resolving the department.
    #[instrument(skip(db, dto))]
    pub async fn update_course(
        db: &PgPool,
        id: CourseId,
        dto: UpdateCourseDto,
    ) -> Result<Course, AppError> {
        let current = Self::get_course_by_id(db, id).await?;

        if let Some(department_id) = dto.department_id {
            DepartmentService::ensure_exists(db, department_id).await?;
        }

        let code = dto.code.unwrap_or(current.code);

        sqlx::query(
            "UPDATE courses
             SET name = COALESCE($2, name),
                 code = $3,
                 credits = COALESCE($4, credits),
                 description = COALESCE($5, description),
                 department_id = COALESCE($6, department_id),
                 updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(&dto.name)
        .bind(&code)
        .bind(dto.credits)
        .bind(&dto.description)
        .bind(dto.department_id)
        .execute(db)
        .await
        .map_err(|e| map_write_error(e, &code))?;

        info!(course.id = %id, "Course updated");
        Self::get_course_by_id(db, id).await
    }

    #[instrument(skip(db))]
    pub async fn delete_course(db: &PgPool, id: CourseId) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .context("Failed to delete course")
            .map_err(AppError::database)?;

        if result.rows_affected() == 0 {
            return Err(course_not_found(id));
        }

        info!(course.id = %id, "Course deleted");
        Ok(())
    }

    pub(crate) async fn ensure_exists(db: &PgPool, id: CourseId) -> Result<(), AppError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM courses WHERE id = $1)")
                .bind(id)
                .fetch_one(db)
                .await
                .context("Failed to check course")
                .map_err(AppError::database)?;

        if !exists {
            return Err(course_not_found(id));
        }
        Ok(())
    }

    /// Teachers assigned to the course.
    #[instrument(skip(db))]
    pub async fn get_course_teachers(db: &PgPool, id: CourseId) -> Result<Vec<Teacher>, AppError> {
        Self::ensure_exists(db, id).await?;

        sqlx::query_as::<_, Teacher>(&format!(
            "{TEACHER_SELECT}
             JOIN teacher_courses tc ON tc.teacher_id = t.id
             WHERE tc.course_id = $1
             ORDER BY t.last_name, t.first_name"
        ))
        .bind(id)
        .fetch_all(db)
        .await
        .context("Failed to fetch course teachers")
        .map_err(AppError::database)
    }

    /// Students enrolled in the course.
    #[instrument(skip(db))]
    pub async fn get_course_students(db: &PgPool, id: CourseId) -> Result<Vec<Student>, AppError> {
        Self::ensure_exists(db, id).await?;

        sqlx::query_as::<_, Student>(&format!(
            "{STUDENT_SELECT}
             JOIN student_courses sc ON sc.student_id = s.id
             WHERE sc.course_id = $1
             ORDER BY s.last_name, s.first_name"
        ))
        .bind(id)
        .fetch_all(db)
        .await
        .context("Failed to fetch course students")
        .map_err(AppError::database)
    }
}
