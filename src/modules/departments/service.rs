use anyhow::Context;
use sqlx::{PgExecutor, PgPool};
use tracing::{info, instrument, warn};

use schoolhouse_core::{AppError, PaginationMeta, PaginationParams};
use schoolhouse_db::unique_violation;
use schoolhouse_models::{DepartmentId, Role};

use super::model::{
    CreateDepartmentDto, Department, PaginatedDepartmentsResponse, UpdateDepartmentDto,
};

fn map_write_error(e: sqlx::Error, name: &str, code: &str) -> AppError {
    match unique_violation(&e) {
        Some("departments_code_key") => AppError::duplicate(anyhow::anyhow!(
            "Department with code already exists: {}",
            code
        )),
        Some("departments_name_key") => AppError::duplicate(anyhow::anyhow!(
            "Department with name already exists: {}",
            name
        )),
        _ => AppError::database(anyhow::Error::new(e).context("Failed to write department")),
    }
}

pub(crate) fn department_not_found(id: DepartmentId) -> AppError {
    AppError::not_found(anyhow::anyhow!("Department not found with id: {}", id))
}

pub struct DepartmentService;

impl DepartmentService {
    /// Fails with `NOT_FOUND` unless the department exists.
    ///
    /// Takes any executor so it can run inside a caller's transaction.
    pub async fn ensure_exists<'e, E>(executor: E, id: DepartmentId) -> Result<(), AppError>
    where
        E: PgExecutor<'e>,
    {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM departments WHERE id = $1)")
                .bind(id)
                .fetch_one(executor)
                .await
                .context("Failed to check department")
                .map_err(AppError::database)?;

        if !exists {
            return Err(department_not_found(id));
        }
        Ok(())
    }

    #[instrument(skip(db, dto), fields(department.code = %dto.code))]
    pub async fn create_department(
        db: &PgPool,
        dto: CreateDepartmentDto,
    ) -> Result<Department, AppError> {
        let (code_taken, name_taken) = sqlx::query_as::<_, (bool, bool)>(
            "SELECT EXISTS(SELECT 1 FROM departments WHERE code = $1),
                    EXISTS(SELECT 1 FROM departments WHERE name = $2)",
        )
        .bind(&dto.code)
        .bind(&dto.name)
        .fetch_one(db)
        .await
        .context("Failed to check department uniqueness")
        .map_err(AppError::database)?;

        if code_taken {
            warn!("Department code already in use");
            return Err(AppError::duplicate(anyhow::anyhow!(
                "Department with code already exists: {}",
                dto.code
            )));
        }
        if name_taken {
            return Err(AppError::duplicate(anyhow::anyhow!(
                "Department with name already exists: {}",
                dto.name
            )));
        }

        let department = sqlx::query_as::<_, Department>(
            "INSERT INTO departments (name, code, established_date, description)
             VALUES ($1, $2, $3, $4)
             RETURNING id, name, code, established_date, description, created_at, updated_at",
        )
        .bind(&dto.name)
        .bind(&dto.code)
        .bind(dto.established_date)
        .bind(&dto.description)
        .fetch_one(db)
        .await
        .map_err(|e| map_write_error(e, &dto.name, &dto.code))?;

        info!(department.id = %department.id, "Department created");
        Ok(department)
    }

    #[instrument(skip(db))]
    pub async fn get_departments(
        db: &PgPool,
        pagination: PaginationParams,
    ) -> Result<PaginatedDepartmentsResponse, AppError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM departments")
            .fetch_one(db)
            .await
            .context("Failed to count departments")
            .map_err(AppError::database)?;

        let departments = sqlx::query_as::<_, Department>(
            "SELECT id, name, code, established_date, description, created_at, updated_at
             FROM departments
             ORDER BY name
             LIMIT $1 OFFSET $2",
        )
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(db)
        .await
        .context("Failed to fetch departments")
        .map_err(AppError::database)?;

        Ok(PaginatedDepartmentsResponse {
            data: departments,
            meta: PaginationMeta::new(total, &pagination),
        })
    }

    #[instrument(skip(db))]
    pub async fn get_department_by_id(
        db: &PgPool,
        id: DepartmentId,
    ) -> Result<Department, AppError> {
        sqlx::query_as::<_, Department>(
            "SELECT id, name, code, established_date, description, created_at, updated_at
             FROM departments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(db)
        .await
        .context("Failed to fetch department")
        .map_err(AppError::database)?
        .ok_or_else(|| department_not_found(id))
    }

    /// Overwrites the fields present in `dto`.
    #[instrument(skip(db, dto))]
    pub async fn update_department(
        db: &PgPool,
        id: DepartmentId,
        dto: UpdateDepartmentDto,
    ) -> Result<Department, AppError> {
        let current = Self::get_department_by_id(db, id).await?;

        let name = dto.name.unwrap_or(current.name);
        let code = dto.code.unwrap_or(current.code);

        let department = sqlx::query_as::<_, Department>(
            "UPDATE departments
             SET name = $2,
                 code = $3,
                 established_date = COALESCE($4, established_date),
                 description = COALESCE($5, description),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING id, name, code, established_date, description, created_at, updated_at",
        )
        .bind(id)
        .bind(&name)
        .bind(&code)
        .bind(dto.established_date)
        .bind(&dto.description)
        .fetch_one(db)
        .await
        .map_err(|e| map_write_error(e, &name, &code))?;

        info!(department.id = %department.id, "Department updated");
        Ok(department)
    }

    /// Removes the department together with its teachers, students (and
    /// their login accounts) and courses.
    #[instrument(skip(db))]
    pub async fn delete_department(db: &PgPool, id: DepartmentId) -> Result<(), AppError> {
        let mut tx = db
            .begin()
            .await
            .context("Failed to begin transaction")
            .map_err(AppError::database)?;

        // Cascaded student profiles take their STUDENT logins with them.
        sqlx::query(
            "DELETE FROM accounts
             WHERE role = $2
               AND email IN (SELECT email FROM students WHERE department_id = $1)",
        )
        .bind(id)
        .bind(Role::Student)
        .execute(&mut *tx)
        .await
        .context("Failed to delete student accounts")
        .map_err(AppError::database)?;

        let result = sqlx::query("DELETE FROM departments WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("Failed to delete department")
            .map_err(AppError::database)?;

        if result.rows_affected() == 0 {
            return Err(department_not_found(id));
        }

        tx.commit()
            .await
            .context("Failed to commit department delete")
            .map_err(AppError::database)?;

        info!(department.id = %id, "Department deleted");
        Ok(())
    }
}
