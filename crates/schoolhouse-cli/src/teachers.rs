//! Teacher creation outside the HTTP API.

use anyhow::{Context, bail};
use schoolhouse_core::hash_password;
use schoolhouse_db::unique_violation;
use schoolhouse_models::{DepartmentId, Role};
use sqlx::PgPool;

pub struct NewTeacher {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub teacher_id: String,
    pub password: String,
    pub department_id: Option<DepartmentId>,
}

/// Creates the TEACHER login account and the matching teacher profile in one
/// transaction.
pub async fn create_teacher(db: &PgPool, teacher: &NewTeacher) -> anyhow::Result<()> {
    if teacher.password.len() < 6 {
        bail!("Password must be at least 6 characters");
    }

    let password_hash = hash_password(&teacher.password).map_err(|e| e.error)?;

    let mut tx = db.begin().await?;

    if let Some(department_id) = teacher.department_id {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM departments WHERE id = $1)")
                .bind(department_id)
                .fetch_one(&mut *tx)
                .await?;
        if !exists {
            bail!("Department not found with id: {}", department_id);
        }
    }

    sqlx::query(
        "INSERT INTO accounts (first_name, last_name, email, password_hash, role)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(&teacher.first_name)
    .bind(&teacher.last_name)
    .bind(&teacher.email)
    .bind(&password_hash)
    .bind(Role::Teacher)
    .execute(&mut *tx)
    .await
    .map_err(|e| duplicate_or(e, teacher))?;

    sqlx::query(
        "INSERT INTO teachers (first_name, last_name, email, teacher_id, hire_date, department_id)
         VALUES ($1, $2, $3, $4, CURRENT_DATE, $5)",
    )
    .bind(&teacher.first_name)
    .bind(&teacher.last_name)
    .bind(&teacher.email)
    .bind(&teacher.teacher_id)
    .bind(teacher.department_id)
    .execute(&mut *tx)
    .await
    .map_err(|e| duplicate_or(e, teacher))?;

    tx.commit().await.context("Failed to commit teacher")?;
    Ok(())
}

fn duplicate_or(e: sqlx::Error, teacher: &NewTeacher) -> anyhow::Error {
    match unique_violation(&e) {
        Some("accounts_email_key") | Some("teachers_email_key") => {
            anyhow::anyhow!("Teacher with email already exists: {}", teacher.email)
        }
        Some("teachers_teacher_id_key") => {
            anyhow::anyhow!("Teacher ID already exists: {}", teacher.teacher_id)
        }
        _ => anyhow::Error::new(e).context("Failed to insert teacher"),
    }
}
