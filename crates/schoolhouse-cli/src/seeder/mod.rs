//! Bulk generation of fake departments, courses, teachers and students.
//!
//! Records are generated in parallel with `rayon` and inserted with
//! multi-row `INSERT` statements inside one transaction per table.

pub mod departments;
pub mod models;
pub mod people;

use schoolhouse_core::hash_password;
use sqlx::PgPool;
use std::time::Instant;

pub use models::{SEED_PASSWORD, SeedConfig};

/// `($1, $2), ($3, $4), ...` for `rows` tuples of `columns` parameters.
pub(crate) fn placeholders(rows: usize, columns: usize) -> String {
    (0..rows)
        .map(|row| {
            let params: Vec<String> = (1..=columns)
                .map(|col| format!("${}", row * columns + col))
                .collect();
            format!("({})", params.join(", "))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

pub async fn seed_all(db: &PgPool, config: SeedConfig) -> anyhow::Result<()> {
    let start_time = Instant::now();
    println!(
        "🌱 Seeding {} departments, {} teachers and {} students\n",
        config.departments,
        config.total_teachers(),
        config.total_students()
    );

    let password_hash = hash_password(SEED_PASSWORD).map_err(|e| e.error)?;

    let department_ids = departments::seed_departments(db, config.departments).await?;
    departments::seed_courses(db, &department_ids, config.courses_per_department).await?;
    let teachers = people::seed_teachers(
        db,
        &department_ids,
        config.teachers_per_department,
        &password_hash,
    )
    .await?;
    people::seed_students(db, &teachers, config.students_per_teacher, &password_hash).await?;

    println!("\n✅ Seeding finished in {:?}", start_time.elapsed());
    println!("   All seeded accounts use the password '{}'", SEED_PASSWORD);
    Ok(())
}

/// Removes everything `seed_all` created. Hand-made records are untouched.
pub async fn clear_all(db: &PgPool) -> anyhow::Result<()> {
    let start_time = Instant::now();

    departments::clear_departments(db).await?;
    people::clear_accounts(db).await?;

    println!("\n✅ Cleared seeded data in {:?}", start_time.elapsed());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders() {
        assert_eq!(placeholders(2, 3), "($1, $2, $3), ($4, $5, $6)");
        assert_eq!(placeholders(1, 1), "($1)");
        assert_eq!(placeholders(0, 4), "");
    }
}
