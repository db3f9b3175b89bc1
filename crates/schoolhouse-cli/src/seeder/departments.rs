//! Department and course seeding.

use chrono::NaiveDate;
use fake::Fake;
use fake::faker::company::en::{CatchPhrase, Industry};
use rand::Rng;
use rayon::prelude::*;
use schoolhouse_models::DepartmentId;
use sqlx::{PgPool, Postgres, Transaction};
use std::time::Instant;

use super::models::{CourseSeed, DepartmentSeed, SEED_DEPARTMENT_PREFIX};
use super::placeholders;

const COURSE_KINDS: [&str; 6] = [
    "Foundations",
    "Methods",
    "Seminar",
    "Workshop",
    "Laboratory",
    "Capstone",
];

/// Generates departments in parallel. The index keeps names and codes unique.
pub fn generate_departments(count: usize) -> Vec<DepartmentSeed> {
    (0..count)
        .into_par_iter()
        .map(|idx| {
            let mut rng = rand::thread_rng();
            let industry: String = Industry().fake();
            let description: String = CatchPhrase().fake();

            DepartmentSeed {
                name: format!("{} {}", industry, idx + 1),
                code: format!("{}{:03}", SEED_DEPARTMENT_PREFIX, idx + 1),
                established_date: NaiveDate::from_ymd_opt(rng.gen_range(1950..2020), 9, 1),
                description: Some(description),
            }
        })
        .collect()
}

pub fn generate_courses(department_ids: &[DepartmentId], per_department: usize) -> Vec<CourseSeed> {
    department_ids
        .par_iter()
        .enumerate()
        .flat_map(|(dept_idx, &department_id)| {
            let mut rng = rand::thread_rng();
            (0..per_department)
                .map(|course_idx| {
                    let industry: String = Industry().fake();
                    let kind = COURSE_KINDS[rng.gen_range(0..COURSE_KINDS.len())];
                    CourseSeed {
                        name: format!("{} {}", industry, kind),
                        code: format!("SC{:03}{:02}", dept_idx + 1, course_idx + 1),
                        credits: rng.gen_range(1..=5),
                        department_id,
                    }
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

pub async fn seed_departments(db: &PgPool, count: usize) -> anyhow::Result<Vec<DepartmentId>> {
    let start_time = Instant::now();
    println!("🏛️  Seeding {} departments...", count);

    let departments = generate_departments(count);

    let mut tx = db.begin().await?;
    let mut ids = Vec::with_capacity(departments.len());
    for chunk in departments.chunks(500) {
        ids.extend(insert_departments_chunk(&mut tx, chunk).await?);
    }
    tx.commit().await?;

    println!(
        "   ✓ Inserted {} departments in {:?}",
        ids.len(),
        start_time.elapsed()
    );
    Ok(ids)
}

async fn insert_departments_chunk(
    tx: &mut Transaction<'_, Postgres>,
    departments: &[DepartmentSeed],
) -> anyhow::Result<Vec<DepartmentId>> {
    if departments.is_empty() {
        return Ok(Vec::new());
    }

    let query = format!(
        "INSERT INTO departments (name, code, established_date, description) VALUES {} RETURNING id",
        placeholders(departments.len(), 4)
    );

    let mut q = sqlx::query_scalar(&query);
    for department in departments {
        q = q
            .bind(&department.name)
            .bind(&department.code)
            .bind(department.established_date)
            .bind(&department.description);
    }

    Ok(q.fetch_all(&mut **tx).await?)
}

pub async fn seed_courses(
    db: &PgPool,
    department_ids: &[DepartmentId],
    per_department: usize,
) -> anyhow::Result<u64> {
    let start_time = Instant::now();
    let courses = generate_courses(department_ids, per_department);
    println!("📘 Seeding {} courses...", courses.len());

    let mut tx = db.begin().await?;
    let mut inserted = 0;
    for chunk in courses.chunks(500) {
        inserted += insert_courses_chunk(&mut tx, chunk).await?;
    }
    tx.commit().await?;

    println!(
        "   ✓ Inserted {} courses in {:?}",
        inserted,
        start_time.elapsed()
    );
    Ok(inserted)
}

async fn insert_courses_chunk(
    tx: &mut Transaction<'_, Postgres>,
    courses: &[CourseSeed],
) -> anyhow::Result<u64> {
    if courses.is_empty() {
        return Ok(0);
    }

    let query = format!(
        "INSERT INTO courses (name, code, credits, department_id) VALUES {}",
        placeholders(courses.len(), 4)
    );

    let mut q = sqlx::query(&query);
    for course in courses {
        q = q
            .bind(&course.name)
            .bind(&course.code)
            .bind(course.credits)
            .bind(course.department_id);
    }

    Ok(q.execute(&mut **tx).await?.rows_affected())
}

/// Deletes seeded departments; courses, teachers and students filed under
/// them go with them.
pub async fn clear_departments(db: &PgPool) -> anyhow::Result<u64> {
    let start_time = Instant::now();
    println!("🗑️  Clearing seeded departments...");

    let result = sqlx::query("DELETE FROM departments WHERE code LIKE $1")
        .bind(format!("{}%", SEED_DEPARTMENT_PREFIX))
        .execute(db)
        .await?
        .rows_affected();

    println!(
        "   ✓ Deleted {} departments in {:?}",
        result,
        start_time.elapsed()
    );
    Ok(result)
}
