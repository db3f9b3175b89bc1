//! Teacher and student seeding.
//!
//! Every seeded teacher gets a TEACHER login account plus a profile; every
//! seeded student is provisioned by one of those teachers and gets a
//! STUDENT login account. All accounts share one password hash.

use chrono::NaiveDate;
use fake::Fake;
use fake::faker::company::en::Profession;
use fake::faker::name::en::{FirstName, LastName};
use rand::Rng;
use rayon::prelude::*;
use schoolhouse_models::{DepartmentId, Role};
use sqlx::{PgPool, Postgres, Transaction};
use std::time::Instant;

use super::models::{SEED_EMAIL_DOMAIN, SeededTeacher, StudentSeed, TeacherSeed};
use super::placeholders;

fn seed_email(first_name: &str, last_name: &str, tag: &str, idx: usize) -> String {
    format!(
        "{}.{}+{}{}@{}",
        first_name.to_lowercase(),
        last_name.to_lowercase(),
        tag,
        idx,
        SEED_EMAIL_DOMAIN
    )
}

pub fn generate_teachers(department_ids: &[DepartmentId], per_department: usize) -> Vec<TeacherSeed> {
    department_ids
        .par_iter()
        .enumerate()
        .flat_map(|(dept_idx, &department_id)| {
            let mut rng = rand::thread_rng();
            (0..per_department)
                .map(|teacher_idx| {
                    let first_name: String = FirstName().fake();
                    let last_name: String = LastName().fake();
                    let specialization: String = Profession().fake();
                    let idx = dept_idx * 1000 + teacher_idx;

                    TeacherSeed {
                        email: seed_email(&first_name, &last_name, "teacher", idx),
                        first_name,
                        last_name,
                        teacher_id: format!("ST{:06}", idx),
                        hire_date: NaiveDate::from_ymd_opt(
                            rng.gen_range(1995..2024),
                            rng.gen_range(1..=12),
                            1,
                        ),
                        specialization: Some(specialization),
                        department_id,
                    }
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

pub fn generate_students(teachers: &[SeededTeacher], per_teacher: usize) -> Vec<StudentSeed> {
    teachers
        .par_iter()
        .enumerate()
        .flat_map(|(teacher_idx, teacher)| {
            let mut rng = rand::thread_rng();
            (0..per_teacher)
                .map(|student_idx| {
                    let first_name: String = FirstName().fake();
                    let last_name: String = LastName().fake();
                    let idx = teacher_idx * 1000 + student_idx;

                    StudentSeed {
                        email: seed_email(&first_name, &last_name, "student", idx),
                        first_name,
                        last_name,
                        student_id: format!("SS{:08}", idx),
                        date_of_birth: NaiveDate::from_ymd_opt(
                            rng.gen_range(1998..2008),
                            rng.gen_range(1..=12),
                            rng.gen_range(1..=28),
                        ),
                        created_by: teacher.email.clone(),
                        department_id: teacher.department_id,
                    }
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Login rows for a batch of people: (first name, last name, email).
async fn insert_accounts_chunk(
    tx: &mut Transaction<'_, Postgres>,
    people: &[(&str, &str, &str)],
    role: Role,
    password_hash: &str,
) -> anyhow::Result<()> {
    if people.is_empty() {
        return Ok(());
    }

    let query = format!(
        "INSERT INTO accounts (first_name, last_name, email, password_hash, role) VALUES {}",
        placeholders(people.len(), 5)
    );

    let mut q = sqlx::query(&query);
    for (first_name, last_name, email) in people {
        q = q
            .bind(*first_name)
            .bind(*last_name)
            .bind(*email)
            .bind(password_hash)
            .bind(role);
    }

    q.execute(&mut **tx).await?;
    Ok(())
}

pub async fn seed_teachers(
    db: &PgPool,
    department_ids: &[DepartmentId],
    per_department: usize,
    password_hash: &str,
) -> anyhow::Result<Vec<SeededTeacher>> {
    let start_time = Instant::now();
    let teachers = generate_teachers(department_ids, per_department);
    println!("👩‍🏫 Seeding {} teachers...", teachers.len());

    let mut tx = db.begin().await?;
    for chunk in teachers.chunks(800) {
        let logins: Vec<_> = chunk
            .iter()
            .map(|t| (t.first_name.as_str(), t.last_name.as_str(), t.email.as_str()))
            .collect();
        insert_accounts_chunk(&mut tx, &logins, Role::Teacher, password_hash).await?;

        let query = format!(
            "INSERT INTO teachers (first_name, last_name, email, teacher_id, hire_date, specialization, department_id) VALUES {}",
            placeholders(chunk.len(), 7)
        );
        let mut q = sqlx::query(&query);
        for teacher in chunk {
            q = q
                .bind(&teacher.first_name)
                .bind(&teacher.last_name)
                .bind(&teacher.email)
                .bind(&teacher.teacher_id)
                .bind(teacher.hire_date)
                .bind(&teacher.specialization)
                .bind(teacher.department_id);
        }
        q.execute(&mut *tx).await?;
    }
    tx.commit().await?;

    println!(
        "   ✓ Inserted {} teachers in {:?}",
        teachers.len(),
        start_time.elapsed()
    );

    Ok(teachers
        .into_iter()
        .map(|t| SeededTeacher {
            email: t.email,
            department_id: t.department_id,
        })
        .collect())
}

pub async fn seed_students(
    db: &PgPool,
    teachers: &[SeededTeacher],
    per_teacher: usize,
    password_hash: &str,
) -> anyhow::Result<usize> {
    let start_time = Instant::now();
    let students = generate_students(teachers, per_teacher);
    println!("🎓 Seeding {} students...", students.len());

    let mut tx = db.begin().await?;
    for chunk in students.chunks(800) {
        let logins: Vec<_> = chunk
            .iter()
            .map(|s| (s.first_name.as_str(), s.last_name.as_str(), s.email.as_str()))
            .collect();
        insert_accounts_chunk(&mut tx, &logins, Role::Student, password_hash).await?;

        let query = format!(
            "INSERT INTO students (first_name, last_name, email, student_id, date_of_birth, created_by, department_id) VALUES {}",
            placeholders(chunk.len(), 7)
        );
        let mut q = sqlx::query(&query);
        for student in chunk {
            q = q
                .bind(&student.first_name)
                .bind(&student.last_name)
                .bind(&student.email)
                .bind(&student.student_id)
                .bind(student.date_of_birth)
                .bind(&student.created_by)
                .bind(student.department_id);
        }
        q.execute(&mut *tx).await?;
    }
    tx.commit().await?;

    println!(
        "   ✓ Inserted {} students in {:?}",
        students.len(),
        start_time.elapsed()
    );
    Ok(students.len())
}

/// Removes seeded login accounts.
pub async fn clear_accounts(db: &PgPool) -> anyhow::Result<u64> {
    let start_time = Instant::now();
    println!("🗑️  Clearing seeded accounts...");

    let result = sqlx::query("DELETE FROM accounts WHERE email LIKE $1")
        .bind(format!("%@{}", SEED_EMAIL_DOMAIN))
        .execute(db)
        .await?
        .rows_affected();

    println!(
        "   ✓ Deleted {} accounts in {:?}",
        result,
        start_time.elapsed()
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_students_are_owned_by_their_teacher() {
        let teachers = vec![
            SeededTeacher {
                email: "a@example.com".to_string(),
                department_id: DepartmentId(1),
            },
            SeededTeacher {
                email: "b@example.com".to_string(),
                department_id: DepartmentId(2),
            },
        ];

        let students = generate_students(&teachers, 5);

        assert_eq!(students.len(), 10);
        for student in &students {
            let teacher = teachers.iter().find(|t| t.email == student.created_by).unwrap();
            assert_eq!(student.department_id, teacher.department_id);
            assert!(student.email.ends_with("@example.com"));
        }
        let ids: HashSet<_> = students.iter().map(|s| s.student_id.clone()).collect();
        assert_eq!(ids.len(), 10);
    }

    #[test]
    fn test_teacher_ids_fit_column() {
        let teachers = generate_teachers(&[DepartmentId(1)], 3);
        assert_eq!(teachers.len(), 3);
        assert!(teachers.iter().all(|t| t.teacher_id.len() <= 20));
    }
}
