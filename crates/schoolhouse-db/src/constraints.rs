//! Classification of PostgreSQL integrity errors.
//!
//! Services pre-check uniqueness before writing, but two concurrent
//! requests can both pass the check. The loser hits the unique index and is
//! reported through [`unique_violation`], which returns the name of the
//! violated constraint so callers can tell `accounts_email_key` from
//! `students_student_id_key`.

/// Name of the violated unique constraint, if `err` is a unique violation.
pub fn unique_violation(err: &sqlx::Error) -> Option<&str> {
    match err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            Some(db_err.constraint().unwrap_or_default())
        }
        _ => None,
    }
}

pub fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation())
}
