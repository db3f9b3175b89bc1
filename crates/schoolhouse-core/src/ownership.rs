//! Ownership rules for student profiles.
//!
//! A student profile remembers the email of the teacher who provisioned it
//! (`created_by`). That teacher and the student may edit the profile, but
//! only the teacher may remove it. A student can never delete themself.
//!
//! Emails are compared exactly as stored; callers pass the authenticated
//! principal's email (or the `X-User-Email` override).

/// Returns `true` if `requester` may update the profile.
pub fn can_update_student(student_email: &str, created_by: &str, requester: &str) -> bool {
    requester == student_email || requester == created_by
}

/// Returns `true` if `requester` may delete the profile.
pub fn can_delete_student(created_by: &str, requester: &str) -> bool {
    requester == created_by
}
