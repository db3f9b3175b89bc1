//! Custom `validator` rules shared by the request DTOs.

use std::borrow::Cow;
use validator::ValidationError;

/// Rejects strings made only of whitespace.
pub fn non_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank")
            .with_message(Cow::Borrowed("Name must not be blank")));
    }
    Ok(())
}
