use anyhow::anyhow;
use axum::{
    Json,
    extract::{
        FromRequest, Request,
        rejection::{JsonRejection, QueryRejection},
    },
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use schoolhouse_core::AppError;

/// Joins field messages into one sentence, sorted by field for stable output.
fn format_errors(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                error
                    .message
                    .as_ref()
                    .map(|msg| msg.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field))
            })
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn rejection_to_error(rejection: JsonRejection) -> AppError {
    if matches!(rejection, JsonRejection::MissingJsonContentType(_)) {
        return AppError::validation(anyhow!(
            "Missing 'Content-Type: application/json' header"
        ));
    }

    let error_msg = rejection.body_text();

    if let Some(field) = error_msg
        .split("missing field `")
        .nth(1)
        .and_then(|s| s.split('`').next())
    {
        return AppError::validation(anyhow!("{} is required", field));
    }

    if error_msg.contains("invalid type") || error_msg.contains("invalid value") {
        return AppError::validation(anyhow!("Invalid field type in request"));
    }

    AppError::validation(anyhow!("Invalid request body"))
}

/// Maps a rejected query string to `VALIDATION_FAILURE`.
pub fn invalid_query(rejection: QueryRejection) -> AppError {
    AppError::validation(anyhow!("Invalid query parameters: {}", rejection.body_text()))
}

/// JSON body extractor that runs `validator` rules before the handler.
///
/// Malformed bodies and rule violations both surface as
/// `VALIDATION_FAILURE` (400).
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(rejection_to_error)?;

        value
            .validate()
            .map_err(|errors| AppError::validation(anyhow!("{}", format_errors(&errors))))?;

        Ok(ValidatedJson(value))
    }
}
