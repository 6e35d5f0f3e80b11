//! Request extractors that turn malformed input into 400 responses with the
//! standard error body.

use anyhow::anyhow;
use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Query, Request, rejection::JsonRejection},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use quillpress_core::AppError;

fn json_rejection_error(rejection: JsonRejection) -> AppError {
    let error_msg = rejection.body_text();

    if error_msg.contains("missing field") {
        let field = error_msg
            .split("missing field `")
            .nth(1)
            .and_then(|s| s.split('`').next())
            .unwrap_or("unknown");
        return AppError::bad_request(anyhow!("{} is required", field));
    }

    if error_msg.contains("invalid type") || error_msg.contains("unknown variant") {
        return AppError::bad_request(anyhow!("Invalid field type in request"));
    }

    if matches!(rejection, JsonRejection::MissingJsonContentType(_)) {
        return AppError::bad_request(anyhow!(
            "Missing 'Content-Type: application/json' header"
        ));
    }

    AppError::bad_request(anyhow!("Invalid request body"))
}

/// JSON body that passed its `validator` rules.
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
            .map_err(json_rejection_error)?;

        value.validate()?;

        Ok(ValidatedJson(value))
    }
}

/// Query string parsed into `T`; parse failures become 400 with the
/// standard error body.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                AppError::bad_request(anyhow!("Invalid query parameters: {}", rejection.body_text()))
            })?;

        Ok(ValidatedQuery(value))
    }
}
