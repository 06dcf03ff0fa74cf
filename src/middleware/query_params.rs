use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use crate::{error::AppError, services::metrics};

/// `Query<T>` whose rejection is a JSON `AppError::InvalidInput` instead of
/// axum's plain-text body.
#[derive(Debug)]
pub struct QueryParams<T>(pub T);

impl<T, S> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let result = Query::<T>::try_from_uri(&parts.uri)
            .map(|Query(value)| QueryParams(value))
            .map_err(|rejection| AppError::invalid_input(rejection.body_text()));
        if result.is_err() {
            metrics::record("parse_query", &result);
        }
        result
    }
}
