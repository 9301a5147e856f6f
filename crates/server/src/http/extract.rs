use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use domain::QueryError;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::ApiError;

/// [`Query`] that rejects with the JSON `bad_request` body instead of plain text.
pub struct QueryParams<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, ApiError> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(params)) => Ok(QueryParams(params)),
            Err(rejection) => {
                debug!("Rejecting query string: {}", rejection.body_text());
                Err(QueryError::validation("Bad request").into())
            }
        }
    }
}
