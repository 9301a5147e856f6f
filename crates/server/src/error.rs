use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::QueryError;
use serde_json::json;

/// Maps engine failures onto the `{message, code}` error body clients expect.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Query(#[from] QueryError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, code) = match self {
            ApiError::Query(QueryError::Validation(msg)) => {
                tracing::info!("returning error to client: {msg}");
                (StatusCode::BAD_REQUEST, msg, "bad_request")
            }
            ApiError::Query(QueryError::Storage(err)) => {
                tracing::error!(?err, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    String::from("A database error occurred"),
                    "database_error",
                )
            }
        };
        (status, Json(json!({ "message": message, "code": code }))).into_response()
    }
}
