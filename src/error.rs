use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Request-level failures. Every variant resolves to a well-formed JSON
/// response; nothing in the request path propagates as a crash.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("city is required")]
    MissingCity,

    #[error("rate limit exceeded, try again later")]
    RateLimited,

    #[error("could not fetch weather data, please try again later")]
    ProviderUnavailable,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::MissingCity => StatusCode::BAD_REQUEST,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::ProviderUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse {
            error: self.to_string(),
        });

        (status, body).into_response()
    }
}
