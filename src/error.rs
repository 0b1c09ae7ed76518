use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    ResourceNotFound(String),
    MediaGone(String),
    UnsupportedMediaType(String),
    BadRequest(String),
    ScheduleValidation(String),
    ExecutableNotFound(String),
    LaunchFailed(anyhow::Error),
    InternalServerError(anyhow::Error),
}

impl AppError {
    pub fn resource_not_found<T>(t: T) -> Self
    where
        T: ToString,
    {
        AppError::ResourceNotFound(t.to_string())
    }

    pub fn media_gone<T>(t: T) -> Self
    where
        T: ToString,
    {
        AppError::MediaGone(t.to_string())
    }

    pub fn unsupported_media_type<T>(t: T) -> Self
    where
        T: ToString,
    {
        AppError::UnsupportedMediaType(t.to_string())
    }

    pub fn bad_request<T>(t: T) -> Self
    where
        T: ToString,
    {
        AppError::BadRequest(t.to_string())
    }

    pub fn schedule_validation<T>(t: T) -> Self
    where
        T: ToString,
    {
        AppError::ScheduleValidation(t.to_string())
    }

    pub fn executable_not_found<T>(t: T) -> Self
    where
        T: ToString,
    {
        AppError::ExecutableNotFound(t.to_string())
    }
}

fn error_body(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::ResourceNotFound(err) => error_body(StatusCode::NOT_FOUND, err),
            AppError::MediaGone(err) => error_body(StatusCode::GONE, err),
            AppError::UnsupportedMediaType(err) => {
                error_body(StatusCode::UNSUPPORTED_MEDIA_TYPE, err)
            }
            AppError::BadRequest(err) => error_body(StatusCode::BAD_REQUEST, err),
            AppError::ScheduleValidation(err) => error_body(StatusCode::BAD_REQUEST, err),
            AppError::ExecutableNotFound(err) => error_body(StatusCode::INTERNAL_SERVER_ERROR, err),
            AppError::LaunchFailed(err) => error_body(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to start playback: {}", err),
            ),
            AppError::InternalServerError(err) => {
                error_body(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
        }
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        AppError::InternalServerError(err.into())
    }
}
