use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ApiError {
    #[error("Paste not found")]
    NotFound,
    #[error("unauthorized: {0}")]
    Unauthorized(&'static str),
    #[error("forbidden: {0}")]
    Forbidden(&'static str),
    #[error("insufficient storage")]
    InsufficientStorage,
    #[error("IO error")]
    IO { source: std::io::Error },
    #[error("stored paste is corrupt")]
    CorruptPaste {
        #[from]
        source: serde_json::Error,
    },
    #[error("token error")]
    Token {
        #[from]
        source: jsonwebtoken::errors::Error,
    },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status_code = match &self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::InsufficientStorage => StatusCode::INSUFFICIENT_STORAGE,
            ApiError::IO { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::CorruptPaste { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Token { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status_code.is_server_error() {
            error!("request failed: {self:?}");
        }

        if let ApiError::Unauthorized(_) = self {
            return (
                status_code,
                [(header::WWW_AUTHENTICATE, "Bearer")],
                format!("{self}"),
            )
                .into_response();
        }

        (status_code, format!("{self}")).into_response()
    }
}

impl From<std::io::Error> for ApiError {
    fn from(source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::StorageFull => ApiError::InsufficientStorage,
            _ => ApiError::IO { source },
        }
    }
}
