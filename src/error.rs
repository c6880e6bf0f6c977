use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, warn};

use crate::{
    auth::jwt::TokenError, response::ApiResponse, store::StoreError,
    weather::provider::ProviderError,
};

/// Error type returned by every handler; rendered as the standard envelope.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Upstream(#[from] ProviderError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}

impl From<TokenError> for AppError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Missing => Self::unauthorized("No token provided"),
            TokenError::Signing(inner) => Self::Internal(anyhow::anyhow!(inner)),
            _ => Self::unauthorized("Invalid token"),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        warn!(error = %e, "rejected request body");
        Self::validation("Invalid JSON provided.")
    }
}

impl From<QueryRejection> for AppError {
    fn from(e: QueryRejection) -> Self {
        warn!(error = %e, "rejected query string");
        Self::validation("Invalid query string.")
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Store(StoreError::NotFound) => {
                (StatusCode::NOT_FOUND, "Resource not found.".to_string())
            }
            AppError::Store(StoreError::Duplicate) => {
                (StatusCode::CONFLICT, "Username already exists.".to_string())
            }
            AppError::Store(e) => {
                error!(error = %e, "store error");
                internal()
            }
            AppError::Upstream(ProviderError::CityNotFound(city)) => {
                warn!(%city, "provider does not know city");
                (StatusCode::NOT_FOUND, "City not found.".to_string())
            }
            AppError::Upstream(e) => {
                error!(error = %e, "weather provider error");
                internal()
            }
            AppError::Internal(e) => {
                error!(error = %e, "internal error");
                internal()
            }
        };

        (status, Json(ApiResponse::error(message))).into_response()
    }
}

fn internal() -> (StatusCode, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error.".to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_statuses() {
        assert_eq!(
            AppError::from(StoreError::NotFound).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(StoreError::Duplicate).into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::from(StoreError::Backend(sqlx::Error::PoolTimedOut))
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn token_errors_are_unauthorized() {
        for e in [
            TokenError::Missing,
            TokenError::Malformed,
            TokenError::BadSignature,
            TokenError::Expired,
            TokenError::WrongIssuer,
        ] {
            assert_eq!(
                AppError::from(e).into_response().status(),
                StatusCode::UNAUTHORIZED
            );
        }
    }

    #[test]
    fn unknown_city_is_not_found() {
        let resp = AppError::from(ProviderError::CityNotFound("Atlantis".into())).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
