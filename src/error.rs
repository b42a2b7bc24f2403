use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{error, warn};

use crate::auth::repo_types::StoreError;
use crate::pages::{IMAGE_CONTENT_TYPE, SIGNIN_FAILED_IMAGE};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("request body exceeds the upload limit")]
    PayloadTooLarge,
    #[error("email already registered")]
    Conflict,
    #[error("blob upload failed: {0:#}")]
    Upload(anyhow::Error),
    #[error("database unavailable: {0:#}")]
    StoreUnavailable(anyhow::Error),
    /// Unknown email and wrong password both land here.
    #[error("invalid credentials")]
    AuthFailure,
    /// Signin could not reach the store; still answered with the failure image.
    #[error("signin unavailable: {0:#}")]
    SigninUnavailable(anyhow::Error),
    #[error("internal error: {0:#}")]
    Internal(anyhow::Error),
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict => AppError::Conflict,
            StoreError::Unavailable(_) => AppError::StoreUnavailable(e.into()),
            other => AppError::Internal(other.into()),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Conflict => StatusCode::CONFLICT,
            AppError::Upload(_) => StatusCode::BAD_GATEWAY,
            AppError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::AuthFailure => StatusCode::UNAUTHORIZED,
            AppError::SigninUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Validation(msg) => {
                warn!(error = %msg, "validation failed");
                msg.clone()
            }
            AppError::PayloadTooLarge => {
                warn!("upload rejected by body limit");
                "Profile image is too large".to_string()
            }
            AppError::Conflict => "Email already registered".to_string(),
            AppError::AuthFailure | AppError::SigninUnavailable(_) => {
                if let AppError::SigninUnavailable(e) = &self {
                    error!(error = %e, "signin failed");
                }
                return (
                    status,
                    [
                        (header::CONTENT_TYPE, IMAGE_CONTENT_TYPE),
                        (header::CACHE_CONTROL, "no-store"),
                    ],
                    SIGNIN_FAILED_IMAGE,
                )
                    .into_response();
            }
            AppError::Upload(_) | AppError::StoreUnavailable(_) | AppError::Internal(_) => {
                error!(error = %self, "request failed");
                "Request failed, please try again later".to_string()
            }
        };
        (status, message).into_response()
    }
}
