use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::web::models::ErrorBody;

/// What actually went wrong talking to the completion endpoint. Only ever
/// logged, never shown to the caller.
#[derive(Debug, Error)]
pub enum UpstreamFailure {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response body: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
#[error("Failed to get response from upstream")]
pub struct UpstreamError {
    #[source]
    cause: UpstreamFailure,
}

impl UpstreamError {
    pub fn cause(&self) -> &UpstreamFailure {
        &self.cause
    }
}

impl From<UpstreamFailure> for UpstreamError {
    fn from(cause: UpstreamFailure) -> Self {
        Self { cause }
    }
}

/// Everything the relay can hand back to a caller instead of a reply.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Message is required")]
    Validation,

    #[error("Failed to process request")]
    Upstream(#[from] UpstreamError),

    #[error("Failed to process request")]
    Processing(String),
}

impl ResponseError for RelayError {
    fn status_code(&self) -> StatusCode {
        match self {
            RelayError::Validation => StatusCode::BAD_REQUEST,
            RelayError::Upstream(_) | RelayError::Processing(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
        })
    }
}
