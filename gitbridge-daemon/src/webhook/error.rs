//! Error types for webhook intake.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Reasons an inbound delivery is not dispatched.
///
/// Authentication failures refuse the delivery (401). Header and payload
/// problems are only reported by the decoders; intake logs them and still
/// acknowledges an authentic delivery.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Neither `X-Hub-Signature-256` nor `X-Gitlab-Token` was present.
    #[error("missing signature header")]
    MissingSignature,

    /// The signature header is not `sha256=<hex>`.
    #[error("invalid signature format: {0}")]
    InvalidSignatureFormat(String),

    /// HMAC or token comparison failed.
    #[error("invalid signature")]
    InvalidSignature,

    /// The event-kind header is absent.
    #[error("missing event header {0}")]
    MissingEventHeader(&'static str),

    /// The body could not be decoded into the announced event.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}

impl WebhookError {
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingSignature | Self::InvalidSignature | Self::InvalidSignatureFormat(_) => {
                StatusCode::UNAUTHORIZED
            }
            Self::MissingEventHeader(_) | Self::InvalidPayload(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        // Bodies stay generic so nothing about the secret leaks back.
        let body = match &self {
            Self::MissingSignature => "Missing signature",
            Self::InvalidSignatureFormat(_) => "Invalid signature format",
            Self::InvalidSignature => "Invalid signature",
            Self::MissingEventHeader(_) => "Missing event header",
            Self::InvalidPayload(_) => "Invalid payload",
        };
        (self.status_code(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(
            WebhookError::MissingSignature.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            WebhookError::InvalidSignatureFormat("md5=1".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            WebhookError::InvalidPayload("eof".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            WebhookError::MissingEventHeader("X-GitHub-Event").status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn responses_do_not_echo_details() {
        let response = WebhookError::InvalidSignatureFormat("sha256=abc123".into()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
