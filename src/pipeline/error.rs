//! Pipeline errors and their HTTP shape
//!
//! Every failure leaves the server as
//! `{"success": false, "error": <short>, "code": <machine code>, "message": <detail>}`.
//! Raw collaborator error chains are logged by the handlers, never returned.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Failure talking to an external collaborator (storage provider or AI service)
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    /// The collaborator has no usable configuration
    #[error("not configured: {0}")]
    NotConfigured(String),

    /// The request did not complete in time
    #[error("request timed out")]
    Timeout,

    /// Connection-level failure
    #[error("transport error: {0}")]
    Transport(String),

    /// The collaborator answered with a non-success status
    #[error("status {status}: {detail}")]
    Status {
        /// HTTP status returned
        status: u16,
        /// Detail extracted from the response body
        detail: String,
    },

    /// The response body could not be decoded
    #[error("invalid response: {0}")]
    Decode(String),
}

impl UpstreamError {
    /// Whether a single retry may help
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout => true,
            Self::Status { status, .. } => *status >= 500,
            Self::NotConfigured(_) | Self::Decode(_) => false,
        }
    }

    /// Classify a `reqwest` failure
    #[must_use]
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if let Some(status) = err.status() {
            Self::Status {
                status: status.as_u16(),
                detail: err.to_string(),
            }
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Errors surfaced by the pipeline routes
#[derive(Debug, Error)]
pub enum PipelineError {
    /// No `pdf` field in the upload form
    #[error("No PDF file uploaded")]
    MissingFile,

    /// Uploaded file is not a PDF
    #[error("Invalid file type")]
    InvalidFileType {
        /// MIME type that was sent
        content_type: String,
    },

    /// Uploaded file exceeds the size limit
    #[error("File too large")]
    FileTooLarge {
        /// Limit in bytes
        max_bytes: u64,
    },

    /// A required request field is missing or empty
    #[error("Missing {field}")]
    MissingField {
        /// Field name as sent by clients
        field: &'static str,
    },

    /// An enumerated request field has an unknown value
    #[error("Invalid {field}")]
    InvalidField {
        /// Field name as sent by clients
        field: &'static str,
        /// Value received
        value: String,
        /// Accepted values
        expected: &'static str,
    },

    /// The request body could not be parsed
    #[error("Malformed payload")]
    MalformedPayload(String),

    /// Unknown document id
    #[error("Document not found")]
    DocumentNotFound(String),

    /// Storage provider failed
    #[error("PDF upload failed")]
    Storage(#[source] UpstreamError),

    /// Re-serving a stored PDF failed
    #[error("Failed to load PDF")]
    Proxy(#[source] UpstreamError),

    /// AI service failed
    #[error("Summarization failed")]
    Ai(#[source] UpstreamError),
}

/// JSON body of an error response
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Always `false`
    pub success: bool,
    /// Short error title
    pub error: String,
    /// Stable machine-readable code
    pub code: &'static str,
    /// Human-readable detail
    pub message: String,
}

impl PipelineError {
    /// HTTP status for this error
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MissingFile
            | Self::InvalidFileType { .. }
            | Self::MissingField { .. }
            | Self::InvalidField { .. }
            | Self::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            Self::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::DocumentNotFound(_) => StatusCode::NOT_FOUND,
            Self::Storage(err) | Self::Proxy(err) => upstream_status(err),
            Self::Ai(UpstreamError::Status { status, .. }) if *status >= 400 && *status < 500 => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::Ai(err) => upstream_status(err),
        }
    }

    /// Stable machine-readable code
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MissingFile => "missing_file",
            Self::InvalidFileType { .. } => "invalid_file_type",
            Self::FileTooLarge { .. } => "file_too_large",
            Self::MissingField { .. } => "missing_field",
            Self::InvalidField { .. } => "invalid_field",
            Self::MalformedPayload(_) => "malformed_payload",
            Self::DocumentNotFound(_) => "document_not_found",
            Self::Storage(UpstreamError::NotConfigured(_)) => "storage_unavailable",
            Self::Storage(UpstreamError::Timeout) => "storage_timeout",
            Self::Storage(_) => "storage_failed",
            Self::Proxy(_) => "proxy_failed",
            Self::Ai(UpstreamError::Timeout) => "ai_timeout",
            Self::Ai(UpstreamError::Status { status, .. }) if *status >= 400 && *status < 500 => {
                "ai_rejected"
            }
            Self::Ai(UpstreamError::NotConfigured(_)) => "ai_unavailable",
            Self::Ai(_) => "ai_failed",
        }
    }

    /// Human-readable detail for clients
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::MissingFile => "Please select a PDF file to upload".to_string(),
            Self::InvalidFileType { content_type } => {
                format!("Only PDF files are allowed (received '{content_type}')")
            }
            Self::FileTooLarge { max_bytes } => {
                format!("PDF file must be smaller than {}MB", max_bytes / (1024 * 1024))
            }
            Self::MissingField { field } => format!("'{field}' is required"),
            Self::InvalidField {
                field,
                value,
                expected,
            } => format!("'{value}' is not a valid {field}; expected one of {expected}"),
            Self::MalformedPayload(detail) => detail.clone(),
            Self::DocumentNotFound(id) => format!("No document with id '{id}'"),
            Self::Storage(err) | Self::Proxy(err) | Self::Ai(err) => match err {
                UpstreamError::Status { detail, .. } => detail.clone(),
                UpstreamError::Timeout => "The request timed out, please try again".to_string(),
                other => other.to_string(),
            },
        }
    }

    /// Response body for this error
    #[must_use]
    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            success: false,
            error: self.to_string(),
            code: self.code(),
            message: self.message(),
        }
    }
}

const fn upstream_status(err: &UpstreamError) -> StatusCode {
    match err {
        UpstreamError::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
        UpstreamError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        UpstreamError::Transport(_) | UpstreamError::Status { .. } | UpstreamError::Decode(_) => {
            StatusCode::BAD_GATEWAY
        }
    }
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}
