use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::models::analysis::TextOrigin;

/// Stable error kinds callers can branch on without string matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    #[serde(rename = "InvalidInputError")]
    InvalidInput,
    #[serde(rename = "FetchError")]
    Fetch,
    #[serde(rename = "ExtractionError")]
    Extraction,
    #[serde(rename = "InvalidFormatError")]
    InvalidFormat,
    #[serde(rename = "ConfigurationError")]
    Configuration,
    #[serde(rename = "UpstreamError")]
    Upstream,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "InvalidInputError",
            ErrorKind::Fetch => "FetchError",
            ErrorKind::Extraction => "ExtractionError",
            ErrorKind::InvalidFormat => "InvalidFormatError",
            ErrorKind::Configuration => "ConfigurationError",
            ErrorKind::Upstream => "UpstreamError",
        }
    }

    /// Only a deployment problem cannot be fixed by the caller changing or
    /// repeating the request.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ErrorKind::Configuration)
    }

    fn status(&self) -> StatusCode {
        match self {
            ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::InvalidFormat => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ErrorKind::Extraction => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::Fetch | ErrorKind::Upstream => StatusCode::BAD_GATEWAY,
            ErrorKind::Configuration => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Every way an analysis run can fail. Each variant aborts the run at the
/// stage that raised it.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to fetch job description: {0}")]
    Fetch(String),

    #[error("No extractable text in {origin}: {message}")]
    Extraction { origin: TextOrigin, message: String },

    #[error("Invalid resume format: {0}")]
    InvalidFormat(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("LLM upstream error: {0}")]
    Upstream(String),
}

/// Failure descriptor handed back to the calling shell.
#[derive(Debug, Serialize)]
pub struct ErrorDescriptor {
    pub success: bool,
    pub error_kind: ErrorKind,
    pub message: String,
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::InvalidInput(_) => ErrorKind::InvalidInput,
            PipelineError::Fetch(_) => ErrorKind::Fetch,
            PipelineError::Extraction { .. } => ErrorKind::Extraction,
            PipelineError::InvalidFormat(_) => ErrorKind::InvalidFormat,
            PipelineError::Configuration(_) => ErrorKind::Configuration,
            PipelineError::Upstream(_) => ErrorKind::Upstream,
        }
    }

    pub fn descriptor(&self) -> ErrorDescriptor {
        ErrorDescriptor {
            success: false,
            error_kind: self.kind(),
            message: self.to_string(),
        }
    }
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        if kind.is_recoverable() {
            tracing::warn!(error_kind = kind.as_str(), "{self}");
        } else {
            tracing::error!(error_kind = kind.as_str(), "{self}");
        }

        (kind.status(), Json(self.descriptor())).into_response()
    }
}
