//! Error types for the nano service core.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using NanoError.
pub type NanoResult<T> = Result<T, NanoError>;

/// Errors produced while dispatching and validating a request.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum NanoError {
    // === Client Errors ===
    /// One or more accumulated query parameter problems.
    #[error("{}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("No such workspace: {0}")]
    WorkspaceNotFound(String),

    #[error("No such dataset: {dataset} in workspace: {workspace}")]
    DatasetNotFound { dataset: String, workspace: String },

    #[error("Cannot locate provided srs: {0}")]
    UnresolvableCrs(String),

    // === Server Errors ===
    /// The resolver was used before a path match was stored on the request.
    #[error("No path match stored for request")]
    NoPathMatch,

    #[error("Template error: {0}")]
    Template(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl NanoError {
    /// Build a validation error from a single message.
    pub fn invalid(message: impl Into<String>) -> Self {
        NanoError::Validation(vec![message.into()])
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            NanoError::Validation(_) | NanoError::UnresolvableCrs(_) => 400,

            NanoError::WorkspaceNotFound(_) | NanoError::DatasetNotFound { .. } => 404,

            NanoError::NoPathMatch
            | NanoError::Template(_)
            | NanoError::Internal(_) => 500,
        }
    }

    /// True when the error stems from the client's request.
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }

    /// Convert to an ExceptionResponse.
    ///
    /// Server errors are reported with a generic detail; the full message
    /// is only meant for logs.
    pub fn to_exception(&self) -> ExceptionResponse {
        match self {
            NanoError::Validation(errors) => {
                ExceptionResponse::bad_request(self.to_string()).with_errors(errors.clone())
            }
            NanoError::UnresolvableCrs(_) => ExceptionResponse::bad_request(self.to_string()),
            NanoError::WorkspaceNotFound(_) | NanoError::DatasetNotFound { .. } => {
                ExceptionResponse::not_found(self.to_string())
            }
            NanoError::NoPathMatch
            | NanoError::Template(_)
            | NanoError::Internal(_) => ExceptionResponse::internal_error("Internal server error"),
        }
    }
}

impl From<std::io::Error> for NanoError {
    fn from(err: std::io::Error) -> Self {
        NanoError::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for NanoError {
    fn from(err: serde_json::Error) -> Self {
        NanoError::Internal(format!("JSON error: {}", err))
    }
}

/// JSON body returned for every failed request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExceptionResponse {
    /// Exception type identifier.
    #[serde(rename = "type")]
    pub type_: String,

    /// Human-readable title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// HTTP status code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,

    /// Detailed error message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// Individual validation messages, in the order they were found.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,

    /// URI of the request that caused the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
}

impl ExceptionResponse {
    /// Create a new exception response.
    pub fn new(type_: impl Into<String>, status: u16, detail: impl Into<String>) -> Self {
        Self {
            type_: type_.into(),
            title: None,
            status: Some(status),
            detail: Some(detail.into()),
            errors: Vec::new(),
            instance: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    pub fn with_errors(mut self, errors: Vec<String>) -> Self {
        self.errors = errors;
        self
    }

    /// Create a 404 Not Found exception.
    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new("not-found", 404, detail).with_title("Not Found")
    }

    /// Create a 400 Bad Request exception.
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new("invalid-parameter-value", 400, detail).with_title("Bad Request")
    }

    /// Create a 500 Internal Server Error exception.
    pub fn internal_error(detail: impl Into<String>) -> Self {
        Self::new("server-error", 500, detail).with_title("Internal Server Error")
    }
}
