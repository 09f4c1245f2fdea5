//! Error types for awscmd
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for awscmd
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Unknown command: {command}")]
    UnknownCommand { command: String },

    #[error("Unknown parameter '{parameter}' for command {command}")]
    UnknownParameter { command: String, parameter: String },

    #[error("Missing required parameter '{parameter}' for command {command}")]
    MissingParameter { command: String, parameter: String },

    #[error("Invalid value for parameter '{parameter}': {message}")]
    InvalidParameterValue { parameter: String, message: String },

    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },

    #[error("Invalid service model '{service}': {message}")]
    InvalidModel { service: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Transport Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("{code} (HTTP {status}): {message}")]
    Service {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Name resolution failure for '{host}'; check that the region '{region}' and endpoint are valid")]
    NameResolution { host: String, region: String },

    #[error("Rate limited, retry after {retry_after_seconds}s")]
    RateLimited { retry_after_seconds: u64 },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Max retries ({max_retries}) exceeded")]
    MaxRetriesExceeded { max_retries: u32 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    // ============================================================================
    // Invocation Errors
    // ============================================================================
    #[error("Page {page} failed: {source}")]
    PageFailed {
        page: u32,
        #[source]
        source: Box<Error>,
    },

    #[error("Operation cancelled")]
    Cancelled,

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an unknown command error
    pub fn unknown_command(command: impl Into<String>) -> Self {
        Self::UnknownCommand {
            command: command.into(),
        }
    }

    /// Create a missing parameter error
    pub fn missing_parameter(command: impl Into<String>, parameter: impl Into<String>) -> Self {
        Self::MissingParameter {
            command: command.into(),
            parameter: parameter.into(),
        }
    }

    /// Create an invalid parameter value error
    pub fn invalid_value(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameterValue {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Create an invalid selector error
    pub fn invalid_selector(selector: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidSelector {
            selector: selector.into(),
            message: message.into(),
        }
    }

    /// Create an invalid model error
    pub fn invalid_model(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidModel {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a service fault
    pub fn service(status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Service {
            status,
            code: code.into(),
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Wrap a failure that happened while fetching the given page
    pub fn page_failed(page: u32, source: Error) -> Self {
        Self::PageFailed {
            page,
            source: Box::new(source),
        }
    }

    /// Check if this error was detected before any transport call
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::Config { .. }
                | Error::UnknownCommand { .. }
                | Error::UnknownParameter { .. }
                | Error::MissingParameter { .. }
                | Error::InvalidParameterValue { .. }
                | Error::InvalidSelector { .. }
                | Error::InvalidModel { .. }
                | Error::YamlParse(_)
        )
    }

    /// Check if this error is a cancellation, looking through page wrappers
    pub fn is_cancelled(&self) -> bool {
        match self {
            Error::Cancelled => true,
            Error::PageFailed { source, .. } => source.is_cancelled(),
            _ => false,
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(_) | Error::RateLimited { .. } | Error::Timeout { .. } => true,
            Error::HttpStatus { status, .. } | Error::Service { status, .. } => {
                is_retryable_status(*status)
            }
            _ => false,
        }
    }
}

/// Check if an HTTP status code is retryable
fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// Result type alias for awscmd
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
