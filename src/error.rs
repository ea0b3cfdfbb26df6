use crate::error_code::FailureKind;
use crate::protocol::validator::ValidationStage;
use crate::transport::TransportError;
use thiserror::Error;

/// Structured error context for better error handling and debugging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Field path or configuration key that caused the error (e.g., "timeout_ms", "body")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., expected type, actual value)
    pub details: Option<String>,
    /// Source of the error (e.g., "config_loader", "request_descriptor")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Internal error type of the request pipeline.
///
/// These never reach callers of [`crate::FetchClient::execute`]: the executor
/// catches them and folds them into [`crate::ErrorResponse`]. They do surface
/// from construction-time APIs (config loading, descriptor building).
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Validation error: {message}{}", format_context(.context))]
    Validation {
        message: String,
        context: ErrorContext,
    },

    #[error("Network transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Unacceptable HTTP status {status} ({status_text})")]
    UnacceptableStatus { status: u16, status_text: String },

    #[error("Response rejected at {stage} stage (HTTP {status})")]
    InvalidResponse {
        stage: ValidationStage,
        status: u16,
        status_text: String,
    },

    #[error("Failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML syntax error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    /// Create a new validation error with structured context
    pub fn validation_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Validation {
            message: msg.into(),
            context,
        }
    }

    /// Create a new configuration error with structured context
    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. } | Error::Validation { context, .. } => {
                Some(context)
            }
            _ => None,
        }
    }

    /// Status code of the response that triggered the error, if one arrived.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::UnacceptableStatus { status, .. } | Error::InvalidResponse { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// Map onto the caller-facing failure taxonomy.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Error::Transport(TransportError::Timeout) => FailureKind::TimeoutExceeded,
            Error::Transport(_) | Error::Io(_) => FailureKind::NetworkFailure,
            Error::UnacceptableStatus { .. } => FailureKind::UnacceptableStatus,
            Error::InvalidResponse { stage, .. } => match stage {
                ValidationStage::IdMismatch => FailureKind::CorrelationMismatch,
                ValidationStage::Schema => FailureKind::SchemaMismatch,
                ValidationStage::EmptyResponse
                | ValidationStage::BaseFormat
                | ValidationStage::Custom => FailureKind::MalformedBaseFormat,
            },
            Error::Decode(_) => FailureKind::MalformedBaseFormat,
            Error::Configuration { .. } | Error::Validation { .. } | Error::Yaml(_) => {
                FailureKind::InvalidRequest
            }
        }
    }

    /// Text shown verbatim when the caller asked for straight error output.
    ///
    /// Status-driven failures surface the HTTP status text; everything else
    /// surfaces its own message.
    pub fn raw_text(&self) -> String {
        match self {
            Error::UnacceptableStatus { status_text, .. }
            | Error::InvalidResponse { status_text, .. } => status_text.clone(),
            Error::Transport(e) => e.to_string(),
            other => other.to_string(),
        }
    }
}
