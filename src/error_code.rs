//! 失败分类：规范化错误响应中携带的机器可读失败类型。
//!
//! Failure taxonomy carried by every canonical error response.
//!
//! Each request that does not produce validated data ends up in exactly one of
//! these categories, whatever stage it failed at. The category is the only
//! machine-readable context attached to [`crate::ErrorResponse`]; the stage
//! diagnostics stay in the logs.
//!
//! | Code  | Kind                    | Origin                                   |
//! |-------|-------------------------|------------------------------------------|
//! | F1001 | `NetworkFailure`        | transport threw (DNS, refused, aborted)  |
//! | F1002 | `TimeoutExceeded`       | timer won the race                       |
//! | F2001 | `UnacceptableStatus`    | status outside the whitelist             |
//! | F3001 | `MalformedBaseFormat`   | envelope shape check failed              |
//! | F3002 | `SchemaMismatch`        | caller schema rejected the payload       |
//! | F3003 | `CorrelationMismatch`   | JSON-RPC id did not match                |
//! | F4001 | `ProtocolReportedError` | server sent a well-formed error envelope |
//! | F9001 | `InvalidRequest`        | request could not be built               |
//!
//! ## Example
//!
//! ```rust
//! use fetch_api::error_code::FailureKind;
//!
//! let kind = FailureKind::from_name("timeout_exceeded").unwrap();
//! assert_eq!(kind.code(), "F1002");
//! assert!(kind.is_transport());
//! ```

use serde::Serialize;
use std::fmt;

/// Category of a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// F1001: the transport call itself failed
    NetworkFailure,
    /// F1002: no response before the configured timeout
    TimeoutExceeded,
    /// F2001: HTTP status not in the acceptable whitelist
    UnacceptableStatus,
    /// F3001: body did not match the protocol envelope (or could not be decoded)
    MalformedBaseFormat,
    /// F3002: payload rejected by the caller-supplied schema
    SchemaMismatch,
    /// F3003: JSON-RPC response id differs from the request id
    CorrelationMismatch,
    /// F4001: server reported an error inside a valid envelope
    ProtocolReportedError,
    /// F9001: request descriptor could not be turned into a wire request
    InvalidRequest,
}

impl FailureKind {
    #[inline]
    pub fn code(&self) -> &'static str {
        match self {
            Self::NetworkFailure => "F1001",
            Self::TimeoutExceeded => "F1002",
            Self::UnacceptableStatus => "F2001",
            Self::MalformedBaseFormat => "F3001",
            Self::SchemaMismatch => "F3002",
            Self::CorrelationMismatch => "F3003",
            Self::ProtocolReportedError => "F4001",
            Self::InvalidRequest => "F9001",
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::NetworkFailure => "network_failure",
            Self::TimeoutExceeded => "timeout_exceeded",
            Self::UnacceptableStatus => "unacceptable_status",
            Self::MalformedBaseFormat => "malformed_base_format",
            Self::SchemaMismatch => "schema_mismatch",
            Self::CorrelationMismatch => "correlation_mismatch",
            Self::ProtocolReportedError => "protocol_reported_error",
            Self::InvalidRequest => "invalid_request",
        }
    }

    /// True when the failure happened before any response body was seen.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::NetworkFailure | Self::TimeoutExceeded)
    }

    /// True when a response arrived but was rejected by validation.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MalformedBaseFormat | Self::SchemaMismatch | Self::CorrelationMismatch
        )
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "network_failure" => Self::NetworkFailure,
            "timeout_exceeded" => Self::TimeoutExceeded,
            "unacceptable_status" => Self::UnacceptableStatus,
            "malformed_base_format" => Self::MalformedBaseFormat,
            "schema_mismatch" => Self::SchemaMismatch,
            "correlation_mismatch" => Self::CorrelationMismatch,
            "protocol_reported_error" => Self::ProtocolReportedError,
            "invalid_request" => Self::InvalidRequest,
            _ => return None,
        })
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.code())
    }
}
