//! Canonical responses.
//!
//! Every request ends in exactly one [`ApiResponse`]. Callers tell success from
//! failure by matching on it; nothing in the request path returns `Err`.

pub mod formatter;

pub use formatter::ResponseFormatter;

use crate::error_code::FailureKind;
use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;

/// Decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    Blob(Bytes),
}

impl Payload {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Payload::Json(v) => Some(v),
            Payload::Blob(_) => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Payload::Blob(b) => Some(b),
            Payload::Json(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SuccessResponse {
    /// `data` of a REST envelope, `result` of a JSON-RPC envelope.
    pub data: Payload,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorResponse {
    /// Display text: raw or translated depending on the request's error output mode.
    #[serde(rename = "errorText")]
    pub error_text: String,
    pub kind: FailureKind,
    #[serde(rename = "additionalErrors")]
    pub additional_errors: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ErrorResponse {
    pub fn new(kind: FailureKind, error_text: impl Into<String>) -> Self {
        Self {
            error_text: error_text.into(),
            kind,
            additional_errors: Vec::new(),
            status: None,
        }
    }

    pub fn with_status(mut self, status: Option<u16>) -> Self {
        self.status = status;
        self
    }

    pub fn with_additional_errors(mut self, errors: Vec<Value>) -> Self {
        self.additional_errors = errors;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    Success(SuccessResponse),
    Error(ErrorResponse),
}

impl ApiResponse {
    pub fn success(data: Payload) -> Self {
        ApiResponse::Success(SuccessResponse { data })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ApiResponse::Success(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ApiResponse::Error(_))
    }

    pub fn data(&self) -> Option<&Payload> {
        match self {
            ApiResponse::Success(s) => Some(&s.data),
            ApiResponse::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorResponse> {
        match self {
            ApiResponse::Error(e) => Some(e),
            ApiResponse::Success(_) => None,
        }
    }

    pub fn into_result(self) -> std::result::Result<Payload, ErrorResponse> {
        match self {
            ApiResponse::Success(s) => Ok(s.data),
            ApiResponse::Error(e) => Err(e),
        }
    }

    /// Render as the REST-style envelope `{error, errorText, additionalErrors, data}`.
    ///
    /// Binary data is rendered as its byte length.
    pub fn to_envelope(&self) -> Value {
        match self {
            ApiResponse::Success(s) => {
                let data = match &s.data {
                    Payload::Json(v) => v.clone(),
                    Payload::Blob(b) => serde_json::json!({ "bytes": b.len() }),
                };
                serde_json::json!({
                    "error": false,
                    "errorText": "",
                    "additionalErrors": [],
                    "data": data,
                })
            }
            ApiResponse::Error(e) => serde_json::json!({
                "error": true,
                "errorText": e.error_text,
                "additionalErrors": e.additional_errors,
                "data": null,
                "kind": e.kind,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_accessors() {
        let ok = ApiResponse::success(Payload::Json(json!({"id": 1})));
        assert!(ok.is_success());
        assert_eq!(ok.data().and_then(Payload::as_json), Some(&json!({"id": 1})));
        assert!(ok.error().is_none());

        let err = ApiResponse::Error(ErrorResponse::new(FailureKind::TimeoutExceeded, "late"));
        assert!(err.is_error());
        assert_eq!(err.clone().into_result().unwrap_err().error_text, "late");
    }

    #[test]
    fn test_envelope_rendering() {
        let err = ApiResponse::Error(
            ErrorResponse::new(FailureKind::ProtocolReportedError, "bad input")
                .with_additional_errors(vec![json!({"field": "name"})]),
        );
        assert_eq!(
            err.to_envelope(),
            json!({
                "error": true,
                "errorText": "bad input",
                "additionalErrors": [{"field": "name"}],
                "data": null,
                "kind": "protocol_reported_error",
            })
        );

        let blob = ApiResponse::success(Payload::Blob(Bytes::from_static(b"abc")));
        assert_eq!(blob.to_envelope()["data"], json!({"bytes": 3}));
    }
}
