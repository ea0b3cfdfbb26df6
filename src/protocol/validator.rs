//! 响应格式校验：按协议分派的结构检查与 schema 校验。
//!
//! Response format validation.
//!
//! Each protocol has its own [`FormatValidator`]: the REST checker looks for the
//! `{error, errorText, additionalErrors, data}` envelope, the JSON-RPC checker
//! compares correlation ids and looks for `{jsonrpc, id, result | error}`. Both
//! then hand the payload part to the caller's schema, unless the server reported
//! an error. A caller-supplied callback replaces the built-in checks entirely.
//!
//! Validation never fails loudly: the outcome is a plain value and the reason is
//! logged.

use crate::protocol::request::ExtraValidation;
use crate::protocol::schema::{AcceptAny, ResponseSchema};
use crate::protocol::RequestProtocol;
use crate::response::Payload;
use serde_json::Value;
use std::fmt;
use tracing::warn;

/// Stage at which a payload was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationStage {
    EmptyResponse,
    BaseFormat,
    Schema,
    IdMismatch,
    /// Rejected by a caller-supplied validation callback.
    Custom,
}

impl ValidationStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmptyResponse => "empty_response",
            Self::BaseFormat => "base_format",
            Self::Schema => "schema",
            Self::IdMismatch => "id_mismatch",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for ValidationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationOutcome {
    Valid,
    Invalid(ValidationStage),
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    fn invalid(stage: ValidationStage, reason: &str) -> Self {
        warn!(stage = stage.as_str(), reason, "response validation failed");
        Self::Invalid(stage)
    }
}

/// What a validator gets to look at.
#[derive(Clone, Copy)]
pub struct ValidationInput<'a> {
    pub payload: &'a Payload,
    pub schema: Option<&'a dyn ResponseSchema>,
    /// Correlation id of the original JSON-RPC request.
    pub request_id: Option<&'a Value>,
}

impl<'a> ValidationInput<'a> {
    fn schema(&self) -> &'a dyn ResponseSchema {
        self.schema.unwrap_or(&AcceptAny)
    }
}

pub trait FormatValidator: Send + Sync {
    fn validate(&self, input: &ValidationInput<'_>) -> ValidationOutcome;
}

/// Pick the validator for a request: the override if present, otherwise the
/// protocol's checker. Anything that is not JSON-RPC is checked as REST.
pub fn resolve_validator(
    protocol: RequestProtocol,
    extra: Option<&ExtraValidation>,
) -> Box<dyn FormatValidator> {
    if let Some(check) = extra {
        return Box::new(CustomFormatValidator::new(check.clone()));
    }

    match protocol {
        RequestProtocol::JsonRpc => Box::new(JsonRpcFormatValidator),
        RequestProtocol::Rest | RequestProtocol::PureRest => Box::new(RestFormatValidator),
    }
}

/// JavaScript-style truthiness, used for the REST `error` flag.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn has_keys(value: &Value, keys: &[&str]) -> bool {
    match value.as_object() {
        Some(obj) => keys.iter().all(|k| obj.contains_key(*k)),
        None => false,
    }
}

fn check_schema(schema: &dyn ResponseSchema, value: &Value) -> ValidationOutcome {
    match schema.validate(value) {
        Ok(()) => ValidationOutcome::Valid,
        Err(violation) => ValidationOutcome::invalid(ValidationStage::Schema, &violation.message),
    }
}

/// REST envelope checker.
#[derive(Debug, Clone, Copy, Default)]
pub struct RestFormatValidator;

impl RestFormatValidator {
    pub const ENVELOPE_KEYS: [&'static str; 4] = ["error", "errorText", "additionalErrors", "data"];
}

impl FormatValidator for RestFormatValidator {
    fn validate(&self, input: &ValidationInput<'_>) -> ValidationOutcome {
        let body = match input.payload {
            Payload::Json(Value::Null) => {
                return ValidationOutcome::invalid(ValidationStage::EmptyResponse, "response is empty")
            }
            Payload::Json(v) => v,
            Payload::Blob(b) if b.is_empty() => {
                return ValidationOutcome::invalid(ValidationStage::EmptyResponse, "response is empty")
            }
            Payload::Blob(_) => {
                return ValidationOutcome::invalid(
                    ValidationStage::BaseFormat,
                    "binary payload has no rest envelope",
                )
            }
        };

        if !has_keys(body, &Self::ENVELOPE_KEYS) {
            return ValidationOutcome::invalid(
                ValidationStage::BaseFormat,
                "response base format is not valid",
            );
        }

        // error payloads are exempt from schema checks
        if is_truthy(&body["error"]) {
            return ValidationOutcome::Valid;
        }

        check_schema(input.schema(), &body["data"])
    }
}

/// JSON-RPC envelope checker.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRpcFormatValidator;

impl JsonRpcFormatValidator {
    fn has_valid_error(body: &Value) -> bool {
        let Some(error) = body.get("error").filter(|e| e.is_object()) else {
            return false;
        };
        has_keys(error, &["code", "message", "data"])
            && error.get("data").map(|d| has_keys(d, &["trKey"])).unwrap_or(false)
    }
}

impl FormatValidator for JsonRpcFormatValidator {
    fn validate(&self, input: &ValidationInput<'_>) -> ValidationOutcome {
        let response_id = match input.payload {
            Payload::Json(v) => v.get("id"),
            Payload::Blob(_) => None,
        };
        if input.request_id != response_id {
            return ValidationOutcome::invalid(
                ValidationStage::IdMismatch,
                "request-response ids are not equal",
            );
        }

        let body = match input.payload {
            Payload::Json(Value::Null) | Payload::Blob(_) => {
                return ValidationOutcome::invalid(ValidationStage::EmptyResponse, "response is empty")
            }
            Payload::Json(v) => v,
        };

        let has_result = body.get("result").is_some();
        if !has_keys(body, &["jsonrpc", "id"]) || !(has_result || Self::has_valid_error(body)) {
            return ValidationOutcome::invalid(
                ValidationStage::BaseFormat,
                "response base format is not valid",
            );
        }

        if body.get("error").map(|e| !e.is_null()).unwrap_or(false) {
            return ValidationOutcome::Valid;
        }

        check_schema(input.schema(), &body["result"])
    }
}

/// Pass-through wrapper around a caller-supplied validation callback.
#[derive(Clone)]
pub struct CustomFormatValidator {
    check: ExtraValidation,
}

impl CustomFormatValidator {
    pub fn new(check: ExtraValidation) -> Self {
        Self { check }
    }
}

impl FormatValidator for CustomFormatValidator {
    fn validate(&self, input: &ValidationInput<'_>) -> ValidationOutcome {
        if (self.check)(input) {
            ValidationOutcome::Valid
        } else {
            ValidationOutcome::invalid(ValidationStage::Custom, "rejected by extra validation")
        }
    }
}
