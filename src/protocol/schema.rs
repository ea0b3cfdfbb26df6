//! Caller-supplied response schemas.
//!
//! The pipeline treats a schema as a black box that either accepts a value or
//! reports why it does not. Plain closures work, and [`JsonSchemaValidator`]
//! plugs a compiled JSON Schema in.

use crate::error::ErrorContext;
use crate::{Error, Result};
use jsonschema::{Draft, JSONSchema};
use serde_json::Value;

/// Reason a schema rejected a value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct SchemaViolation {
    pub message: String,
}

impl SchemaViolation {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub trait ResponseSchema: Send + Sync {
    /// `Ok(())` means the value is accepted.
    fn validate(&self, value: &Value) -> std::result::Result<(), SchemaViolation>;
}

impl<F> ResponseSchema for F
where
    F: Fn(&Value) -> std::result::Result<(), SchemaViolation> + Send + Sync,
{
    fn validate(&self, value: &Value) -> std::result::Result<(), SchemaViolation> {
        self(value)
    }
}

/// Accepts every value. Used when a request carries no schema.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAny;

impl ResponseSchema for AcceptAny {
    fn validate(&self, _value: &Value) -> std::result::Result<(), SchemaViolation> {
        Ok(())
    }
}

/// JSON Schema (draft 7) backed response schema.
pub struct JsonSchemaValidator {
    schema: JSONSchema,
}

impl JsonSchemaValidator {
    pub fn compile(schema: &Value) -> Result<Self> {
        let schema = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(schema)
            .map_err(|e| {
                Error::configuration_with_context(
                    format!("Failed to compile schema: {}", e),
                    ErrorContext::new().with_source("json_schema"),
                )
            })?;
        Ok(Self { schema })
    }

    pub fn from_json_str(schema: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(schema)?;
        Self::compile(&value)
    }
}

impl ResponseSchema for JsonSchemaValidator {
    fn validate(&self, value: &Value) -> std::result::Result<(), SchemaViolation> {
        self.schema.validate(value).map_err(|errors| {
            let message = errors
                .map(|e| format!("{} at '{}'", e, e.instance_path))
                .collect::<Vec<_>>()
                .join("; ");
            SchemaViolation::new(message)
        })
    }
}

impl std::fmt::Debug for JsonSchemaValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonSchemaValidator").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_closure_schema() {
        let schema = |v: &Value| {
            if v.get("id").and_then(Value::as_i64).is_some() {
                Ok(())
            } else {
                Err(SchemaViolation::new("id must be an integer"))
            }
        };
        assert!(schema.validate(&json!({"id": 1})).is_ok());
        assert_eq!(
            schema.validate(&json!({"id": "x"})).unwrap_err().message,
            "id must be an integer"
        );
    }

    #[test]
    fn test_json_schema_validator() {
        let schema = JsonSchemaValidator::compile(&json!({
            "type": "object",
            "required": ["id"],
            "properties": { "id": { "type": "integer" } }
        }))
        .unwrap();

        assert!(schema.validate(&json!({"id": 1})).is_ok());
        let err = schema.validate(&json!({"id": "one"})).unwrap_err();
        assert!(err.message.contains("/id"));
        assert!(schema.validate(&json!({})).is_err());
    }

    #[test]
    fn test_invalid_schema_fails_to_compile() {
        let err = JsonSchemaValidator::compile(&json!({"type": 12})).unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
        assert!(JsonSchemaValidator::from_json_str("{not json").is_err());
    }

    #[test]
    fn test_accept_any() {
        assert!(AcceptAny.validate(&Value::Null).is_ok());
    }
}
