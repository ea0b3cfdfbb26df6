//! Minimal prelude for application code.
//!
//! Goal: reduce import noise without hiding important concepts.

pub use crate::client::{FetchClient, FetchClientBuilder};
pub use crate::config::ClientConfig;
pub use crate::facade::Requests;
pub use crate::protocol::{
    ErrorOutput, HttpMethod, JsonRpcEnvelope, JsonSchemaValidator, MultipartBody, ParseKind,
    RequestDescriptor, RequestOptions, RequestProtocol, SchemaViolation,
};
pub use crate::response::{ApiResponse, ErrorResponse, Payload};
pub use crate::error_code::FailureKind;
