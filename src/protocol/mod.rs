//! Wire protocol definitions.
//!
//! This module contains the protocol-level vocabulary shared by the request
//! builder and the response validators: protocol tags, HTTP verbs, parse
//! kinds, the request descriptor and the schema collaborator.

pub mod request;
pub mod schema;
pub mod validator;

pub use request::{
    ErrorOutput, ExtraValidation, JsonRpcEnvelope, MultipartBody, MultipartField, RequestBody,
    RequestDescriptor, RequestOptions, Translator,
};
pub use schema::{AcceptAny, JsonSchemaValidator, ResponseSchema, SchemaViolation};
pub use validator::{
    resolve_validator, CustomFormatValidator, FormatValidator, JsonRpcFormatValidator,
    RestFormatValidator, ValidationInput, ValidationOutcome, ValidationStage,
};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Wire protocol a request speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestProtocol {
    #[serde(rename = "rest")]
    Rest,
    #[serde(rename = "json-rpc")]
    JsonRpc,
    #[serde(rename = "pure-rest")]
    PureRest,
}

impl RequestProtocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rest => "rest",
            Self::JsonRpc => "json-rpc",
            Self::PureRest => "pure-rest",
        }
    }
}

impl fmt::Display for RequestProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestProtocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rest" => Ok(Self::Rest),
            "json-rpc" | "jsonRpc" => Ok(Self::JsonRpc),
            "pure-rest" | "pureRest" => Ok(Self::PureRest),
            other => Err(format!("unknown request protocol '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    pub fn as_reqwest(&self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Patch => reqwest::Method::PATCH,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            other => Err(format!("unsupported http method '{}'", other)),
        }
    }
}

/// How a successful response body is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseKind {
    #[default]
    Json,
    Blob,
}
