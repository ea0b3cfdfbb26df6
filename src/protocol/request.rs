//! Request descriptor: the immutable description of one call.

use crate::error::ErrorContext;
use crate::protocol::schema::ResponseSchema;
use crate::protocol::validator::ValidationInput;
use crate::protocol::{HttpMethod, ParseKind, RequestProtocol};
use crate::{Error, Result};
use bytes::Bytes;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

/// Maps an error key to user-facing text.
pub type Translator = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Replaces the built-in structural and schema checks entirely.
pub type ExtraValidation = Arc<dyn Fn(&ValidationInput<'_>) -> bool + Send + Sync>;

/// How error text is produced for the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorOutput {
    /// Replace raw transport/provider text by a translated generic key.
    #[default]
    Generic,
    /// Surface raw transport/provider text verbatim.
    Straight,
}

/// JSON-RPC correlation id and version marker.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonRpcEnvelope {
    pub id: Value,
    pub version: String,
}

impl JsonRpcEnvelope {
    pub const DEFAULT_VERSION: &'static str = "2.0";

    pub fn new(id: impl Into<Value>) -> Self {
        Self {
            id: id.into(),
            version: Self::DEFAULT_VERSION.to_string(),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Envelope with a fresh random id.
    pub fn generate() -> Self {
        Self::new(Uuid::new_v4().to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MultipartField {
    Text {
        name: String,
        value: String,
    },
    Bytes {
        name: String,
        data: Bytes,
        file_name: Option<String>,
        mime: Option<String>,
    },
}

/// Multipart payload, sent as-is (never serialized to a string).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultipartBody {
    fields: Vec<MultipartField>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(MultipartField::Text {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn file(
        mut self,
        name: impl Into<String>,
        data: impl Into<Bytes>,
        file_name: Option<String>,
        mime: Option<String>,
    ) -> Self {
        self.fields.push(MultipartField::Bytes {
            name: name.into(),
            data: data.into(),
            file_name,
            mime,
        });
        self
    }

    pub fn fields(&self) -> &[MultipartField] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn into_form(self) -> reqwest::multipart::Form {
        use reqwest::multipart::{Form, Part};

        self.fields
            .into_iter()
            .fold(Form::new(), |form, field| match field {
                MultipartField::Text { name, value } => form.text(name, value),
                MultipartField::Bytes {
                    name,
                    data,
                    file_name,
                    mime,
                } => {
                    let build = || {
                        let part = Part::bytes(data.to_vec());
                        match &file_name {
                            Some(f) => part.file_name(f.clone()),
                            None => part,
                        }
                    };
                    let part = match &mime {
                        Some(m) => build().mime_str(m).unwrap_or_else(|e| {
                            warn!(
                                field = name.as_str(),
                                mime = m.as_str(),
                                error = %e,
                                "ignoring invalid multipart mime type"
                            );
                            build()
                        }),
                        None => build(),
                    };
                    form.part(name, part)
                }
            })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    Multipart(MultipartBody),
}

/// Per-call options shared by the generic entry point and the verb façades.
#[derive(Clone, Default)]
pub struct RequestOptions {
    pub headers: HashMap<String, String>,
    pub query: Option<Vec<(String, String)>>,
    pub body: Option<RequestBody>,
    pub parse_kind: Option<ParseKind>,
    pub json_rpc: Option<JsonRpcEnvelope>,
    pub schema: Option<Arc<dyn ResponseSchema>>,
    pub extra_validation: Option<ExtraValidation>,
    pub error_output: ErrorOutput,
    pub translator: Option<Translator>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Append one query parameter (order is preserved).
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query
            .get_or_insert_with(Vec::new)
            .push((key.into(), value.into()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    pub fn multipart(mut self, body: MultipartBody) -> Self {
        self.body = Some(RequestBody::Multipart(body));
        self
    }

    pub fn parse_kind(mut self, kind: ParseKind) -> Self {
        self.parse_kind = Some(kind);
        self
    }

    pub fn json_rpc(mut self, envelope: JsonRpcEnvelope) -> Self {
        self.json_rpc = Some(envelope);
        self
    }

    pub fn schema(mut self, schema: impl ResponseSchema + 'static) -> Self {
        self.schema = Some(Arc::new(schema));
        self
    }

    pub fn shared_schema(mut self, schema: Arc<dyn ResponseSchema>) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn extra_validation<F>(mut self, check: F) -> Self
    where
        F: Fn(&ValidationInput<'_>) -> bool + Send + Sync + 'static,
    {
        self.extra_validation = Some(Arc::new(check));
        self
    }

    pub fn error_output(mut self, mode: ErrorOutput) -> Self {
        self.error_output = mode;
        self
    }

    pub fn translator<F>(mut self, translate: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.translator = Some(Arc::new(translate));
        self
    }
}

impl fmt::Debug for RequestOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestOptions")
            .field("headers", &self.headers)
            .field("query", &self.query)
            .field("body", &self.body)
            .field("parse_kind", &self.parse_kind)
            .field("json_rpc", &self.json_rpc)
            .field("schema", &self.schema.is_some())
            .field("extra_validation", &self.extra_validation.is_some())
            .field("error_output", &self.error_output)
            .field("translator", &self.translator.is_some())
            .finish()
    }
}

/// Immutable description of a single request.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    endpoint: String,
    method: HttpMethod,
    protocol: RequestProtocol,
    options: RequestOptions,
}

impl RequestDescriptor {
    /// Build a descriptor, enforcing the protocol invariants:
    /// JSON-RPC requests carry an envelope and GET requests carry no body.
    pub fn new(
        method: HttpMethod,
        protocol: RequestProtocol,
        endpoint: impl Into<String>,
        options: RequestOptions,
    ) -> Result<Self> {
        if protocol == RequestProtocol::JsonRpc && options.json_rpc.is_none() {
            return Err(Error::validation_with_context(
                "json-rpc requests require an id and version",
                ErrorContext::new()
                    .with_field_path("json_rpc")
                    .with_source("request_descriptor"),
            ));
        }
        if method == HttpMethod::Get && options.body.is_some() {
            return Err(Error::validation_with_context(
                "GET requests cannot carry a body",
                ErrorContext::new()
                    .with_field_path("body")
                    .with_source("request_descriptor"),
            ));
        }

        Ok(Self {
            endpoint: endpoint.into(),
            method,
            protocol,
            options,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn protocol(&self) -> RequestProtocol {
        self.protocol
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.options.headers
    }

    pub fn query(&self) -> Option<&[(String, String)]> {
        self.options.query.as_deref()
    }

    pub fn body(&self) -> Option<&RequestBody> {
        self.options.body.as_ref()
    }

    pub fn parse_kind(&self) -> Option<ParseKind> {
        self.options.parse_kind
    }

    pub fn json_rpc(&self) -> Option<&JsonRpcEnvelope> {
        self.options.json_rpc.as_ref()
    }

    pub fn schema(&self) -> Option<&dyn ResponseSchema> {
        self.options.schema.as_deref()
    }

    pub fn extra_validation(&self) -> Option<&ExtraValidation> {
        self.options.extra_validation.as_ref()
    }

    pub fn error_output(&self) -> ErrorOutput {
        self.options.error_output
    }

    pub fn translator(&self) -> Option<&Translator> {
        self.options.translator.as_ref()
    }
}
