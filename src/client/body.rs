//! 请求体构建与响应体解析。
//!
//! Request body building and response body parsing.

use crate::error::ErrorContext;
use crate::protocol::{
    HttpMethod, JsonRpcEnvelope, MultipartBody, ParseKind, RequestBody, RequestProtocol,
};
use crate::response::Payload;
use crate::transport::RawResponse;
use crate::{Error, Result};
use serde_json::{Map, Value};

/// Body as handed to the transport.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchBody {
    /// Serialized JSON.
    Text(String),
    Multipart(MultipartBody),
}

/// Build the wire body for a request.
///
/// GET never carries a body. JSON-RPC bodies are the caller's object with
/// `jsonrpc` and `id` merged in; the envelope keys win over caller keys.
/// Other protocols send JSON serialized and multipart untouched.
pub fn build_body(
    method: HttpMethod,
    protocol: RequestProtocol,
    body: Option<&RequestBody>,
    envelope: Option<&JsonRpcEnvelope>,
) -> Result<Option<FetchBody>> {
    if method == HttpMethod::Get {
        return Ok(None);
    }

    if protocol == RequestProtocol::JsonRpc {
        let envelope = envelope.ok_or_else(|| {
            Error::validation_with_context(
                "json-rpc requests require an id and version",
                ErrorContext::new()
                    .with_field_path("json_rpc")
                    .with_source("build_body"),
            )
        })?;
        return json_rpc_body(body, envelope).map(Some);
    }

    match body {
        None => Ok(None),
        Some(RequestBody::Json(value)) => Ok(Some(FetchBody::Text(serde_json::to_string(value)?))),
        Some(RequestBody::Multipart(form)) => Ok(Some(FetchBody::Multipart(form.clone()))),
    }
}

fn json_rpc_body(body: Option<&RequestBody>, envelope: &JsonRpcEnvelope) -> Result<FetchBody> {
    let mut object = match body {
        None | Some(RequestBody::Json(Value::Null)) => Map::new(),
        Some(RequestBody::Json(Value::Object(map))) => map.clone(),
        Some(RequestBody::Json(_)) => {
            return Err(Error::validation_with_context(
                "json-rpc body must be a JSON object",
                ErrorContext::new()
                    .with_field_path("body")
                    .with_source("build_body"),
            ))
        }
        Some(RequestBody::Multipart(_)) => {
            return Err(Error::validation_with_context(
                "json-rpc requests cannot carry a multipart body",
                ErrorContext::new()
                    .with_field_path("body")
                    .with_source("build_body"),
            ))
        }
    };

    object.insert("jsonrpc".into(), Value::String(envelope.version.clone()));
    object.insert("id".into(), envelope.id.clone());

    Ok(FetchBody::Text(serde_json::to_string(&Value::Object(object))?))
}

/// Non-ok responses are always read as JSON; ok responses use the declared kind.
pub fn select_parse_kind(ok: bool, declared: Option<ParseKind>) -> ParseKind {
    if ok {
        declared.unwrap_or_default()
    } else {
        ParseKind::Json
    }
}

/// Read and decode the whole body. An empty JSON body decodes to `null`.
pub async fn parse_response(response: RawResponse, kind: ParseKind) -> Result<Payload> {
    let bytes = response.bytes().await?;
    match kind {
        ParseKind::Blob => Ok(Payload::Blob(bytes)),
        ParseKind::Json => {
            if bytes.iter().all(u8::is_ascii_whitespace) {
                return Ok(Payload::Json(Value::Null));
            }
            Ok(Payload::Json(serde_json::from_slice(&bytes)?))
        }
    }
}
