//! Turns validated payloads and pipeline errors into [`ApiResponse`]s.

use crate::config::{NETWORK_ERROR_KEY, TIMEOUT_ERROR_KEY};
use crate::error_code::FailureKind;
use crate::protocol::validator::is_truthy;
use crate::protocol::{ErrorOutput, RequestProtocol, Translator};
use crate::response::{ApiResponse, ErrorResponse, Payload};
use crate::transport::TransportError;
use crate::Error;
use serde_json::Value;

#[derive(Clone, Copy)]
pub struct ResponseFormatter<'a> {
    protocol: RequestProtocol,
    error_output: ErrorOutput,
    translator: Option<&'a Translator>,
    network_error_key: &'a str,
    timeout_error_key: &'a str,
}

impl<'a> ResponseFormatter<'a> {
    pub fn new(
        protocol: RequestProtocol,
        error_output: ErrorOutput,
        translator: Option<&'a Translator>,
    ) -> Self {
        Self {
            protocol,
            error_output,
            translator,
            network_error_key: NETWORK_ERROR_KEY,
            timeout_error_key: TIMEOUT_ERROR_KEY,
        }
    }

    pub fn with_error_keys(mut self, network: &'a str, timeout: &'a str) -> Self {
        self.network_error_key = network;
        self.timeout_error_key = timeout;
        self
    }

    /// Translate a key; without a translator the key is its own text.
    pub fn translate(&self, key: &str) -> String {
        match self.translator {
            Some(t) => t(key),
            None => key.to_string(),
        }
    }

    fn display(&self, raw: &str, key: &str) -> String {
        match self.error_output {
            ErrorOutput::Straight => raw.to_string(),
            ErrorOutput::Generic => self.translate(key),
        }
    }

    /// Shape an already validated payload.
    pub fn format(&self, payload: Payload) -> ApiResponse {
        let body = match payload {
            Payload::Json(body) => body,
            blob @ Payload::Blob(_) => return ApiResponse::success(blob),
        };

        match self.protocol {
            RequestProtocol::JsonRpc => self.format_json_rpc(body),
            RequestProtocol::Rest | RequestProtocol::PureRest => self.format_rest(body),
        }
    }

    fn format_rest(&self, mut body: Value) -> ApiResponse {
        if !is_truthy(&body["error"]) {
            let data = body.get_mut("data").map(Value::take).unwrap_or(Value::Null);
            return ApiResponse::success(Payload::Json(data));
        }

        let additional = match body.get_mut("additionalErrors").map(Value::take) {
            Some(Value::Array(errors)) => errors,
            Some(Value::Null) | None => Vec::new(),
            Some(other) => vec![other],
        };
        let raw = body["errorText"].as_str().unwrap_or_default();
        let key = if raw.is_empty() { self.network_error_key } else { raw };

        ApiResponse::Error(
            ErrorResponse::new(FailureKind::ProtocolReportedError, self.display(raw, key))
                .with_additional_errors(additional),
        )
    }

    fn format_json_rpc(&self, mut body: Value) -> ApiResponse {
        if body.get("error").map(Value::is_null).unwrap_or(true) {
            let result = body.get_mut("result").map(Value::take).unwrap_or(Value::Null);
            return ApiResponse::success(Payload::Json(result));
        }

        let error = &body["error"];

        let message = error["message"].as_str().unwrap_or_default();
        let key = error["data"]["trKey"]
            .as_str()
            .unwrap_or(self.network_error_key);

        ApiResponse::Error(ErrorResponse::new(
            FailureKind::ProtocolReportedError,
            self.display(message, key),
        ))
    }

    /// Shape a failure caught anywhere in the request pipeline.
    ///
    /// Timeouts carry the timeout key in both output modes.
    pub fn failure(&self, error: &Error) -> ApiResponse {
        let kind = error.failure_kind();
        let text = match kind {
            FailureKind::TimeoutExceeded => {
                self.display(self.timeout_error_key, self.timeout_error_key)
            }
            _ => self.display(&error.raw_text(), self.network_error_key),
        };
        ApiResponse::Error(ErrorResponse::new(kind, text).with_status(error.status()))
    }

    pub fn timeout(&self) -> ApiResponse {
        self.failure(&Error::Transport(TransportError::Timeout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::validator::ValidationStage;
    use serde_json::json;
    use std::sync::Arc;

    fn shouting() -> Translator {
        Arc::new(|key: &str| key.to_uppercase())
    }

    #[test]
    fn test_rest_success_extracts_data() {
        let f = ResponseFormatter::new(RequestProtocol::Rest, ErrorOutput::Generic, None);
        let body = json!({"error": false, "errorText": "", "additionalErrors": [], "data": {"id": 1}});
        assert_eq!(
            f.format(Payload::Json(body)),
            ApiResponse::success(Payload::Json(json!({"id": 1})))
        );
    }

    #[test]
    fn test_rest_error_output_modes() {
        let t = shouting();
        let body = json!({
            "error": true,
            "errorText": "errors.invalid_name",
            "additionalErrors": [{"field": "name"}],
            "data": null
        });

        let generic = ResponseFormatter::new(RequestProtocol::Rest, ErrorOutput::Generic, Some(&t));
        let err = generic.format(Payload::Json(body.clone()));
        let err = err.error().unwrap();
        assert_eq!(err.error_text, "ERRORS.INVALID_NAME");
        assert_eq!(err.kind, FailureKind::ProtocolReportedError);
        assert_eq!(err.additional_errors, vec![json!({"field": "name"})]);

        let straight =
            ResponseFormatter::new(RequestProtocol::Rest, ErrorOutput::Straight, Some(&t));
        assert_eq!(
            straight.format(Payload::Json(body)).error().unwrap().error_text,
            "errors.invalid_name"
        );
    }

    #[test]
    fn test_json_rpc_result_and_error() {
        let t = shouting();
        let f = ResponseFormatter::new(RequestProtocol::JsonRpc, ErrorOutput::Generic, Some(&t));

        let ok = f.format(Payload::Json(json!({"jsonrpc": "2.0", "id": 1, "result": [1, 2]})));
        assert_eq!(ok, ApiResponse::success(Payload::Json(json!([1, 2]))));

        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": {"code": 403, "message": "Forbidden by policy", "data": {"trKey": "errors.forbidden"}}
        });
        let generic = f.format(Payload::Json(body.clone()));
        assert_eq!(generic.error().unwrap().error_text, "ERRORS.FORBIDDEN");

        let straight =
            ResponseFormatter::new(RequestProtocol::JsonRpc, ErrorOutput::Straight, Some(&t));
        assert_eq!(
            straight.format(Payload::Json(body)).error().unwrap().error_text,
            "Forbidden by policy"
        );
    }

    #[test]
    fn test_failure_uses_generic_keys() {
        let f = ResponseFormatter::new(RequestProtocol::Rest, ErrorOutput::Generic, None)
            .with_error_keys("net", "late");
        let err = Error::UnacceptableStatus {
            status: 404,
            status_text: "Not Found".into(),
        };
        let resp = f.failure(&err);
        let e = resp.error().unwrap();
        assert_eq!(e.error_text, "net");
        assert_eq!(e.kind, FailureKind::UnacceptableStatus);
        assert_eq!(e.status, Some(404));

        assert_eq!(f.timeout().error().unwrap().error_text, "late");
        assert_eq!(
            f.timeout().error().unwrap().kind,
            FailureKind::TimeoutExceeded
        );
    }

    #[test]
    fn test_failure_straight_uses_raw_text() {
        let f = ResponseFormatter::new(RequestProtocol::Rest, ErrorOutput::Straight, None);
        let err = Error::InvalidResponse {
            stage: ValidationStage::Schema,
            status: 200,
            status_text: "OK".into(),
        };
        let resp = f.failure(&err);
        assert_eq!(resp.error().unwrap().error_text, "OK");
        assert_eq!(resp.error().unwrap().kind, FailureKind::SchemaMismatch);
    }

    #[test]
    fn test_straight_timeout_keeps_key() {
        let t = shouting();
        let f = ResponseFormatter::new(RequestProtocol::Rest, ErrorOutput::Straight, Some(&t))
            .with_error_keys("net", "late");
        let resp = f.timeout();
        assert_eq!(resp.error().unwrap().error_text, "late");
        assert_eq!(resp.error().unwrap().kind, FailureKind::TimeoutExceeded);

        let generic = ResponseFormatter::new(RequestProtocol::Rest, ErrorOutput::Generic, Some(&t));
        assert_eq!(generic.timeout().error().unwrap().error_text, "ERRORS.TIMEOUT");
    }

    #[test]
    fn test_blob_passes_through() {
        let f = ResponseFormatter::new(RequestProtocol::Rest, ErrorOutput::Generic, None);
        let blob = Payload::Blob(bytes::Bytes::from_static(b"raw"));
        assert_eq!(f.format(blob.clone()), ApiResponse::success(blob));
    }
}
