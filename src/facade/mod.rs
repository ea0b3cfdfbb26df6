//! Developer-friendly facade layer (optional).
//!
//! Per-protocol presets over [`FetchClient::execute`]: each preset fixes the
//! wire protocol and offers one method per HTTP verb. Nothing here adds
//! behavior; a preset call is exactly one descriptor and one execution.

pub mod prelude;

use crate::protocol::{HttpMethod, ParseKind, RequestDescriptor, RequestOptions, RequestProtocol};
use crate::response::ResponseFormatter;
use crate::{ApiResponse, FetchClient};

/// Verb methods bound to one protocol.
#[derive(Debug, Clone, Copy)]
pub struct Requests<'a> {
    client: &'a FetchClient,
    protocol: RequestProtocol,
}

impl<'a> Requests<'a> {
    pub fn new(client: &'a FetchClient, protocol: RequestProtocol) -> Self {
        Self { client, protocol }
    }

    pub fn protocol(&self) -> RequestProtocol {
        self.protocol
    }

    pub async fn get(&self, endpoint: &str, options: RequestOptions) -> ApiResponse {
        self.send(HttpMethod::Get, endpoint, options).await
    }

    pub async fn post(&self, endpoint: &str, options: RequestOptions) -> ApiResponse {
        self.send(HttpMethod::Post, endpoint, options).await
    }

    pub async fn put(&self, endpoint: &str, options: RequestOptions) -> ApiResponse {
        self.send(HttpMethod::Put, endpoint, options).await
    }

    pub async fn patch(&self, endpoint: &str, options: RequestOptions) -> ApiResponse {
        self.send(HttpMethod::Patch, endpoint, options).await
    }

    pub async fn delete(&self, endpoint: &str, options: RequestOptions) -> ApiResponse {
        self.send(HttpMethod::Delete, endpoint, options).await
    }

    /// Build the descriptor and execute it. Descriptor errors are answered
    /// with an `InvalidRequest` response and never reach the network.
    pub async fn send(
        &self,
        method: HttpMethod,
        endpoint: &str,
        mut options: RequestOptions,
    ) -> ApiResponse {
        if options.parse_kind.is_none() {
            options.parse_kind = Some(ParseKind::Json);
        }
        let error_output = options.error_output;
        let translator = options.translator.clone();

        match RequestDescriptor::new(method, self.protocol, endpoint, options) {
            Ok(descriptor) => self.client.execute(&descriptor).await,
            Err(e) => {
                tracing::error!(endpoint, method = method.as_str(), error = %e, "invalid request");
                let translator = translator.as_ref().or(self.client.translator.as_ref());
                let config = self.client.config();
                ResponseFormatter::new(self.protocol, error_output, translator)
                    .with_error_keys(&config.network_error_key, &config.timeout_error_key)
                    .failure(&e)
            }
        }
    }
}

impl FetchClient {
    /// Preset for `{error, errorText, additionalErrors, data}` envelopes.
    pub fn rest(&self) -> Requests<'_> {
        Requests::new(self, RequestProtocol::Rest)
    }

    /// Preset for JSON-RPC. Requests need a [`crate::JsonRpcEnvelope`].
    pub fn json_rpc(&self) -> Requests<'_> {
        Requests::new(self, RequestProtocol::JsonRpc)
    }

    pub fn pure_rest(&self) -> Requests<'_> {
        Requests::new(self, RequestProtocol::PureRest)
    }
}
