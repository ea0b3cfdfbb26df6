use crate::client::body::{build_body, parse_response, select_parse_kind};
use crate::client::builder::FetchClientBuilder;
use crate::client::endpoint::build_endpoint;
use crate::client::racer::RequestRacer;
use crate::client::status::StatusWhitelist;
use crate::config::ClientConfig;
use crate::protocol::{
    resolve_validator, RequestDescriptor, Translator, ValidationInput, ValidationOutcome,
};
use crate::response::{ApiResponse, Payload, ResponseFormatter};
use crate::transport::{FetchParams, Transport, TransportCall, TransportHandle};
use crate::{Error, Result};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};
use uuid::Uuid;

/// Executes request descriptors and always answers with an [`ApiResponse`].
///
/// All shared state is immutable; a client can be cloned and used from many
/// tasks at once.
#[derive(Clone)]
pub struct FetchClient {
    pub(crate) config: Arc<ClientConfig>,
    pub(crate) whitelist: Arc<StatusWhitelist>,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) translator: Option<Translator>,
}

impl FetchClient {
    /// Client with configuration read from the environment.
    pub fn new() -> Result<Self> {
        FetchClientBuilder::new().build()
    }

    pub fn builder() -> FetchClientBuilder {
        FetchClientBuilder::new()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Whether timed-out calls are aborted or merely abandoned.
    pub fn supports_abort(&self) -> bool {
        self.transport.supports_abort()
    }

    /// Run one request to completion.
    ///
    /// Never fails: transport errors, timeouts, rejected statuses, invalid
    /// payloads and protocol-reported errors all come back as
    /// [`ApiResponse::Error`].
    pub async fn execute(&self, request: &RequestDescriptor) -> ApiResponse {
        let request_id = Uuid::new_v4().to_string();
        let started = Instant::now();

        // Per-request translator wins over the client-wide one.
        let translator = request.translator().or(self.translator.as_ref());
        let formatter =
            ResponseFormatter::new(request.protocol(), request.error_output(), translator)
                .with_error_keys(&self.config.network_error_key, &self.config.timeout_error_key);

        let endpoint = build_endpoint(request.endpoint(), request.query());
        let body = match build_body(
            request.method(),
            request.protocol(),
            request.body(),
            request.json_rpc(),
        ) {
            Ok(body) => body,
            Err(e) => {
                error!(
                    request_id = request_id.as_str(),
                    endpoint = endpoint.as_str(),
                    error = %e,
                    "request rejected before dispatch"
                );
                return formatter.failure(&e);
            }
        };

        info!(
            request_id = request_id.as_str(),
            endpoint = endpoint.as_str(),
            method = request.method().as_str(),
            protocol = request.protocol().as_str(),
            "dispatching request"
        );

        let TransportHandle { call, cancel } = self.transport.prepare(
            &endpoint,
            FetchParams {
                method: request.method(),
                headers: request.headers().clone(),
                body,
            },
        );

        let pipeline = async {
            match self.run_pipeline(request, call).await {
                Ok(payload) => formatter.format(payload),
                Err(e) => {
                    let kind = e.failure_kind();
                    error!(
                        request_id = request_id.as_str(),
                        kind = kind.name(),
                        transport = kind.is_transport(),
                        validation = kind.is_validation(),
                        http_status = e.status(),
                        error = %e,
                        "request failed"
                    );
                    formatter.failure(&e)
                }
            }
        };

        let racer = RequestRacer::new(self.config.timeout());
        let (response, settlement) = racer
            .race(pipeline, || formatter.timeout(), cancel.as_ref())
            .await;

        info!(
            request_id = request_id.as_str(),
            settled_by = settlement.as_str(),
            success = response.is_success(),
            duration_ms = started.elapsed().as_millis() as u64,
            "request settled"
        );

        response
    }

    /// Await the call, classify, parse and validate. Formatting is left to the caller.
    async fn run_pipeline(
        &self,
        request: &RequestDescriptor,
        call: TransportCall,
    ) -> Result<Payload> {
        let response = call.await?;
        let status = response.status();
        let status_text = response.status_text().to_string();

        if !self.whitelist.is_acceptable(status) {
            return Err(Error::UnacceptableStatus {
                status,
                status_text,
            });
        }

        let kind = select_parse_kind(response.is_ok(), request.parse_kind());
        let payload = parse_response(response, kind).await?;

        let validator = resolve_validator(request.protocol(), request.extra_validation());
        let outcome = validator.validate(&ValidationInput {
            payload: &payload,
            schema: request.schema(),
            request_id: request.json_rpc().map(|envelope| &envelope.id),
        });

        match outcome {
            ValidationOutcome::Valid => Ok(payload),
            ValidationOutcome::Invalid(stage) => Err(Error::InvalidResponse {
                stage,
                status,
                status_text,
            }),
        }
    }
}

impl std::fmt::Debug for FetchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchClient")
            .field("config", &self.config)
            .field("supports_abort", &self.transport.supports_abort())
            .field("translator", &self.translator.is_some())
            .finish()
    }
}
