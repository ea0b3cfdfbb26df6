use crate::client::body::FetchBody;
use crate::config::TransportConfig;
use crate::error::ErrorContext;
use crate::transport::{
    CancelHandle, FetchParams, RawResponse, Transport, TransportError, TransportHandle,
};
use crate::{Error, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::Proxy;
use tracing::debug;

/// reqwest-backed transport.
///
/// Whether calls can be aborted from the client side is decided once, when the
/// transport is built. Abortable calls race the request against a
/// cancellation token; non-abortable calls run on a detached task, so a caller
/// that gives up on them leaves the request to finish on its own.
pub struct HttpTransport {
    client: reqwest::Client,
    abortable: bool,
}

impl HttpTransport {
    pub fn new(config: &TransportConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();

        if let Some(proxy_url) = &config.proxy_url {
            let proxy = Proxy::all(proxy_url).map_err(|e| {
                Error::configuration_with_context(
                    format!("invalid proxy url: {}", e),
                    ErrorContext::new()
                        .with_field_path("transport.proxy_url")
                        .with_source("http_transport"),
                )
            })?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| Error::Transport(TransportError::Other(e.to_string())))?;

        Ok(Self {
            client,
            abortable: config.abortable,
        })
    }

    fn request(&self, endpoint: &str, params: FetchParams) -> reqwest::RequestBuilder {
        let has_content_type = params
            .headers
            .keys()
            .any(|k| k.eq_ignore_ascii_case(CONTENT_TYPE.as_str()));

        let mut request = self.client.request(params.method.as_reqwest(), endpoint);
        for (k, v) in &params.headers {
            request = request.header(k, v);
        }

        match params.body {
            Some(FetchBody::Text(text)) => {
                if !has_content_type {
                    request = request.header(CONTENT_TYPE, "application/json");
                }
                request = request.body(text);
            }
            // reqwest sets the multipart boundary header itself
            Some(FetchBody::Multipart(body)) => {
                request = request.multipart(body.into_form());
            }
            None => {}
        }

        request
    }
}

impl RawResponse {
    pub(crate) fn from_reqwest(response: reqwest::Response) -> Self {
        let status = response.status();
        let status_text = super::reason_phrase(status);
        RawResponse::new(
            status.as_u16(),
            status_text,
            Box::pin(async move { response.bytes().await.map_err(TransportError::from) }),
        )
    }
}

impl Transport for HttpTransport {
    fn prepare(&self, endpoint: &str, params: FetchParams) -> TransportHandle {
        debug!(
            endpoint,
            method = params.method.as_str(),
            abortable = self.abortable,
            "preparing http call"
        );

        let send = self.request(endpoint, params).send();
        let send = async move {
            let response = send.await?;
            Ok(RawResponse::from_reqwest(response))
        };

        if self.abortable {
            let cancel = CancelHandle::new();
            let token = cancel.token();
            let call = async move {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => Err(TransportError::Aborted),
                    res = send => res,
                }
            };
            TransportHandle {
                call: Box::pin(call),
                cancel: Some(cancel),
            }
        } else {
            let call = async move {
                match tokio::spawn(send).await {
                    Ok(res) => res,
                    Err(e) => Err(TransportError::Other(e.to_string())),
                }
            };
            TransportHandle {
                call: Box::pin(call),
                cancel: None,
            }
        }
    }

    fn supports_abort(&self) -> bool {
        self.abortable
    }
}
