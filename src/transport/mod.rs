//! 传输层：发起单次 HTTP 调用，并在运行环境支持时提供取消句柄。
//!
//! Transport layer.
//!
//! A [`Transport`] turns an endpoint plus [`FetchParams`] into a
//! [`TransportHandle`]: a boxed future that performs exactly one network call,
//! and an optional [`CancelHandle`]. The handle is the only place where the
//! abort capability shows up; callers check `cancel.is_some()` instead of
//! probing the environment themselves.

pub mod http;

pub use http::HttpTransport;

use crate::client::body::FetchBody;
use crate::protocol::HttpMethod;
use bytes::Bytes;
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Future resolving to the raw response of one call.
pub type TransportCall = BoxFuture<'static, Result<RawResponse, TransportError>>;

/// Future resolving to the full response body.
pub type BodyFuture = BoxFuture<'static, Result<Bytes, TransportError>>;

/// Everything a transport needs besides the endpoint.
#[derive(Debug, Clone)]
pub struct FetchParams {
    pub method: HttpMethod,
    pub headers: HashMap<String, String>,
    pub body: Option<FetchBody>,
}

/// Client-side abort capability for one in-flight call.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    token: CancellationToken,
    requests: Arc<AtomicUsize>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
            requests: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn cancel(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.token.cancel();
    }

    /// Number of times [`CancelHandle::cancel`] was called on this handle or its clones.
    pub fn cancel_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Token to wire into the call that this handle aborts.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// A prepared call plus its optional abort capability.
pub struct TransportHandle {
    pub call: TransportCall,
    pub cancel: Option<CancelHandle>,
}

/// Produces transport handles. One handle per request, no retries.
pub trait Transport: Send + Sync {
    fn prepare(&self, endpoint: &str, params: FetchParams) -> TransportHandle;

    /// Whether handles returned by [`Transport::prepare`] carry a cancel handle.
    fn supports_abort(&self) -> bool;
}

/// Response as seen before any parsing.
pub struct RawResponse {
    status: u16,
    status_text: String,
    body: BodyFuture,
}

impl RawResponse {
    pub fn new(status: u16, status_text: impl Into<String>, body: BodyFuture) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            body,
        }
    }

    /// Response whose body is already in memory.
    pub fn from_bytes(status: u16, body: impl Into<Bytes>) -> Self {
        let body = body.into();
        let status_text = reqwest::StatusCode::from_u16(status)
            .map(reason_phrase)
            .unwrap_or_else(|_| status.to_string());
        Self::new(status, status_text, Box::pin(async move { Ok(body) }))
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    /// Conventional 2xx success range.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Read the whole body.
    pub async fn bytes(self) -> Result<Bytes, TransportError> {
        self.body.await
    }
}

/// Canonical reason phrase, or the numeric code when the status has none.
pub(crate) fn reason_phrase(status: reqwest::StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => reason.to_string(),
        None => status.as_str().to_string(),
    }
}

impl std::fmt::Debug for RawResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawResponse")
            .field("status", &self.status)
            .field("status_text", &self.status_text)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request aborted by client")]
    Aborted,

    #[error("request timed out")]
    Timeout,

    #[error("Transport error: {0}")]
    Other(String),
}
