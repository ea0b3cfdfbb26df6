//! 超时竞速：请求与计时器二者取先完成者。
//!
//! Request/timeout race.

use crate::transport::CancelHandle;
use futures::future::{select, Either};
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Which side of the race produced the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    Response,
    Timeout,
}

impl Settlement {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Response => "response",
            Self::Timeout => "timeout",
        }
    }
}

impl fmt::Display for Settlement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Races a request against a timer. The first to finish settles the call and
/// the loser is dropped unobserved.
#[derive(Debug, Clone, Copy)]
pub struct RequestRacer {
    timeout: Duration,
}

impl RequestRacer {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Run `request` until it finishes or the timer fires.
    ///
    /// The timer is polled first, so a tie settles as a timeout. On timeout the
    /// cancel handle, when present, is triggered exactly once and the request
    /// future is dropped before `on_timeout` builds the result.
    pub async fn race<F, T>(
        &self,
        request: F,
        on_timeout: impl FnOnce() -> T,
        cancel: Option<&CancelHandle>,
    ) -> (T, Settlement)
    where
        F: Future<Output = T>,
    {
        let timer = Box::pin(tokio::time::sleep(self.timeout));
        let request = Box::pin(request);

        match select(timer, request).await {
            Either::Left(((), pending)) => {
                warn!(
                    timeout_ms = self.timeout.as_millis() as u64,
                    aborted = cancel.is_some(),
                    "request timed out"
                );
                if let Some(cancel) = cancel {
                    cancel.cancel();
                }
                drop(pending);
                (on_timeout(), Settlement::Timeout)
            }
            Either::Right((value, _timer)) => (value, Settlement::Response),
        }
    }
}
