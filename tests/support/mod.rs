//! Scripted in-process transport for executor tests.
#![allow(dead_code)]

use fetch_api::transport::{
    CancelHandle, FetchParams, RawResponse, Transport, TransportError, TransportHandle,
};
use fetch_api::{ClientConfig, FetchClient};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What the fake server does with every call.
#[derive(Debug, Clone)]
pub enum Reply {
    Respond {
        status: u16,
        body: String,
        delay: Option<Duration>,
    },
    Hang,
    Fail(String),
}

impl Reply {
    pub fn json(status: u16, body: serde_json::Value) -> Self {
        Reply::Respond {
            status,
            body: body.to_string(),
            delay: None,
        }
    }

    pub fn raw(status: u16, body: &str) -> Self {
        Reply::Respond {
            status,
            body: body.to_string(),
            delay: None,
        }
    }

    pub fn delayed(status: u16, body: serde_json::Value, delay: Duration) -> Self {
        Reply::Respond {
            status,
            body: body.to_string(),
            delay: Some(delay),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub endpoint: String,
    pub params: FetchParams,
}

struct SettleFlag(Arc<AtomicBool>);

impl Drop for SettleFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

pub struct ScriptedTransport {
    reply: Reply,
    abortable: bool,
    calls: Mutex<Vec<RecordedCall>>,
    handles: Mutex<Vec<CancelHandle>>,
    released: Arc<AtomicBool>,
}

impl ScriptedTransport {
    pub fn new(reply: Reply) -> Arc<Self> {
        Self::with_abort(reply, true)
    }

    pub fn with_abort(reply: Reply, abortable: bool) -> Arc<Self> {
        Arc::new(Self {
            reply,
            abortable,
            calls: Mutex::new(Vec::new()),
            handles: Mutex::new(Vec::new()),
            released: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Cancel handles handed out so far.
    pub fn cancel_handles(&self) -> Vec<CancelHandle> {
        self.handles.lock().unwrap().clone()
    }

    /// True once the call future has completed or been dropped.
    pub fn call_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}

impl Transport for ScriptedTransport {
    fn prepare(&self, endpoint: &str, params: FetchParams) -> TransportHandle {
        self.calls.lock().unwrap().push(RecordedCall {
            endpoint: endpoint.to_string(),
            params,
        });

        let reply = self.reply.clone();
        let flag = SettleFlag(self.released.clone());
        let call = async move {
            let _flag = flag;
            match reply {
                Reply::Respond {
                    status,
                    body,
                    delay,
                } => {
                    if let Some(delay) = delay {
                        tokio::time::sleep(delay).await;
                    }
                    Ok(RawResponse::from_bytes(status, body))
                }
                Reply::Hang => std::future::pending().await,
                Reply::Fail(message) => Err(TransportError::Other(message)),
            }
        };

        let cancel = if self.abortable {
            let handle = CancelHandle::new();
            self.handles.lock().unwrap().push(handle.clone());
            Some(handle)
        } else {
            None
        };

        TransportHandle {
            call: Box::pin(call),
            cancel,
        }
    }

    fn supports_abort(&self) -> bool {
        self.abortable
    }
}

pub fn client(transport: Arc<ScriptedTransport>) -> FetchClient {
    client_with(transport, ClientConfig::default())
}

pub fn client_with(transport: Arc<ScriptedTransport>, config: ClientConfig) -> FetchClient {
    FetchClient::builder()
        .config(config)
        .transport(transport)
        .build()
        .unwrap()
}

pub fn rest_envelope(data: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "error": false,
        "errorText": "",
        "additionalErrors": [],
        "data": data,
    })
}
