//! # fetch-api
//!
//! 这是一个面向 REST / JSON-RPC 服务的请求执行层：超时竞速、可选取消、响应格式与 schema 校验，
//! 并将所有结果统一为规范化的成功/错误响应。
//!
//! Request execution layer for REST and JSON-RPC services.
//!
//! ## Overview
//!
//! Every call goes through the same pipeline: build the endpoint and body, hand
//! them to a [`transport::Transport`], race the call against a timer, classify the
//! status against a whitelist, parse the body, validate its shape and schema, and
//! format the result. Whatever happens, the caller gets exactly one
//! [`ApiResponse`]; nothing in the request path returns `Err`.
//!
//! ## Core Philosophy
//!
//! - **Never reject**: failures are values ([`ApiResponse::Error`] with a [`FailureKind`])
//! - **Protocol-aware**: REST envelopes and JSON-RPC envelopes have their own validators
//! - **Abort when possible**: timed-out calls are cancelled if the transport allows it
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fetch_api::prelude::*;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> fetch_api::Result<()> {
//!     let client = FetchClient::builder().config(ClientConfig::default()).build()?;
//!
//!     let response = client
//!         .json_rpc()
//!         .post(
//!             "https://api.example.com/rpc",
//!             RequestOptions::new()
//!                 .json(json!({"method": "user.get", "params": [7]}))
//!                 .json_rpc(JsonRpcEnvelope::generate()),
//!         )
//!         .await;
//!
//!     match response {
//!         ApiResponse::Success(ok) => println!("{:?}", ok.data),
//!         ApiResponse::Error(err) => eprintln!("{} ({})", err.error_text, err.kind),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | Executor, request racer, body/endpoint builders, builder |
//! | [`protocol`] | Request descriptor, protocol tags, validators, schemas |
//! | [`response`] | Canonical responses and the response formatter |
//! | [`transport`] | reqwest transport and cancellation handles |
//! | [`config`] | Client configuration (env / YAML) |
//! | [`facade`] | Per-protocol verb presets |

pub mod client;
pub mod config;
pub mod error_code;
pub mod facade;
pub mod protocol;
pub mod response;
pub mod transport;

// Re-export main types for convenience
pub use client::{FetchClient, FetchClientBuilder};
pub use config::ClientConfig;
pub use error_code::FailureKind;
pub use facade::{prelude, Requests};
pub use protocol::{
    ErrorOutput, HttpMethod, JsonRpcEnvelope, MultipartBody, ParseKind, RequestDescriptor,
    RequestOptions, RequestProtocol,
};
pub use response::{ApiResponse, ErrorResponse, Payload, SuccessResponse};
pub use transport::{CancelHandle, Transport};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
