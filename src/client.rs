//! Request execution client.
//!
//! Keep the public surface small and predictable: [`FetchClient::execute`]
//! takes a [`crate::RequestDescriptor`] and returns an [`crate::ApiResponse`].
//! The pipeline stages live in submodules under `src/client/`.

pub mod body;
pub mod builder;
pub mod core;
pub mod endpoint;
pub mod racer;
pub mod status;

pub use body::{build_body, parse_response, select_parse_kind, FetchBody};
pub use builder::FetchClientBuilder;
pub use core::FetchClient;
pub use endpoint::build_endpoint;
pub use racer::{RequestRacer, Settlement};
pub use status::StatusWhitelist;
