use crate::client::core::FetchClient;
use crate::client::status::StatusWhitelist;
use crate::config::ClientConfig;
use crate::protocol::Translator;
use crate::transport::{HttpTransport, Transport};
use crate::Result;
use std::sync::Arc;

/// Builder for [`FetchClient`].
///
/// Keep this surface area small and predictable.
pub struct FetchClientBuilder {
    config: Option<ClientConfig>,
    transport: Option<Arc<dyn Transport>>,
    translator: Option<Translator>,
}

impl FetchClientBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            transport: None,
            translator: None,
        }
    }

    /// Use an explicit configuration instead of [`ClientConfig::from_env`].
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Inject a transport. Default is an [`HttpTransport`] built from the config.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Client-wide translator, used by requests that carry none.
    pub fn translator<F>(mut self, translate: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.translator = Some(Arc::new(translate));
        self
    }

    pub fn build(self) -> Result<FetchClient> {
        let config = self.config.unwrap_or_else(ClientConfig::from_env);
        config.validate()?;

        let transport = match self.transport {
            Some(t) => t,
            None => Arc::new(HttpTransport::new(&config.transport)?),
        };

        Ok(FetchClient {
            whitelist: Arc::new(StatusWhitelist::new(config.acceptable_statuses.iter().copied())),
            config: Arc::new(config),
            transport,
            translator: self.translator,
        })
    }
}

impl Default for FetchClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
