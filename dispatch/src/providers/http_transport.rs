//! HTTP webhook transport backed by `reqwest`.

use crate::config::DispatcherConfig;
use crate::error::{DispatchError, Result};
use crate::providers::WebhookTransport;
use crate::signature::SIGNATURE_HEADER;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};

/// Production webhook transport.
///
/// The per-attempt timeout is baked into the client, so a hung receiver
/// aborts that one delivery and nothing else.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    user_agent: String,
}

impl HttpTransport {
    /// Build a transport from the dispatcher config.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Transport`] if the underlying client cannot
    /// be constructed (TLS backend initialization).
    pub fn new(config: &DispatcherConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.delivery_timeout)
            .build()
            .map_err(|e| DispatchError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            user_agent: config.user_agent.clone(),
        })
    }
}

impl WebhookTransport for HttpTransport {
    async fn post(&self, url: &str, signature: &str, body: Vec<u8>) -> Result<u16> {
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .header(USER_AGENT, &self.user_agent)
            .header(SIGNATURE_HEADER, signature)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DispatchError::Timeout
                } else {
                    DispatchError::Transport(e.to_string())
                }
            })?;

        Ok(response.status().as_u16())
    }
}
