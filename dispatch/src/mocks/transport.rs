//! Scripted webhook transport for testing.

use crate::error::{DispatchError, Result};
use crate::providers::WebhookTransport;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// One recorded delivery attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedDelivery {
    /// Destination URL.
    pub url: String,
    /// `X-Webhook-Signature` value sent.
    pub signature: String,
    /// Raw body bytes sent.
    pub body: Vec<u8>,
}

/// Transport that records every POST and answers from a script.
///
/// Responses resolve per URL first (FIFO queue), then fall back to the
/// default response (HTTP 200).
#[derive(Clone, Debug, Default)]
pub struct MockTransport {
    deliveries: Arc<Mutex<Vec<RecordedDelivery>>>,
    scripted: Arc<Mutex<HashMap<String, VecDeque<Result<u16>>>>>,
    default_response: Arc<Mutex<Option<Result<u16>>>>,
}

impl MockTransport {
    /// Create a transport that answers HTTP 200 to everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for the next POST to `url`.
    pub fn enqueue(&self, url: &str, response: Result<u16>) {
        if let Ok(mut scripted) = self.scripted.lock() {
            scripted.entry(url.to_string()).or_default().push_back(response);
        }
    }

    /// Replace the fallback response used when no script matches.
    pub fn respond_with(&self, response: Result<u16>) {
        if let Ok(mut default) = self.default_response.lock() {
            *default = Some(response);
        }
    }

    /// Every delivery attempted so far, in completion order.
    #[must_use]
    pub fn deliveries(&self) -> Vec<RecordedDelivery> {
        self.deliveries
            .lock()
            .map(|deliveries| deliveries.clone())
            .unwrap_or_default()
    }

    /// Attempted deliveries to `url`.
    #[must_use]
    pub fn deliveries_to(&self, url: &str) -> Vec<RecordedDelivery> {
        self.deliveries()
            .into_iter()
            .filter(|delivery| delivery.url == url)
            .collect()
    }
}

impl WebhookTransport for MockTransport {
    async fn post(&self, url: &str, signature: &str, body: Vec<u8>) -> Result<u16> {
        {
            let mut deliveries = self
                .deliveries
                .lock()
                .map_err(|_| DispatchError::Transport("mutex poisoned".into()))?;
            deliveries.push(RecordedDelivery {
                url: url.to_string(),
                signature: signature.to_string(),
                body,
            });
        }

        if let Ok(mut scripted) = self.scripted.lock() {
            if let Some(queue) = scripted.get_mut(url) {
                if let Some(response) = queue.pop_front() {
                    return response;
                }
            }
        }

        self.default_response
            .lock()
            .map(|default| default.clone().unwrap_or(Ok(200)))
            .map_err(|_| DispatchError::Transport("mutex poisoned".into()))?
    }
}
