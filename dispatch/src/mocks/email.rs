//! Capturing email sender for testing.

use crate::error::{DispatchError, Result};
use crate::providers::EmailSender;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// One captured email.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SentEmail {
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
}

/// Email sender that records instead of sending.
#[derive(Clone, Debug, Default)]
pub struct CaptureEmail {
    sent: Arc<Mutex<Vec<SentEmail>>>,
    fail: Arc<AtomicBool>,
}

impl CaptureEmail {
    /// Create a capturing sender that succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent send fail.
    pub fn fail_sends(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    /// Every email captured so far.
    #[must_use]
    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }
}

impl EmailSender for CaptureEmail {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DispatchError::Email("provider unavailable".into()));
        }
        let mut sent = self
            .sent
            .lock()
            .map_err(|_| DispatchError::Email("mutex poisoned".into()))?;
        sent.push(SentEmail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}
