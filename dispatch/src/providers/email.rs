//! Email collaborator.
//!
//! Template rendering is owned elsewhere; the dispatcher hands finished
//! subject and body strings to an [`EmailSender`].

use crate::error::{DispatchError, Result};
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::future::Future;
use tracing::info;

/// Email delivery service.
pub trait EmailSender: Send + Sync {
    /// Send one plain-text email.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Email`](crate::error::DispatchError::Email)
    /// if the provider rejects or cannot reach the relay.
    fn send(
        &self,
        to: &str,
        subject: &str,
        body: &str,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Console email sender for development.
///
/// Logs the message instead of sending it.
#[derive(Clone, Debug, Default)]
pub struct ConsoleEmail;

impl ConsoleEmail {
    /// Create a new console sender.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl EmailSender for ConsoleEmail {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        info!(
            to = %to,
            subject = %subject,
            body_len = body.len(),
            "email (development mode, not sent)"
        );
        Ok(())
    }
}

/// SMTP email sender using Lettre.
#[derive(Clone)]
pub struct SmtpEmail {
    relay: String,
    port: u16,
    credentials: Credentials,
    from: String,
}

impl SmtpEmail {
    /// Create a new SMTP sender.
    ///
    /// # Arguments
    ///
    /// - `relay`: SMTP server address (e.g. "smtp.postmarkapp.com")
    /// - `port`: SMTP server port (usually 587 for TLS)
    /// - `username` / `password`: SMTP authentication
    /// - `from`: sender address, e.g. `Trellis <notifications@example.com>`
    #[must_use]
    pub fn new(relay: String, port: u16, username: String, password: String, from: String) -> Self {
        Self {
            relay,
            port,
            credentials: Credentials::new(username, password),
            from,
        }
    }

    fn build_transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
        Ok(AsyncSmtpTransport::<Tokio1Executor>::relay(&self.relay)
            .map_err(|e| DispatchError::Email(format!("SMTP relay error: {e}")))?
            .port(self.port)
            .credentials(self.credentials.clone())
            .build())
    }
}

impl EmailSender for SmtpEmail {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        let message = Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|e| DispatchError::Email(format!("invalid from address: {e}")))?,
            )
            .to(to
                .parse()
                .map_err(|e| DispatchError::Email(format!("invalid to address: {e}")))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| DispatchError::Email(format!("message build error: {e}")))?;

        let transport = self.build_transport()?;
        transport
            .send(message)
            .await
            .map_err(|e| DispatchError::Email(format!("SMTP send error: {e}")))?;

        Ok(())
    }
}
