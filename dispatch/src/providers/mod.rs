//! Fan-out providers.
//!
//! Providers are **interfaces**, not implementations. The dispatcher
//! depends on these traits; production wires them to the platform's SQL
//! layer, an HTTP client, and an SMTP relay, while tests wire them to the
//! doubles in [`crate::mocks`].

mod email;
mod http_transport;
mod memory;
mod stores;

pub use email::{ConsoleEmail, EmailSender, SmtpEmail};
pub use http_transport::HttpTransport;
pub use memory::{InMemoryNotificationStore, InMemoryRecipientDirectory, InMemorySubscriptionStore};
pub use stores::{NotificationStore, RecipientDirectory, SubscriptionStore, WebhookTransport};
