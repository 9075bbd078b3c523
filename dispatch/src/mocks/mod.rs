//! Mock provider implementations for testing.

mod email;
mod transport;

pub use email::{CaptureEmail, SentEmail};
pub use transport::{MockTransport, RecordedDelivery};

use crate::error::{DispatchError, Result};
use crate::notification::Notification;
use crate::providers::NotificationStore;
use uuid::Uuid;

/// A notification store whose every operation fails.
///
/// Used to prove that a failing notification leg cannot affect the email
/// or webhook legs.
#[derive(Clone, Debug, Default)]
pub struct FailingNotificationStore;

impl NotificationStore for FailingNotificationStore {
    async fn append(&self, _notification: Notification) -> Result<()> {
        Err(DispatchError::Store("notification store down".into()))
    }

    async fn list_for_recipient(
        &self,
        _organization_id: Uuid,
        _recipient_id: Uuid,
    ) -> Result<Vec<Notification>> {
        Err(DispatchError::Store("notification store down".into()))
    }
}
