//! Event fan-out.
//!
//! One accepted mutation becomes one [`dispatch`](EventDispatcher::dispatch)
//! call, and the dispatcher takes it from there: signed webhook POSTs to
//! every interested subscription, in-app notifications, and email, all off
//! the caller's request path. Delivery failure is the dispatcher's own
//! concern; nothing here ever propagates back to the operation that
//! triggered the event.

use crate::config::DispatcherConfig;
use crate::error::DispatchError;
use crate::notification::Notification;
use crate::providers::{
    EmailSender, NotificationStore, RecipientDirectory, SubscriptionStore, WebhookTransport,
};
use crate::signature::sign;
use crate::subscription::WebhookSubscription;
use chrono::Utc;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};
use trellis_core::event::{EventKind, WebhookEnvelope};
use uuid::Uuid;

/// Fans one domain event out to webhooks, notifications, and email.
///
/// Cloning is cheap (providers are handles); every spawned task owns its
/// own clone.
#[derive(Clone, Debug)]
pub struct EventDispatcher<S, N, R, E, T> {
    config: DispatcherConfig,
    subscriptions: S,
    notifications: N,
    recipients: R,
    email: E,
    transport: T,
}

impl<S, N, R, E, T> EventDispatcher<S, N, R, E, T>
where
    S: SubscriptionStore + Clone + Send + Sync + 'static,
    N: NotificationStore + Clone + Send + Sync + 'static,
    R: RecipientDirectory + Clone + Send + Sync + 'static,
    E: EmailSender + Clone + Send + Sync + 'static,
    T: WebhookTransport + Clone + Send + Sync + 'static,
{
    /// Create a dispatcher over the given providers.
    pub const fn new(
        config: DispatcherConfig,
        subscriptions: S,
        notifications: N,
        recipients: R,
        email: E,
        transport: T,
    ) -> Self {
        Self {
            config,
            subscriptions,
            notifications,
            recipients,
            email,
            transport,
        }
    }

    /// Fan `payload` out to every interested consumer. Fire-and-forget.
    ///
    /// Returns immediately; the fan-out runs on a supervisor task that logs
    /// leg outcomes. Callers get no success/failure indicator; delivery failure is the dispatcher's concern.
    pub fn dispatch(&self, organization_id: Uuid, kind: EventKind, payload: serde_json::Value) {
        let dispatcher = self.clone();
        tokio::spawn(async move {
            dispatcher.run(organization_id, kind, payload).await;
        });
    }

    /// Run the same fan-out inline and wait for every leg to settle.
    ///
    /// This is what [`dispatch`](Self::dispatch) spawns; tests call it
    /// directly to await completion deterministically.
    pub async fn dispatch_and_wait(
        &self,
        organization_id: Uuid,
        kind: EventKind,
        payload: serde_json::Value,
    ) {
        self.run(organization_id, kind, payload).await;
    }

    async fn run(&self, organization_id: Uuid, kind: EventKind, payload: serde_json::Value) {
        let envelope = WebhookEnvelope::new(kind, payload);
        debug!(
            organization_id = %organization_id,
            event = %kind,
            delivery_id = %envelope.id,
            "dispatching event"
        );

        // The three legs proceed independently; none can affect another's
        // outcome, and each swallows its own failures.
        tokio::join!(
            self.webhook_leg(organization_id, &envelope),
            self.notification_leg(organization_id, &envelope),
            self.email_leg(organization_id, &envelope),
        );
    }

    /// Deliver the envelope to every active subscription that wants it.
    async fn webhook_leg(&self, organization_id: Uuid, envelope: &WebhookEnvelope) {
        let subscriptions = match self
            .subscriptions
            .active_subscribed(organization_id, envelope.event)
            .await
        {
            Ok(subscriptions) => subscriptions,
            Err(err) => {
                warn!(
                    organization_id = %organization_id,
                    error = %err,
                    "could not load webhook subscriptions"
                );
                return;
            }
        };
        if subscriptions.is_empty() {
            return;
        }

        let body = match envelope.to_bytes() {
            Ok(body) => body,
            Err(err) => {
                error!(
                    delivery_id = %envelope.id,
                    error = %err,
                    "webhook envelope failed to serialize"
                );
                return;
            }
        };

        // Settle all, fail none of the others: each delivery runs on its
        // own task and the supervisor only logs outcomes.
        let mut deliveries = JoinSet::new();
        for subscription in subscriptions {
            let dispatcher = self.clone();
            let body = body.clone();
            deliveries.spawn(async move {
                dispatcher.deliver(&subscription, body).await;
            });
        }
        while let Some(joined) = deliveries.join_next().await {
            if let Err(join_error) = joined {
                error!(error = %join_error, "webhook delivery task aborted");
            }
        }
    }

    /// One signed POST to one subscription, with failure accounting.
    async fn deliver(&self, subscription: &WebhookSubscription, body: Vec<u8>) {
        let signature = sign(subscription.secret.as_bytes(), &body);
        let outcome = self
            .transport
            .post(&subscription.url, &signature, body)
            .await;

        match outcome {
            Ok(status) if (200..300).contains(&status) => {
                debug!(
                    subscription_id = %subscription.id,
                    status = status,
                    "webhook delivered"
                );
                if let Err(err) = self
                    .subscriptions
                    .record_success(subscription.id, Utc::now())
                    .await
                {
                    warn!(
                        subscription_id = %subscription.id,
                        error = %err,
                        "could not record webhook success"
                    );
                }
            }
            Ok(status) => {
                self.account_failure(subscription, &DispatchError::Rejected { status })
                    .await;
            }
            Err(err) => {
                self.account_failure(subscription, &err).await;
            }
        }
    }

    /// Count one failed delivery; past the threshold the subscription is
    /// deactivated and skipped until someone explicitly reactivates it.
    async fn account_failure(&self, subscription: &WebhookSubscription, reason: &DispatchError) {
        warn!(
            subscription_id = %subscription.id,
            url = %subscription.url,
            error = %reason,
            "webhook delivery failed"
        );

        match self.subscriptions.record_failure(subscription.id).await {
            Ok(count) if count >= self.config.failure_threshold => {
                match self.subscriptions.deactivate(subscription.id).await {
                    Ok(()) => warn!(
                        subscription_id = %subscription.id,
                        failure_count = count,
                        "subscription deactivated after consecutive failures"
                    ),
                    Err(err) => warn!(
                        subscription_id = %subscription.id,
                        error = %err,
                        "could not deactivate failing subscription"
                    ),
                }
            }
            Ok(_) => {}
            Err(err) => {
                warn!(
                    subscription_id = %subscription.id,
                    error = %err,
                    "could not record webhook failure"
                );
            }
        }
    }

    /// Persist one in-app notification per recipient.
    async fn notification_leg(&self, organization_id: Uuid, envelope: &WebhookEnvelope) {
        let recipients = match self
            .recipients
            .recipients_for(organization_id, envelope.event)
            .await
        {
            Ok(recipients) => recipients,
            Err(err) => {
                warn!(
                    organization_id = %organization_id,
                    error = %err,
                    "could not resolve notification recipients"
                );
                return;
            }
        };

        for recipient in recipients {
            let notification = Notification::new(
                organization_id,
                recipient.user_id,
                envelope.event,
                envelope.payload.clone(),
            );
            if let Err(err) = self.notifications.append(notification).await {
                warn!(
                    organization_id = %organization_id,
                    recipient_id = %recipient.user_id,
                    error = %err,
                    "could not persist notification"
                );
            }
        }
    }

    /// Email every recipient with an address on file.
    async fn email_leg(&self, organization_id: Uuid, envelope: &WebhookEnvelope) {
        let recipients = match self
            .recipients
            .recipients_for(organization_id, envelope.event)
            .await
        {
            Ok(recipients) => recipients,
            Err(err) => {
                warn!(
                    organization_id = %organization_id,
                    error = %err,
                    "could not resolve email recipients"
                );
                return;
            }
        };

        let subject = email_subject(envelope.event);
        for recipient in recipients {
            let Some(address) = recipient.email else {
                continue;
            };
            let body = format!(
                "Hi {},\n\n{}\n\nEvent id: {}\n",
                recipient.display_name, subject, envelope.id
            );
            if let Err(err) = self.email.send(&address, subject, &body).await {
                warn!(
                    organization_id = %organization_id,
                    to = %address,
                    error = %err,
                    "could not send notification email"
                );
            }
        }
    }
}

/// Human-readable subject line per event kind.
const fn email_subject(kind: EventKind) -> &'static str {
    match kind {
        EventKind::RequestCreated => "A feature request was created",
        EventKind::StatusChanged => "A feature request changed status",
        EventKind::DecisionMade => "A decision was made on a feature request",
        EventKind::CommentAdded => "New comment on a feature request",
        EventKind::AssessmentCompleted => "A feature request assessment is complete",
        EventKind::VoteCast => "A vote was cast on a feature request",
    }
}
