//! Persistence contract for feature requests.
//!
//! The platform's SQL layer is an external collaborator; the workflow core
//! only needs "read the status stored immediately before the mutation" and
//! "persist a status value". [`InMemoryRequestStore`] is the reference
//! implementation used by tests and single-process deployments.

use crate::status::FeatureRequestStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use uuid::Uuid;

/// A feature request as the workflow core sees it.
///
/// Intake answers, scores, and attachments live elsewhere; the core only
/// tracks identity, ownership, and workflow status.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureRequest {
    /// Request identifier.
    pub id: Uuid,
    /// Organization owning the request.
    pub organization_id: Uuid,
    /// Short human-readable title.
    pub title: String,
    /// Current workflow status.
    pub status: FeatureRequestStatus,
    /// When the request was created.
    pub created_at: DateTime<Utc>,
    /// When the request was last mutated.
    pub updated_at: DateTime<Utc>,
}

impl FeatureRequest {
    /// Create a new request in `Draft`.
    #[must_use]
    pub fn new(organization_id: Uuid, title: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            organization_id,
            title,
            status: FeatureRequestStatus::Draft,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Errors from the request store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestStoreError {
    /// No request with the given id exists.
    #[error("feature request {0} not found")]
    NotFound(Uuid),

    /// The backing store failed.
    #[error("request store unavailable: {0}")]
    Backend(String),
}

/// Store for feature requests.
///
/// Implementations must return the currently stored status from [`get`],
/// never a cached value; transition legality is evaluated against it.
///
/// [`get`]: RequestStore::get
pub trait RequestStore: Send + Sync {
    /// Persist a new request.
    ///
    /// # Errors
    ///
    /// Returns [`RequestStoreError::Backend`] if the store is unavailable.
    fn create(
        &self,
        request: FeatureRequest,
    ) -> impl Future<Output = Result<(), RequestStoreError>> + Send;

    /// Fetch a request by id.
    ///
    /// # Errors
    ///
    /// Returns [`RequestStoreError::Backend`] if the store is unavailable.
    fn get(
        &self,
        id: Uuid,
    ) -> impl Future<Output = Result<Option<FeatureRequest>, RequestStoreError>> + Send;

    /// Persist a status value for an existing request.
    ///
    /// # Errors
    ///
    /// Returns [`RequestStoreError::NotFound`] if the request does not exist,
    /// or [`RequestStoreError::Backend`] if the store is unavailable.
    fn set_status(
        &self,
        id: Uuid,
        status: FeatureRequestStatus,
    ) -> impl Future<Output = Result<(), RequestStoreError>> + Send;
}

/// In-memory request store.
#[derive(Clone, Debug, Default)]
pub struct InMemoryRequestStore {
    requests: Arc<Mutex<HashMap<Uuid, FeatureRequest>>>,
}

impl InMemoryRequestStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RequestStore for InMemoryRequestStore {
    async fn create(&self, request: FeatureRequest) -> Result<(), RequestStoreError> {
        let mut requests = self
            .requests
            .lock()
            .map_err(|_| RequestStoreError::Backend("mutex poisoned".into()))?;
        requests.insert(request.id, request);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<FeatureRequest>, RequestStoreError> {
        let requests = self
            .requests
            .lock()
            .map_err(|_| RequestStoreError::Backend("mutex poisoned".into()))?;
        Ok(requests.get(&id).cloned())
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: FeatureRequestStatus,
    ) -> Result<(), RequestStoreError> {
        let mut requests = self
            .requests
            .lock()
            .map_err(|_| RequestStoreError::Backend("mutex poisoned".into()))?;
        let request = requests.get_mut(&id).ok_or(RequestStoreError::NotFound(id))?;
        request.status = status;
        request.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let store = InMemoryRequestStore::new();
        let request = FeatureRequest::new(Uuid::new_v4(), "Dark mode".to_string());
        let id = request.id;

        store.create(request.clone()).await.expect("create");
        let fetched = store.get(id).await.expect("get").expect("present");
        assert_eq!(fetched, request);
    }

    #[tokio::test]
    async fn set_status_updates_the_stored_value() {
        let store = InMemoryRequestStore::new();
        let request = FeatureRequest::new(Uuid::new_v4(), "Exports".to_string());
        let id = request.id;
        store.create(request).await.expect("create");

        store
            .set_status(id, FeatureRequestStatus::IntakeInProgress)
            .await
            .expect("set_status");

        let fetched = store.get(id).await.expect("get").expect("present");
        assert_eq!(fetched.status, FeatureRequestStatus::IntakeInProgress);
        assert!(fetched.updated_at >= fetched.created_at);
    }

    #[tokio::test]
    async fn set_status_on_missing_request_is_not_found() {
        let store = InMemoryRequestStore::new();
        let id = Uuid::new_v4();
        let err = store
            .set_status(id, FeatureRequestStatus::UnderReview)
            .await
            .expect_err("missing");
        assert_eq!(err, RequestStoreError::NotFound(id));
    }
}
