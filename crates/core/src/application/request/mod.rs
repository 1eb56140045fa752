// Request Service - lifecycle use cases for footage requests

pub mod lookup;
pub mod submit;
pub mod update_status;


pub use submit::{AttachmentFile, AttachmentLimits, AttachmentSlot, IncidentDraft, RequestDraft};
pub use update_status::UpdateStatusRequest;

use crate::application::change_feed::{ChangeFeed, ChangeKind, RequestChange};
use crate::application::notification;
use crate::domain::{
    Request, RequestId, RequestStatus, StatusHistoryEntry, TrackingId, TransitionPolicy,
};
use crate::error::{AppError, Result};
use crate::port::{
    AttachmentStore, IdProvider, Notifier, RequestFilter, RequestRepository, StatusCount,
    TimeProvider, TrackingIdProvider,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::warn;

/// Dashboard counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total: i64,
    /// One row per status, in lifecycle order, zero counts included
    pub by_status: Vec<StatusCount>,
}

impl DashboardStats {
    pub fn count(&self, status: RequestStatus) -> i64 {
        self.by_status
            .iter()
            .find(|c| c.status == status)
            .map_or(0, |c| c.count)
    }
}

/// Request Service
pub struct RequestService {
    repo: Arc<dyn RequestRepository>,
    attachment_store: Arc<dyn AttachmentStore>,
    notifier: Arc<dyn Notifier>,
    id_provider: Arc<dyn IdProvider>,
    tracking_ids: Arc<dyn TrackingIdProvider>,
    time_provider: Arc<dyn TimeProvider>,
    policy: TransitionPolicy,
    limits: AttachmentLimits,
    feed: ChangeFeed,
}

impl RequestService {
    pub fn new(
        repo: Arc<dyn RequestRepository>,
        attachment_store: Arc<dyn AttachmentStore>,
        notifier: Arc<dyn Notifier>,
        id_provider: Arc<dyn IdProvider>,
        tracking_ids: Arc<dyn TrackingIdProvider>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            repo,
            attachment_store,
            notifier,
            id_provider,
            tracking_ids,
            time_provider,
            policy: TransitionPolicy::default(),
            limits: AttachmentLimits::default(),
            feed: crate::application::change_feed(),
        }
    }

    pub fn with_policy(mut self, policy: TransitionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_attachment_limits(mut self, limits: AttachmentLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn policy(&self) -> TransitionPolicy {
        self.policy
    }

    /// Submit a public request and return its tracking ID
    ///
    /// The staff alert is sent in the background after the record is written;
    /// its failure is logged and never reaches the caller.
    pub async fn submit(&self, draft: RequestDraft) -> Result<TrackingId> {
        let request = submit::execute(
            self.repo.as_ref(),
            self.attachment_store.as_ref(),
            self.id_provider.as_ref(),
            self.tracking_ids.as_ref(),
            self.time_provider.as_ref(),
            &self.limits,
            draft,
        )
        .await?;

        self.feed.publish(RequestChange {
            kind: ChangeKind::Created,
            request_id: request.id.clone(),
            status: request.status,
        });

        let alert = notification::submission_alert(&request);
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            if let Err(e) = notifier.notify(&alert).await {
                warn!(
                    tracking_id = %alert.tracking_id,
                    error = %e,
                    "Submission alert failed (ignored)"
                );
            }
        });

        Ok(request.tracking_id)
    }

    /// Staff status change; appends exactly one history entry
    pub async fn update_status(
        &self,
        id: impl Into<RequestId>,
        status: RequestStatus,
        note: Option<String>,
    ) -> Result<StatusHistoryEntry> {
        let req = UpdateStatusRequest {
            id: id.into(),
            status,
            note,
        };
        let request_id = req.id.clone();

        let entry = update_status::execute(
            self.repo.as_ref(),
            self.time_provider.as_ref(),
            self.policy,
            req,
        )
        .await?;

        self.feed.publish(RequestChange {
            kind: ChangeKind::StatusChanged,
            request_id,
            status: entry.status,
        });

        Ok(entry)
    }

    /// Public lookup by tracking ID
    pub async fn lookup(&self, tracking_id: &str) -> Result<Request> {
        lookup::execute(self.repo.as_ref(), tracking_id).await
    }

    /// Staff fetch by store ID
    pub async fn get(&self, id: &RequestId) -> Result<Request> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Request {} not found", id)))
    }

    /// Dashboard listing, newest first
    pub async fn list(&self, filter: &RequestFilter) -> Result<Vec<Request>> {
        self.repo.list(filter).await
    }

    pub async fn stats(&self) -> Result<DashboardStats> {
        let counts = self.repo.count_by_status().await?;

        let by_status: Vec<StatusCount> = RequestStatus::ALL
            .into_iter()
            .map(|status| StatusCount {
                status,
                count: counts
                    .iter()
                    .filter(|c| c.status == status)
                    .map(|c| c.count)
                    .sum(),
            })
            .collect();

        Ok(DashboardStats {
            total: by_status.iter().map(|c| c.count).sum(),
            by_status,
        })
    }

    /// Subscribe to write events for the live dashboard
    pub fn subscribe(&self) -> broadcast::Receiver<RequestChange> {
        self.feed.subscribe()
    }
}
