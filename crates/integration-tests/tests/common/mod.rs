//! Shared fixtures for the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use cctv_core::application::request::{AttachmentFile, AttachmentSlot, IncidentDraft};
use cctv_core::application::{RequestDraft, RequestService};
use cctv_core::domain::{Applicant, DeliveryMethod, TransitionPolicy};
use cctv_core::error::{AppError, Result};
use cctv_core::port::{
    Alert, AttachmentStore, AttachmentUpload, NoopNotifier, Notifier, RandomTrackingIdProvider,
    SystemTimeProvider, UuidProvider,
};
use cctv_infra_sqlite::{create_pool, run_migrations, SqlitePool, SqliteRequestRepository};
use chrono::{NaiveDate, NaiveTime};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

pub async fn memory_pool() -> SqlitePool {
    let pool = create_pool("sqlite::memory:").await.unwrap();
    run_migrations(&pool).await.unwrap();
    pool
}

/// Returns a drive-style link per file and counts uploads
#[derive(Default)]
pub struct LinkStore {
    pub uploads: AtomicUsize,
}

#[async_trait]
impl AttachmentStore for LinkStore {
    async fn upload(&self, upload: &AttachmentUpload) -> Result<String> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        Ok(format!(
            "https://drive.example/{}/{}",
            upload.folder_name, upload.filename
        ))
    }
}

/// Forwards every alert to a channel
pub struct ChannelNotifier(pub mpsc::UnboundedSender<Alert>);

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn notify(&self, alert: &Alert) -> Result<()> {
        let _ = self.0.send(alert.clone());
        Ok(())
    }
}

pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn notify(&self, _alert: &Alert) -> Result<()> {
        Err(AppError::Upstream("Push API returned HTTP 500".to_string()))
    }
}

pub fn service_with(
    pool: SqlitePool,
    store: Arc<dyn AttachmentStore>,
    notifier: Arc<dyn Notifier>,
    policy: TransitionPolicy,
) -> RequestService {
    RequestService::new(
        Arc::new(SqliteRequestRepository::new(pool)),
        store,
        notifier,
        Arc::new(UuidProvider),
        Arc::new(RandomTrackingIdProvider::from_offset_hours(7).unwrap()),
        Arc::new(SystemTimeProvider),
    )
    .with_policy(policy)
}

pub async fn service() -> RequestService {
    service_with(
        memory_pool().await,
        Arc::new(LinkStore::default()),
        Arc::new(NoopNotifier),
        TransitionPolicy::Permissive,
    )
}

/// The accident at Rawai Beach used throughout
pub fn rawai_draft() -> RequestDraft {
    RequestDraft {
        applicant: Applicant {
            name: "Somchai Jaidee".to_string(),
            national_id: "1100000000001".to_string(),
            phone: "0812345678".to_string(),
            email: Some("somchai@example.com".to_string()),
        },
        incident: IncidentDraft {
            event_type: "ACCIDENT".to_string(),
            event_subtype: Some("motorbike".to_string()),
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            time_start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            time_end: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            description: "Motorbike collision near the beach road".to_string(),
            location: "Rawai Beach".to_string(),
            lat: Some(7.78),
            lng: Some(98.31),
        },
        delivery_method: DeliveryMethod::ChatApp,
        files: vec![],
    }
}

pub fn file(slot: AttachmentSlot, filename: &str) -> AttachmentFile {
    AttachmentFile {
        slot,
        filename: filename.to_string(),
        mime_type: "image/jpeg".to_string(),
        base64: "aGVsbG8=".to_string(),
    }
}
