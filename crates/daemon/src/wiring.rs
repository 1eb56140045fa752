//! Dependency wiring (composition root)

use crate::settings::Settings;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use cctv_core::application::RequestService;
use cctv_core::error::{AppError, Result as AppResult};
use cctv_core::port::{
    AttachmentStore, AttachmentUpload, NoopNotifier, Notifier, RandomTrackingIdProvider,
    SystemTimeProvider, UuidProvider,
};
use cctv_infra_http::{build_client, HttpAttachmentStore, PushNotifier};
use cctv_infra_sqlite::SqliteRequestRepository;
use cctv_infra_sqlite::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Stand-in when no upload endpoint is configured
struct DisabledAttachmentStore;

#[async_trait]
impl AttachmentStore for DisabledAttachmentStore {
    async fn upload(&self, upload: &AttachmentUpload) -> AppResult<String> {
        Err(AppError::Upstream(format!(
            "Attachment upload is not configured (file {})",
            upload.filename
        )))
    }
}

pub fn build_service(settings: &Settings, pool: SqlitePool) -> Result<RequestService> {
    let attachment_store: Arc<dyn AttachmentStore> = match &settings.upload.endpoint {
        Some(endpoint) if !endpoint.is_empty() => {
            let client = build_client(Duration::from_secs(settings.upload.timeout_secs))?;
            Arc::new(HttpAttachmentStore::new(client, endpoint.clone()))
        }
        _ => {
            warn!("Upload endpoint not configured; submissions with attachments will fail");
            Arc::new(DisabledAttachmentStore)
        }
    };

    let notifier: Arc<dyn Notifier> = match settings.notify.credentials() {
        Some((access_token, recipient)) => {
            let client = build_client(Duration::from_secs(settings.notify.timeout_secs))?;
            info!(endpoint = %settings.notify.endpoint, "Staff notifications enabled");
            Arc::new(PushNotifier::new(
                client,
                settings.notify.endpoint.clone(),
                access_token,
                recipient,
            ))
        }
        None => {
            warn!("Notification secrets missing; staff alerts disabled");
            Arc::new(NoopNotifier)
        }
    };

    let offset = settings.lifecycle.utc_offset_hours;
    let tracking_ids = RandomTrackingIdProvider::from_offset_hours(offset)
        .ok_or_else(|| anyhow!("Invalid UTC offset: {} hours", offset))?;

    let service = RequestService::new(
        Arc::new(SqliteRequestRepository::new(pool)),
        attachment_store,
        notifier,
        Arc::new(UuidProvider),
        Arc::new(tracking_ids),
        Arc::new(SystemTimeProvider),
    )
    .with_policy(settings.lifecycle.transition_policy)
    .with_attachment_limits(settings.upload.limits());

    Ok(service)
}

/// Make sure the directory holding a file database exists
pub fn ensure_database_dir(settings: &Settings) -> Result<()> {
    if let Some(parent) = settings
        .database_path()
        .and_then(|p| std::path::Path::new(p).parent())
        .filter(|p| !p.as_os_str().is_empty())
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    Ok(())
}
