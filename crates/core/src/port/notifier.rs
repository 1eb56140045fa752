// Notifier Port (push-messaging webhook)

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Staff alert for a new submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub title: String,
    pub tracking_id: String,
    /// Label/value rows shown on the card
    pub fields: Vec<(String, String)>,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Push an alert to the configured recipient
    async fn notify(&self, alert: &Alert) -> Result<()>;
}

/// Notifier used when no messaging credentials are configured
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn notify(&self, alert: &Alert) -> Result<()> {
        tracing::debug!(tracking_id = %alert.tracking_id, "Notifier disabled, alert dropped");
        Ok(())
    }
}
