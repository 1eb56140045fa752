// Attachment Store Port (drive upload endpoint)

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One file to upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachmentUpload {
    pub filename: String,
    pub mime_type: String,
    /// File content, base64 encoded
    pub base64: String,
    /// Drive folder (the request's tracking ID)
    pub folder_name: String,
}

/// Blob storage reachable over HTTP; returns a retrievable link
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AttachmentStore: Send + Sync {
    /// Upload one file and return its view link
    async fn upload(&self, upload: &AttachmentUpload) -> Result<String>;
}
