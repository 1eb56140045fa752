// Request Repository Port (Interface)

use crate::domain::{Request, RequestId, RequestStatus, StatusHistoryEntry};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Dashboard listing filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestFilter {
    #[serde(default)]
    pub status: Option<RequestStatus>,
    #[serde(default)]
    pub limit: Option<u32>,
}

/// Number of requests currently in a status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: RequestStatus,
    pub count: i64,
}

/// Repository interface for Request persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RequestRepository: Send + Sync {
    /// Insert a new request together with its seed history
    async fn insert(&self, request: &Request) -> Result<()>;

    /// Find request by store ID
    async fn find_by_id(&self, id: &RequestId) -> Result<Option<Request>>;

    /// Find requests whose tracking ID equals `tracking_id`, newest first
    async fn find_by_tracking_id(&self, tracking_id: &str) -> Result<Vec<Request>>;

    /// Overwrite status and append one history entry
    ///
    /// No version check: concurrent callers both succeed and the later
    /// status write wins. Returns `NotFound` if the request does not exist.
    async fn append_status(&self, id: &RequestId, entry: &StatusHistoryEntry) -> Result<()>;

    /// List requests, newest first
    async fn list(&self, filter: &RequestFilter) -> Result<Vec<Request>>;

    /// Count requests grouped by status (statuses with no rows are omitted)
    async fn count_by_status(&self) -> Result<Vec<StatusCount>>;
}
