// Change Feed - live dashboard updates
//
// Every successful write publishes one event. Subscribers re-query the full
// list on each event rather than applying diffs.

use crate::domain::{RequestId, RequestStatus};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Events kept for slow subscribers before they start lagging
const FEED_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Created,
    StatusChanged,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestChange {
    pub kind: ChangeKind,
    pub request_id: RequestId,
    pub status: RequestStatus,
}

/// Publishing side of the feed (cheap to clone)
#[derive(Clone)]
pub struct ChangeFeed {
    tx: broadcast::Sender<RequestChange>,
}

impl ChangeFeed {
    /// Publish a change; having no subscribers is not an error
    pub fn publish(&self, change: RequestChange) {
        let _ = self.tx.send(change);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RequestChange> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// Create an empty change feed
pub fn change_feed() -> ChangeFeed {
    let (tx, _) = broadcast::channel(FEED_CAPACITY);
    ChangeFeed { tx }
}
