// Application Layer - Use Cases

pub mod change_feed;
pub mod notification;
pub mod request;

// Re-exports
pub use change_feed::{change_feed, ChangeFeed, ChangeKind, RequestChange};
pub use request::{AttachmentLimits, DashboardStats, RequestDraft, RequestService};
