// Port Layer - Interfaces for external dependencies

pub mod attachment_store;
pub mod id_provider; // For deterministic testing
pub mod notifier;
pub mod request_repository;
pub mod time_provider;

// Re-exports
pub use attachment_store::{AttachmentStore, AttachmentUpload};
pub use id_provider::{IdProvider, RandomTrackingIdProvider, TrackingIdProvider, UuidProvider};
pub use notifier::{Alert, NoopNotifier, Notifier};
pub use request_repository::{RequestFilter, RequestRepository, StatusCount};
pub use time_provider::{FixedTimeProvider, SystemTimeProvider, TimeProvider};
