// CCTV Infrastructure - HTTP Adapters
// Implements: AttachmentStore (drive upload endpoint), Notifier (push messaging)

mod attachment_store;
mod client;
mod push_notifier;

pub use attachment_store::HttpAttachmentStore;
pub use client::build_client;
pub use push_notifier::{PushNotifier, DEFAULT_PUSH_ENDPOINT};
