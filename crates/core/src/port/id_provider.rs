// ID Providers (for deterministic testing)

use crate::domain::tracking::{SUFFIX_MAX, SUFFIX_MIN};
use crate::domain::TrackingId;
use chrono::{DateTime, FixedOffset};
use rand::Rng;

/// Store ID provider interface (allows deterministic IDs in tests)
pub trait IdProvider: Send + Sync {
    /// Generate a new unique request ID
    fn generate_id(&self) -> String;
}

/// UUID v4 provider (production)
pub struct UuidProvider;

impl IdProvider for UuidProvider {
    fn generate_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Tracking ID provider interface
pub trait TrackingIdProvider: Send + Sync {
    /// Generate a tracking ID for a submission made at `now_millis`
    fn generate(&self, now_millis: i64) -> TrackingId;
}

/// Date in the service's local offset + random four-digit suffix
///
/// No collision check: the suffix space is 9000 per day.
pub struct RandomTrackingIdProvider {
    offset: FixedOffset,
}

impl RandomTrackingIdProvider {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Build from a whole-hour UTC offset (e.g. 7 for Asia/Bangkok)
    pub fn from_offset_hours(hours: i32) -> Option<Self> {
        FixedOffset::east_opt(hours.checked_mul(3600)?).map(Self::new)
    }
}

impl TrackingIdProvider for RandomTrackingIdProvider {
    fn generate(&self, now_millis: i64) -> TrackingId {
        let date = DateTime::from_timestamp_millis(now_millis)
            .unwrap_or_default()
            .with_timezone(&self.offset)
            .date_naive();
        let suffix = rand::thread_rng().gen_range(SUFFIX_MIN..=SUFFIX_MAX);
        TrackingId::new(date, suffix)
    }
}
