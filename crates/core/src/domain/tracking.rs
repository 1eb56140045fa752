// Tracking ID - human-shareable request reference
//
// Format: REQ-<YYYYMMDD>-<NNNN>. Weakly unique: two submissions on the same
// day can draw the same suffix and nothing checks for it.

use super::error::{DomainError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const TRACKING_PREFIX: &str = "REQ";

/// Smallest and largest random suffix (always four digits)
pub const SUFFIX_MIN: u16 = 1000;
pub const SUFFIX_MAX: u16 = 9999;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackingId(String);

impl TrackingId {
    /// Build a tracking ID from the submission date and a four-digit suffix
    pub fn new(date: NaiveDate, suffix: u16) -> Self {
        debug_assert!((SUFFIX_MIN..=SUFFIX_MAX).contains(&suffix));
        Self(format!(
            "{}-{}-{:04}",
            TRACKING_PREFIX,
            date.format("%Y%m%d"),
            suffix
        ))
    }

    /// Parse a user-supplied tracking ID (surrounding whitespace ignored)
    pub fn parse(raw: &str) -> Result<Self> {
        let candidate = raw.trim();
        if Self::is_well_formed(candidate) {
            Ok(Self(candidate.to_string()))
        } else {
            Err(DomainError::MalformedTrackingId(raw.to_string()))
        }
    }

    /// Wrap a stored value without checking its shape
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// `REQ-` + 8 digits forming a real calendar date + `-` + 4 digits
    pub fn is_well_formed(value: &str) -> bool {
        let mut parts = value.split('-');
        let (Some(prefix), Some(date), Some(suffix), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return false;
        };

        prefix == TRACKING_PREFIX
            && date.len() == 8
            && date.bytes().all(|b| b.is_ascii_digit())
            && NaiveDate::parse_from_str(date, "%Y%m%d").is_ok()
            && suffix.len() == 4
            && suffix.bytes().all(|b| b.is_ascii_digit())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
