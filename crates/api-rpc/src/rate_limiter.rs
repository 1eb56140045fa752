//! Rate Limiter (Token Bucket)
//!
//! Shared by the public methods. The bucket starts full; tokens refill
//! continuously at `refill_per_sec` up to `burst`.

use std::sync::Mutex;
use std::time::Instant;

struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

pub struct RateLimiter {
    bucket: Mutex<Bucket>,
    burst: f64,
    refill_per_sec: f64,
}

impl RateLimiter {
    /// `RateLimiter::new(20, 5)`: bursts of 20, then 5 requests/sec
    pub fn new(burst: u32, refill_per_sec: u32) -> Self {
        Self {
            bucket: Mutex::new(Bucket {
                tokens: burst as f64,
                last_refill: Instant::now(),
            }),
            burst: burst as f64,
            refill_per_sec: refill_per_sec as f64,
        }
    }

    /// Take one token; false when the bucket is empty
    pub fn try_acquire(&self) -> bool {
        // A poisoned bucket still holds a usable count
        let mut bucket = self.bucket.lock().unwrap_or_else(|e| e.into_inner());

        let now = Instant::now();
        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.refill_per_sec).min(self.burst);
        bucket.last_refill = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Whole tokens left
    pub fn remaining(&self) -> u32 {
        let bucket = self.bucket.lock().unwrap_or_else(|e| e.into_inner());
        bucket.tokens.floor() as u32
    }
}
