//! Token-bucket admission control shared across API requests.

use std::sync::Mutex as StdMutex;
use std::time::{Duration, Instant};

use tokio::sync::Mutex as AsyncMutex;

/// Default refill rate in tokens per second.
pub const DEFAULT_RATE: f64 = 50.0;
/// Default bucket capacity.
pub const DEFAULT_BURST: u32 = 10;

struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// Token-bucket rate limiter with blocking and async acquisition.
///
/// Tokens refill continuously at `rate` per second up to `burst`. Each
/// acquisition consumes exactly one token; callers that find the bucket
/// empty wait just long enough for one token to accrue, then re-check.
///
/// One limiter gates one logical request budget. Clients construct a
/// private limiter by default; share an `Arc<RateLimiter>` across clients
/// to pool their budget.
pub struct RateLimiter {
    rate: f64,
    burst: u32,
    bucket: StdMutex<Bucket>,
    // Serializes async waiters so refill bookkeeping is never interleaved
    // between two tasks parked on the same empty bucket.
    async_gate: AsyncMutex<()>,
}

impl RateLimiter {
    /// Creates a limiter refilling `rate` tokens/sec with capacity `burst`.
    pub fn new(rate: f64, burst: u32) -> Self {
        Self {
            rate: rate.max(f64::MIN_POSITIVE),
            burst,
            bucket: StdMutex::new(Bucket {
                tokens: f64::from(burst),
                last_refill: Instant::now(),
            }),
            async_gate: AsyncMutex::new(()),
        }
    }

    /// Tokens added per second.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Maximum tokens the bucket holds.
    pub fn burst(&self) -> u32 {
        self.burst
    }

    /// Refills the bucket from elapsed time, then tries to take one token.
    ///
    /// Returns `None` on success, or the number of seconds to wait before
    /// the next attempt.
    fn try_acquire(&self) -> Option<Duration> {
        let mut bucket = self.bucket.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();
        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.rate).min(f64::from(self.burst));
        bucket.last_refill = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            None
        } else {
            Some(Duration::from_secs_f64((1.0 - bucket.tokens) / self.rate))
        }
    }

    /// Blocks the current thread until a token is available, then consumes it.
    pub fn acquire(&self) {
        loop {
            match self.try_acquire() {
                None => return,
                // Sleeps are not exact; re-check and refill on every pass.
                Some(wait) => std::thread::sleep(wait),
            }
        }
    }

    /// Suspends the current task until a token is available, then consumes it.
    pub async fn acquire_async(&self) {
        let _gate = self.async_gate.lock().await;
        loop {
            match self.try_acquire() {
                None => return,
                Some(wait) => tokio::time::sleep(wait).await,
            }
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_RATE, DEFAULT_BURST)
    }
}
