//! Token bucket rate limiter shared by all requests of one client
//!
//! Tokens refill continuously at `rate` per second up to `capacity`.
//! Waiters are served one at a time: the lock is held across the sleep, so
//! concurrent callers queue up instead of bursting together.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Lowest accepted rate, in tokens per second
pub const MIN_RATE: f64 = 0.01;

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

#[derive(Debug)]
pub struct RateLimiter {
    rate: f64,
    capacity: f64,
    bucket: Mutex<Bucket>,
}

impl RateLimiter {
    /// Bucket starting full, with capacity `floor(rate) + 1`
    pub fn new(rate: f64) -> Self {
        let rate = if rate.is_finite() { rate.max(MIN_RATE) } else { MIN_RATE };
        let capacity = rate.floor() + 1.0;
        Self {
            rate,
            capacity,
            bucket: Mutex::new(Bucket {
                tokens: capacity,
                last_refill: Instant::now(),
            }),
        }
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Wait until a token is available and take it
    pub async fn acquire(&self) {
        let mut bucket = self.bucket.lock().await;
        self.refill(&mut bucket);

        while bucket.tokens < 1.0 {
            let wait = Duration::from_secs_f64((1.0 - bucket.tokens) / self.rate);
            tokio::time::sleep(wait).await;
            self.refill(&mut bucket);
        }

        bucket.tokens -= 1.0;
    }

    /// Tokens currently available (after refill)
    pub async fn available(&self) -> f64 {
        let mut bucket = self.bucket.lock().await;
        self.refill(&mut bucket);
        bucket.tokens
    }

    fn refill(&self, bucket: &mut Bucket) {
        let now = Instant::now();
        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.rate).min(self.capacity);
        bucket.last_refill = now;
    }
}
