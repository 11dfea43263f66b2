//! Request pacing for external lookups.

use tokio::sync::Mutex;
use tokio::time::{sleep_until, Duration, Instant};

/// Enforces a minimum interval between consecutive calls.
///
/// The first [`acquire`](Self::acquire) returns immediately; each later one
/// waits until `interval` has passed since the previous call was let
/// through. Callers are serialized.
#[derive(Debug)]
pub struct Pacer {
    interval: Duration,
    next: Mutex<Option<Instant>>,
}

impl Pacer {
    /// Creates a pacer with the given interval, clamped to at least 1 ms.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            next: Mutex::new(None),
        }
    }

    /// Creates a pacer allowing at most `requests_per_second` calls per
    /// second.
    #[must_use]
    pub fn per_second(requests_per_second: u32) -> Self {
        Self::new(Duration::from_millis(
            1000 / u64::from(requests_per_second.max(1)),
        ))
    }

    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Waits for the next slot.
    ///
    /// Cancel-safe: dropping the future before it completes leaves the
    /// schedule untouched.
    pub async fn acquire(&self) {
        let mut next = self.next.lock().await;
        if let Some(at) = *next {
            sleep_until(at).await;
        }
        *next = Some(Instant::now() + self.interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_is_clamped() {
        assert_eq!(Pacer::new(Duration::ZERO).interval(), Duration::from_millis(1));
        assert_eq!(Pacer::per_second(0).interval(), Duration::from_secs(1));
        assert_eq!(Pacer::per_second(5).interval(), Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_acquire_is_immediate() {
        let pacer = Pacer::new(Duration::from_secs(1));
        let start = Instant::now();
        pacer.acquire().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_consecutive_acquires_are_spaced() {
        let pacer = Pacer::new(Duration::from_secs(1));
        let start = Instant::now();
        for _ in 0..3 {
            pacer.acquire().await;
        }
        assert!(start.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_caller_is_not_delayed() {
        let pacer = Pacer::new(Duration::from_millis(100));
        pacer.acquire().await;
        tokio::time::sleep(Duration::from_millis(500)).await;

        let start = Instant::now();
        pacer.acquire().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
