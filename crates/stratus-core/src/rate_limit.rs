//! Pacing for repeated remote calls.

use std::time::Duration;
use tokio::time::Instant;

/// Permits one `tick` per fixed interval.
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    last: Option<Instant>,
}

impl RateLimiter {
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self { interval, last: None }
    }

    /// Waits until at least `interval` has passed since the previous tick.
    pub async fn tick(&mut self) {
        if let Some(last) = self.last {
            tokio::time::sleep_until(last + self.interval).await;
        }
        self.last = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_is_immediate() {
        let mut limiter = RateLimiter::new(Duration::from_secs(10));
        let start = Instant::now();
        limiter.tick().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_are_spaced_by_interval() {
        let mut limiter = RateLimiter::new(Duration::from_secs(10));
        let start = Instant::now();
        limiter.tick().await;
        limiter.tick().await;
        limiter.tick().await;
        assert_eq!(start.elapsed(), Duration::from_secs(20));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_caller_is_not_delayed() {
        let mut limiter = RateLimiter::new(Duration::from_secs(10));
        limiter.tick().await;
        tokio::time::sleep(Duration::from_secs(15)).await;
        let before = Instant::now();
        limiter.tick().await;
        assert_eq!(before.elapsed(), Duration::ZERO);
    }
}
