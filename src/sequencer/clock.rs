//! Clock abstraction for the sequencer's simulated latency.
//!
//! Production runs pause on tokio timers. Tests and `--fast` runs use
//! [`InstantClock`], which resumes immediately and records every pause.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

/// Suspends the sequencer for a duration, then lets it continue
#[async_trait]
pub trait Clock: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real timers via `tokio::time::sleep`
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Virtual clock that never waits
#[derive(Debug, Default)]
pub struct InstantClock {
    pauses: Mutex<Vec<Duration>>,
}

impl InstantClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every pause requested so far, in order
    pub fn pauses(&self) -> Vec<Duration> {
        self.pauses
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }

    /// Sum of all requested pauses
    pub fn elapsed(&self) -> Duration {
        self.pauses().iter().sum()
    }
}

#[async_trait]
impl Clock for InstantClock {
    async fn sleep(&self, duration: Duration) {
        if let Ok(mut pauses) = self.pauses.lock() {
            pauses.push(duration);
        }
        tokio::task::yield_now().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_instant_clock_records_pauses() {
        let clock = InstantClock::new();
        clock.sleep(Duration::from_millis(2000)).await;
        clock.sleep(Duration::from_millis(1000)).await;

        assert_eq!(
            clock.pauses(),
            vec![Duration::from_millis(2000), Duration::from_millis(1000)]
        );
        assert_eq!(clock.elapsed(), Duration::from_millis(3000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_clock_advances_virtual_time() {
        let start = tokio::time::Instant::now();
        TokioClock.sleep(Duration::from_millis(500)).await;
        assert!(start.elapsed() >= Duration::from_millis(500));
    }
}
