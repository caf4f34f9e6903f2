//! Fixed-interval pacing for rate-limited scans

use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::trace;

use subtake_common::RateLimiter;

/// Ticker owned by a single scan run. The first signal arrives one interval
/// after creation; the timer is released when the pacer is dropped.
pub struct Pacer {
    ticker: Mutex<Interval>,
    period: Duration,
}

impl Pacer {
    pub fn new(period: Duration) -> Self {
        // tokio rejects a zero period
        let period = period.max(Duration::from_nanos(1));
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self {
            ticker: Mutex::new(ticker),
            period,
        }
    }
}

#[async_trait]
impl RateLimiter for Pacer {
    async fn acquire(&self) {
        self.ticker.lock().await.tick().await;
    }

    fn current_rate(&self) -> f64 {
        1.0 / self.period.as_secs_f64()
    }
}

impl Drop for Pacer {
    fn drop(&mut self) {
        trace!("pacer stopped (period {:?})", self.period);
    }
}
