//! Progress tracking

use std::time::Instant;
use tokio::sync::Mutex;
use tracing::info;

use subtake_common::{ScanResult, ScanStats};

pub struct ProgressTracker {
    stats: Mutex<ScanStats>,
    started: Mutex<Instant>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            stats: Mutex::new(ScanStats::default()),
            started: Mutex::new(Instant::now()),
        }
    }

    /// Reset counters for a new run of `total` subdomains.
    pub async fn start(&self, total: usize) {
        *self.stats.lock().await = ScanStats::new(total);
        *self.started.lock().await = Instant::now();
    }

    pub async fn record(&self, result: &ScanResult) {
        let elapsed = self.started.lock().await.elapsed();
        let mut stats = self.stats.lock().await;
        stats.update(result);
        stats.elapsed = elapsed;
    }

    pub async fn snapshot(&self) -> ScanStats {
        self.stats.lock().await.clone()
    }

    pub async fn print_summary(&self) {
        let stats = self.snapshot().await;

        info!("Scan Summary:");
        info!("  Total subdomains: {}", stats.total_targets);
        info!("  Vulnerable: {}", stats.vulnerable);
        info!("  Not vulnerable: {}", stats.not_vulnerable);
        info!("  Errors: {}", stats.errors);
        if stats.total_targets > 0 {
            info!(
                "  Completed: {:.1}% at {:.1} subdomains/s",
                stats.progress(),
                stats.rate()
            );
        }
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}
