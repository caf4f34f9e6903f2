// crates/orchestrator/src/orchestrator.rs
//! Orchestrator - probe scheduling and result aggregation

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, instrument, warn};

use subtake_common::{RateLimiter, ResultSink, ScanJob, ScanOptions, ScanResult, ScanStats, Scanner};

use crate::progress::ProgressTracker;
use crate::rate_limiter::Pacer;
use crate::slots::ResultSlots;

/// Runs one probe per subdomain, either paced one at a time (`rate > 0`)
/// or over a fixed pool of workers, and returns results in input order.
pub struct Orchestrator {
    scanner: Arc<dyn Scanner>,
    progress: Arc<ProgressTracker>,
    workers: usize,
    pacing: Option<Duration>,
}

impl Orchestrator {
    pub fn new(scanner: Arc<dyn Scanner>, options: &ScanOptions) -> Self {
        Self {
            scanner,
            progress: Arc::new(ProgressTracker::new()),
            workers: options.workers.max(1),
            pacing: options.pacing_interval(),
        }
    }

    /// Scan a plain list of subdomains.
    pub async fn scan(&self, subdomains: Vec<String>, sink: Option<&dyn ResultSink>) -> Vec<ScanResult> {
        self.run(ScanJob::new(subdomains), sink).await
    }

    /// Execute a job. `sink` sees each result as soon as its probe finishes;
    /// the returned vector has exactly one result per subdomain, in order.
    #[instrument(skip_all, fields(job = %job.id, targets = job.target_count()))]
    pub async fn run(&self, job: ScanJob, sink: Option<&dyn ResultSink>) -> Vec<ScanResult> {
        let subdomains: Arc<[String]> = job.subdomains.into();
        if subdomains.is_empty() {
            debug!("empty job, nothing to scan");
            return Vec::new();
        }

        self.progress.start(subdomains.len()).await;
        debug!("using scanner: {}", self.scanner.name());
        let mut slots = ResultSlots::new(subdomains.len());

        match self.pacing {
            Some(interval) => {
                info!(
                    "Starting job {}: {} subdomains, paced every {:?}",
                    job.id,
                    subdomains.len(),
                    interval
                );
                self.run_paced(&subdomains, interval, &mut slots, sink).await;
            }
            None => {
                info!(
                    "Starting job {}: {} subdomains, {} workers",
                    job.id,
                    subdomains.len(),
                    self.workers
                );
                self.run_pool(subdomains.clone(), &mut slots, sink).await;
            }
        }

        if slots.filled() < subdomains.len() {
            warn!(
                "{} probes produced no result",
                subdomains.len() - slots.filled()
            );
        }

        self.progress.print_summary().await;
        slots.into_results(&subdomains)
    }

    /// Counters of the most recent run.
    pub async fn stats(&self) -> ScanStats {
        self.progress.snapshot().await
    }

    async fn run_paced(
        &self,
        subdomains: &[String],
        interval: Duration,
        slots: &mut ResultSlots,
        sink: Option<&dyn ResultSink>,
    ) {
        let pacer = Pacer::new(interval);
        debug!("pacing at {:.1} probes/s", pacer.current_rate());

        for (index, subdomain) in subdomains.iter().enumerate() {
            pacer.acquire().await;
            let result = self.scanner.scan(subdomain).await;
            self.finish(index, result, slots, sink).await;
        }
    }

    async fn run_pool(
        &self,
        subdomains: Arc<[String]>,
        slots: &mut ResultSlots,
        sink: Option<&dyn ResultSink>,
    ) {
        let queue = Arc::new(Mutex::new((0..subdomains.len()).collect::<VecDeque<usize>>()));
        let (tx, mut rx) = mpsc::channel::<(usize, ScanResult)>(subdomains.len());

        let mut workers = Vec::with_capacity(self.workers);
        for worker_id in 0..self.workers {
            let queue = queue.clone();
            let subdomains = subdomains.clone();
            let scanner = self.scanner.clone();
            let tx = tx.clone();

            workers.push(tokio::spawn(async move {
                loop {
                    let next = queue.lock().await.pop_front();
                    let Some(index) = next else {
                        break;
                    };

                    let result = scanner.scan(&subdomains[index]).await;
                    if tx.send((index, result)).await.is_err() {
                        debug!("worker {}: aggregator gone", worker_id);
                        break;
                    }
                }
            }));
        }
        drop(tx);

        // channel closes once every worker has exited; the watcher only
        // reports workers that died instead of finishing
        let watcher = tokio::spawn(async move {
            for worker in workers {
                if let Err(e) = worker.await {
                    warn!("worker task failed: {}", e);
                }
            }
        });

        while let Some((index, result)) = rx.recv().await {
            self.finish(index, result, slots, sink).await;
        }

        if let Err(e) = watcher.await {
            warn!("completion watcher failed: {}", e);
        }
    }

    async fn finish(
        &self,
        index: usize,
        result: ScanResult,
        slots: &mut ResultSlots,
        sink: Option<&dyn ResultSink>,
    ) {
        debug!("{} -> {}", result.subdomain, result.status);
        self.progress.record(&result).await;
        if let Some(sink) = sink {
            sink.emit(&result);
        }
        slots.place(index, result);
    }
}
