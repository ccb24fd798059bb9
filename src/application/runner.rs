//! Fixed-interval poll loop with a per-poll deadline.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::broadcast;
use tokio::time::{interval, timeout, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use super::{CollectError, DiskCollector, PollReport, PollSummary, StatsCollector, StatusBoard};

/// Configuration for the poll loop
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub interval: Duration,
    /// Deadline for a single poll; an expired poll is cancelled
    pub timeout: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            timeout: Duration::from_secs(8),
        }
    }
}

/// Drives the collectors, one poll at a time
pub struct PollRunner {
    collector: StatsCollector,
    disk: Option<DiskCollector>,
    config: RunnerConfig,
    status: Arc<StatusBoard>,
}

impl PollRunner {
    pub fn new(collector: StatsCollector, config: RunnerConfig, status: Arc<StatusBoard>) -> Self {
        Self {
            collector,
            disk: None,
            config,
            status,
        }
    }

    pub fn with_disk(mut self, disk: DiskCollector) -> Self {
        self.disk = Some(disk);
        self
    }

    /// Poll every interval until shutdown is signalled
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        info!(
            interval_secs = self.config.interval.as_secs(),
            timeout_secs = self.config.timeout.as_secs(),
            "Starting poll loop"
        );

        let mut ticker = interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let summary = self.poll_once().await;
                    self.status.record(summary).await;
                }
                _ = shutdown.recv() => {
                    info!("Shutting down poll loop");
                    break;
                }
            }
        }
    }

    /// One poll under the deadline. Expiry drops the in-flight poll and is
    /// reported as a timeout, not as an ordinary failure.
    pub async fn poll_once(&mut self) -> PollSummary {
        let timestamp = Utc::now();
        let started = Instant::now();

        let poll = Self::poll_all(&mut self.collector, self.disk.as_ref());
        let result = timeout(self.config.timeout, poll).await;
        let duration_ms = started.elapsed().as_millis() as u64;

        match result {
            Err(_) => {
                warn!(
                    timeout_ms = self.config.timeout.as_millis() as u64,
                    "Poll exceeded its deadline and was cancelled"
                );
                PollSummary::timed_out(timestamp, duration_ms)
            }
            Ok((Ok(report), disk_points)) => {
                debug!(
                    containers = report.containers_collected,
                    points = report.points_published,
                    failures = report.failures.len(),
                    disk_points,
                    duration_ms,
                    "Poll complete"
                );
                PollSummary::completed(timestamp, duration_ms, report, disk_points)
            }
            Ok((Err(e), disk_points)) => {
                error!(error = %e, "Couldn't collect from docker");
                PollSummary::failed(timestamp, duration_ms, e.to_string(), disk_points)
            }
        }
    }

    async fn poll_all(
        collector: &mut StatsCollector,
        disk: Option<&DiskCollector>,
    ) -> (Result<PollReport, CollectError>, usize) {
        let result = collector.poll().await;
        let disk_points = match disk {
            Some(disk) => disk.collect().await,
            None => 0,
        };
        (result, disk_points)
    }
}
