use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::{
    ContainerId, CpuUsage, InterfaceCounters, MemoryUsage, MetricGroup, MetricKey, MetricPoint,
    NameResolver, RateTracker, SnapshotParser, StatsSnapshot, CPU_NANOS_DIVISOR, MAX_COUNTER,
};
use crate::ports::{ContainerSource, MetricSink};

use super::SocketCounter;

/// Failures that abort a whole poll
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("container runtime unavailable: {0}")]
    TransportUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Step at which a single container could not be collected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureStage {
    Inspect,
    Stats,
}

/// A container skipped for this poll
#[derive(Debug, Clone, Serialize)]
pub struct ContainerFailure {
    pub container: ContainerId,
    pub stage: FailureStage,
    pub error: String,
}

impl ContainerFailure {
    fn new(container: &ContainerId, stage: FailureStage, error: impl ToString) -> Self {
        Self {
            container: container.clone(),
            stage,
            error: error.to_string(),
        }
    }
}

/// A metric group left out for one container
#[derive(Debug, Clone, Serialize)]
pub struct SkippedGroup {
    pub prefix: String,
    pub group: MetricGroup,
    pub reason: String,
}

/// Outcome of one poll: what was published and what was skipped
#[derive(Debug, Clone, Serialize)]
pub struct PollReport {
    pub started_at: DateTime<Utc>,
    pub containers_collected: usize,
    pub points_published: usize,
    pub failures: Vec<ContainerFailure>,
    pub skipped: Vec<SkippedGroup>,
    /// Prefixes resolved by more than one container in this poll
    pub duplicate_prefixes: Vec<String>,
    #[serde(skip)]
    seen_prefixes: HashSet<String>,
}

impl PollReport {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            containers_collected: 0,
            points_published: 0,
            failures: Vec::new(),
            skipped: Vec::new(),
            duplicate_prefixes: Vec::new(),
            seen_prefixes: HashSet::new(),
        }
    }

    /// Containers sharing a prefix overwrite each other's metrics and rate
    /// baselines
    fn claim_prefix(&mut self, prefix: &str, container: &ContainerId) {
        if self.seen_prefixes.insert(prefix.to_string()) {
            return;
        }
        warn!(prefix, container = %container.short(), "Metric prefix already used in this poll");
        if !self.duplicate_prefixes.iter().any(|p| p == prefix) {
            self.duplicate_prefixes.push(prefix.to_string());
        }
    }

    fn skip(&mut self, prefix: &str, group: MetricGroup, reason: impl ToString) {
        let reason = reason.to_string();
        warn!(prefix, group = group.as_str(), reason = %reason, "Skipping metric group");
        self.skipped.push(SkippedGroup {
            prefix: prefix.to_string(),
            group,
            reason,
        });
    }
}

/// Collects stats for every running container and publishes them.
///
/// Owns the rate state, so independent collectors never share baselines.
/// Polls take `&mut self`; at most one is in flight per collector.
pub struct StatsCollector {
    containers: Arc<dyn ContainerSource>,
    sockets: SocketCounter,
    sink: Arc<dyn MetricSink>,
    resolver: NameResolver,
    rates: RateTracker,
}

impl StatsCollector {
    pub fn new(
        containers: Arc<dyn ContainerSource>,
        sockets: SocketCounter,
        sink: Arc<dyn MetricSink>,
        resolver: NameResolver,
    ) -> Self {
        Self {
            containers,
            sockets,
            sink,
            resolver,
            rates: RateTracker::new(),
        }
    }

    /// Run one poll.
    ///
    /// Listing failures abort the poll. A container that cannot be inspected
    /// or read is recorded in the report and the rest are still published.
    pub async fn poll(&mut self) -> Result<PollReport, CollectError> {
        let ids = self
            .containers
            .list_containers()
            .await
            .map_err(CollectError::TransportUnavailable)?;

        let mut report = PollReport::new(Utc::now());

        for id in ids {
            match self.collect_container(&id, &mut report).await {
                Ok(()) => report.containers_collected += 1,
                Err(failure) => {
                    warn!(
                        container = %id.short(),
                        stage = ?failure.stage,
                        error = %failure.error,
                        "Skipping container"
                    );
                    report.failures.push(failure);
                }
            }
        }

        debug!(
            containers = report.containers_collected,
            points = report.points_published,
            failures = report.failures.len(),
            tracked_keys = self.rates.tracked_keys(),
            "Container poll complete"
        );

        Ok(report)
    }

    async fn collect_container(
        &mut self,
        id: &ContainerId,
        report: &mut PollReport,
    ) -> Result<(), ContainerFailure> {
        let inspected = self
            .containers
            .inspect_container(id)
            .await
            .map_err(|e| ContainerFailure::new(id, FailureStage::Inspect, e))?;

        let raw = self
            .containers
            .get_container_stats(id)
            .await
            .map_err(|e| ContainerFailure::new(id, FailureStage::Stats, e))?;

        let prefix = self.resolver.resolve(&inspected.identity).prefix();
        report.claim_prefix(&prefix, id);
        let mut snapshot = SnapshotParser::parse(&raw);

        if let Some(root_pid) = inspected.root_pid {
            match self.sockets.count_open_sockets(root_pid).await {
                Ok(count) => snapshot = snapshot.with_open_sockets(Some(count)),
                Err(e) => report.skip(&prefix, MetricGroup::OpenSockets, e),
            }
        }

        self.emit(&prefix, &snapshot, report);
        Ok(())
    }

    fn emit(&mut self, prefix: &str, snapshot: &StatsSnapshot, report: &mut PollReport) {
        for (group, error) in &snapshot.errors {
            report.skip(prefix, *group, error);
        }

        if let Some(cpu) = &snapshot.cpu {
            self.emit_cpu(prefix, cpu, report);
        }
        if let Some(memory) = &snapshot.memory {
            self.emit_memory(prefix, memory, report);
        }
        self.emit_network(prefix, &snapshot.network, report);
        if let Some(open_sockets) = snapshot.open_sockets {
            self.publish(MetricKey::new(prefix, "open_sockets"), open_sockets as f64, report);
        }
    }

    /// CPU counters are published as whole units per interval; the first
    /// sample of each key only establishes the baseline
    fn emit_cpu(&mut self, prefix: &str, cpu: &CpuUsage, report: &mut PollReport) {
        let max = MAX_COUNTER / CPU_NANOS_DIVISOR;

        for (ix, usage) in cpu.per_core.iter().enumerate() {
            let key = MetricKey::new(prefix, &format!("cpu{}.user", ix));
            self.publish_rate(key, *usage as f64 / CPU_NANOS_DIVISOR, max, report);
        }

        let key = MetricKey::new(prefix, "cpu_total.user");
        self.publish_rate(key, cpu.total as f64 / CPU_NANOS_DIVISOR, max, report);
    }

    fn emit_memory(&self, prefix: &str, memory: &MemoryUsage, report: &mut PollReport) {
        self.publish(MetricKey::new(prefix, "mem.rss"), memory.rss_bytes as f64, report);
        self.publish(MetricKey::new(prefix, "mem.limit"), memory.limit_bytes as f64, report);
    }

    fn emit_network(&self, prefix: &str, interfaces: &[InterfaceCounters], report: &mut PollReport) {
        for interface in interfaces {
            let group = format!("net.{}", interface.name);
            self.publish(
                MetricKey::new(prefix, &format!("{}.rx_bytes", group)),
                interface.rx_bytes as f64,
                report,
            );
            self.publish(
                MetricKey::new(prefix, &format!("{}.tx_bytes", group)),
                interface.tx_bytes as f64,
                report,
            );
        }
    }

    fn publish_rate(&mut self, key: MetricKey, scaled: f64, max: f64, report: &mut PollReport) {
        if let Some(rate) = self.rates.observe(&key, scaled, max) {
            self.publish(key, rate.trunc(), report);
        }
    }

    fn publish(&self, key: MetricKey, value: f64, report: &mut PollReport) {
        self.sink
            .publish(MetricPoint::from((key, value)).with_timestamp(report.started_at));
        report.points_published += 1;
    }
}
