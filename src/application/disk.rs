use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, error};

use crate::domain::{round_to, DataSpace, MetricPoint};
use crate::ports::{ContainerSource, MetricSink, SystemSource};

/// Publishes root volume and storage driver usage as gauges
pub struct DiskCollector {
    system: Arc<dyn SystemSource>,
    containers: Arc<dyn ContainerSource>,
    sink: Arc<dyn MetricSink>,
    root_path: PathBuf,
    prefix: String,
}

impl DiskCollector {
    pub fn new(
        system: Arc<dyn SystemSource>,
        containers: Arc<dyn ContainerSource>,
        sink: Arc<dyn MetricSink>,
        root_path: impl Into<PathBuf>,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            system,
            containers,
            sink,
            root_path: root_path.into(),
            prefix: prefix.into(),
        }
    }

    /// Collect both volumes; returns the number of points published.
    /// Failures are logged and leave that volume out of this interval.
    pub async fn collect(&self) -> usize {
        self.collect_root_volume().await + self.collect_docker_volume().await
    }

    async fn collect_root_volume(&self) -> usize {
        let sample = match self.system.disk_usage(&self.root_path).await {
            Ok(sample) => sample,
            Err(e) => {
                error!(path = %self.root_path.display(), error = %e, "Couldn't read root volume");
                return 0;
            }
        };

        self.publish_gauges("root", &sample.gauges())
    }

    async fn collect_docker_volume(&self) -> usize {
        let status = match self.containers.driver_status().await {
            Ok(status) => status,
            Err(e) => {
                error!(error = %e, "Couldn't collect from docker");
                return 0;
            }
        };

        match DataSpace::from_driver_status(&status) {
            Ok(Some(space)) => self.publish_gauges("docker", &space.gauges()),
            Ok(None) => {
                debug!("Storage driver does not report data space");
                0
            }
            Err(e) => {
                error!(error = %e, "Couldn't parse storage driver data space");
                0
            }
        }
    }

    fn publish_gauges(&self, volume: &str, gauges: &[(&str, f64)]) -> usize {
        for (leaf, value) in gauges {
            let name = format!("{}.{}.{}", self.prefix, volume, leaf);
            self.sink.publish(MetricPoint::new(name, round_to(*value, 2)));
        }
        gauges.len()
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use async_trait::async_trait;

    use super::*;
    use crate::adapters::MemorySink;
    use crate::application::testing::FakeContainers;
    use crate::domain::{DiskError, DiskUsageSample};

    const GIB: u64 = 1024 * 1024 * 1024;

    struct FixedDisk(Option<DiskUsageSample>);

    #[async_trait]
    impl SystemSource for FixedDisk {
        async fn disk_usage(&self, path: &Path) -> Result<DiskUsageSample, DiskError> {
            self.0
                .clone()
                .ok_or_else(|| DiskError::MissingPath(path.display().to_string()))
        }
    }

    fn row(label: &str, value: &str) -> (String, String) {
        (label.to_string(), value.to_string())
    }

    fn disk_collector(disk: FixedDisk, containers: FakeContainers) -> (DiskCollector, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let collector = DiskCollector::new(
            Arc::new(disk),
            Arc::new(containers),
            sink.clone(),
            "/mnt/host_root",
            "ecsdisk",
        );
        (collector, sink)
    }

    #[tokio::test]
    async fn test_root_and_docker_volumes() {
        let disk = FixedDisk(Some(DiskUsageSample::new("/mnt/host_root".to_string(), 8 * GIB, 2 * GIB)));
        let containers = FakeContainers {
            driver_status: vec![
                row("Data Space Used", "3 GB"),
                row("Data Space Total", "10 GB"),
                row("Data Space Available", "7 GB"),
            ],
            ..Default::default()
        };
        let (collector, sink) = disk_collector(disk, containers);

        assert_eq!(collector.collect().await, 8);
        assert_eq!(sink.get("ecsdisk.root.total"), Some(8.0));
        assert_eq!(sink.get("ecsdisk.root.available"), Some(2.0));
        assert_eq!(sink.get("ecsdisk.root.used"), Some(6.0));
        assert_eq!(sink.get("ecsdisk.root.utilization"), Some(75.0));
        assert_eq!(sink.get("ecsdisk.docker.total"), Some(10.0));
        assert_eq!(sink.get("ecsdisk.docker.utilization"), Some(30.0));
    }

    #[tokio::test]
    async fn test_missing_root_and_overlay_driver() {
        let (collector, sink) = disk_collector(FixedDisk(None), FakeContainers::default());

        assert_eq!(collector.collect().await, 0);
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_unparsable_driver_sizes_are_skipped() {
        let containers = FakeContainers {
            driver_status: vec![
                row("Data Space Used", "lots"),
                row("Data Space Total", "10 GB"),
                row("Data Space Available", "7 GB"),
            ],
            ..Default::default()
        };
        let (collector, sink) = disk_collector(FixedDisk(None), containers);

        assert_eq!(collector.collect().await, 0);
        assert!(sink.get("ecsdisk.docker.total").is_none());
    }
}
