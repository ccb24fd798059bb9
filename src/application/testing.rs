//! In-memory fakes for the ports, shared by the application tests.

use std::collections::{HashMap, VecDeque};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::{ContainerId, ContainerIdentity, InspectedContainer, MetricPoint, RawStats};
use crate::ports::{ContainerSource, MetricSink, ProcessSource};

pub const TEST_ID: &str = "146979a5328952af505cd43123b45b06c38db8679aaadb2a4c18ad699a5cbeec";

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Container source returning canned responses
#[derive(Default)]
pub struct FakeContainers {
    pub list_error: Option<String>,
    pub hang: bool,
    pub containers: Vec<(InspectedContainer, Mutex<VecDeque<Result<RawStats, String>>>)>,
    /// Listed but failing inspection, with the error to return
    pub uninspectable: Vec<(ContainerId, String)>,
    pub driver_status: Vec<(String, String)>,
}

impl FakeContainers {
    pub fn with_container(mut self, inspected: InspectedContainer, stats: Vec<Result<RawStats, String>>) -> Self {
        self.containers.push((inspected, Mutex::new(stats.into())));
        self
    }

    pub fn with_uninspectable(mut self, id: &str, error: &str) -> Self {
        self.uninspectable.push((ContainerId::new(id), error.to_string()));
        self
    }

    fn find(&self, id: &ContainerId) -> Result<&(InspectedContainer, Mutex<VecDeque<Result<RawStats, String>>>), BoxError> {
        self.containers
            .iter()
            .find(|(inspected, _)| &inspected.identity.id == id)
            .ok_or_else(|| format!("no such container: {}", id).into())
    }
}

#[async_trait]
impl ContainerSource for FakeContainers {
    async fn list_containers(&self) -> Result<Vec<ContainerId>, BoxError> {
        if self.hang {
            std::future::pending::<()>().await;
        }
        if let Some(error) = &self.list_error {
            return Err(error.clone().into());
        }
        Ok(self
            .uninspectable
            .iter()
            .map(|(id, _)| id.clone())
            .chain(self.containers.iter().map(|(inspected, _)| inspected.identity.id.clone()))
            .collect())
    }

    async fn inspect_container(&self, id: &ContainerId) -> Result<InspectedContainer, BoxError> {
        if let Some((_, error)) = self.uninspectable.iter().find(|(broken, _)| broken == id) {
            return Err(error.clone().into());
        }
        Ok(self.find(id)?.0.clone())
    }

    async fn get_container_stats(&self, id: &ContainerId) -> Result<RawStats, BoxError> {
        let (_, stats) = self.find(id)?;
        let next = stats.lock().unwrap().pop_front();
        match next {
            Some(Ok(raw)) => Ok(raw),
            Some(Err(error)) => Err(error.into()),
            None => Err("no stats queued".into()),
        }
    }

    async fn driver_status(&self) -> Result<Vec<(String, String)>, BoxError> {
        Ok(self.driver_status.clone())
    }
}

/// Process tree with descriptor targets; `None` targets vanish on resolve
#[derive(Default)]
pub struct FakeProcesses {
    pub children: HashMap<u32, Vec<u32>>,
    pub fds: HashMap<u32, Vec<Option<String>>>,
}

impl FakeProcesses {
    pub fn with_process(mut self, pid: u32, parent: Option<u32>, targets: &[Option<&str>]) -> Self {
        if let Some(parent) = parent {
            self.children.entry(parent).or_default().push(pid);
        }
        self.fds
            .insert(pid, targets.iter().map(|t| t.map(str::to_string)).collect());
        self
    }
}

#[async_trait]
impl ProcessSource for FakeProcesses {
    async fn descendants(&self, pid: u32) -> io::Result<Vec<u32>> {
        let mut found = Vec::new();
        let mut stack = vec![pid];
        while let Some(parent) = stack.pop() {
            for child in self.children.get(&parent).into_iter().flatten() {
                found.push(*child);
                stack.push(*child);
            }
        }
        Ok(found)
    }

    async fn open_file_descriptors(&self, pid: u32) -> io::Result<Vec<u32>> {
        let targets = self
            .fds
            .get(&pid)
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))?;
        Ok((0..targets.len() as u32).collect())
    }

    async fn resolve_descriptor_target(&self, pid: u32, fd: u32) -> io::Result<PathBuf> {
        self.fds
            .get(&pid)
            .and_then(|targets| targets.get(fd as usize).cloned().flatten())
            .map(PathBuf::from)
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
    }
}

/// Sink recording every point in publish order
#[derive(Default)]
pub struct RecordingSink {
    points: Mutex<Vec<MetricPoint>>,
}

impl RecordingSink {
    /// Points published since the last call
    pub fn take(&self) -> Vec<(String, f64)> {
        self.points
            .lock()
            .unwrap()
            .drain(..)
            .map(|point| (point.name, point.value))
            .collect()
    }
}

impl MetricSink for RecordingSink {
    fn publish(&self, point: MetricPoint) {
        self.points.lock().unwrap().push(point);
    }
}

pub fn identity(name: &str) -> ContainerIdentity {
    ContainerIdentity::new(TEST_ID, name)
}

/// Stats payload in the shape used by older runtimes (single network block)
pub fn raw_stats(total: u64, percpu: [u64; 4], rss: u64, net: u64) -> RawStats {
    serde_json::from_value(serde_json::json!({
        "cpu_stats": {
            "cpu_usage": { "total_usage": total, "percpu_usage": percpu }
        },
        "memory_stats": {
            "stats": { "total_rss": rss },
            "limit": 500
        },
        "network": { "rx_bytes": net, "tx_bytes": net }
    }))
    .unwrap()
}
