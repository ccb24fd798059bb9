use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use crate::domain::MetricPoint;
use crate::ports::MetricSink;

/// In-memory sink keeping the latest point per metric name
#[derive(Default)]
pub struct MemorySink {
    latest: RwLock<BTreeMap<String, MetricPoint>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest point for every name seen so far, ordered by name
    pub fn snapshot(&self) -> Vec<MetricPoint> {
        self.latest
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    /// Latest value published under `name`
    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.latest
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .map(|point| point.value)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.latest.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MetricSink for MemorySink {
    fn publish(&self, point: MetricPoint) {
        self.latest
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(point.name.clone(), point);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_latest_value() {
        let sink = MemorySink::new();
        sink.publish(MetricPoint::new("test.mem.rss", 100.0));
        sink.publish(MetricPoint::new("test.mem.rss", 200.0));
        sink.publish(MetricPoint::new("test.mem.limit", 500.0));

        assert_eq!(sink.get("test.mem.rss"), Some(200.0));
        assert_eq!(sink.len(), 2);

        let names: Vec<String> = sink.snapshot().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["test.mem.limit", "test.mem.rss"]);
    }
}
