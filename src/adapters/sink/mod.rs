mod graphite;
mod memory;

use std::sync::Arc;

pub use graphite::GraphiteLineSink;
pub use memory::MemorySink;

use crate::domain::MetricPoint;
use crate::ports::MetricSink;

/// Publishes every point to each of its sinks
#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn MetricSink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sink(mut self, sink: Arc<dyn MetricSink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl MetricSink for FanoutSink {
    fn publish(&self, point: MetricPoint) {
        for sink in &self.sinks {
            sink.publish(point.clone());
        }
    }
}
