use crate::domain::MetricPoint;

/// Port for shipping metric points onward.
///
/// Fire-and-forget: callers do not wait for or rely on acknowledgement, and
/// points may be published from any task.
pub trait MetricSink: Send + Sync {
    fn publish(&self, point: MetricPoint);
}
