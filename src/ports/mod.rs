pub mod container_source;
pub mod metric_sink;
pub mod process_source;
pub mod system_source;

pub use container_source::ContainerSource;
pub use metric_sink::MetricSink;
pub use process_source::ProcessSource;
pub use system_source::SystemSource;
