pub mod docker;
pub mod procfs;
pub mod sink;

pub use docker::DockerAdapter;
pub use procfs::{ProcfsConfig, ProcfsProcessSource, StatvfsSystemSource};
pub use sink::{FanoutSink, GraphiteLineSink, MemorySink};
