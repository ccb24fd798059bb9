pub mod container;
pub mod disk;
pub mod metrics;
pub mod naming;
pub mod rate;
pub mod snapshot;

pub use container::{ContainerId, ContainerIdentity, InspectedContainer};
pub use disk::{DataSpace, DiskError, DiskUsageSample};
pub use metrics::{round_to, MetricKey, MetricPoint, CPU_NANOS_DIVISOR, MAX_COUNTER};
pub use naming::{NameResolver, NamingConfig};
pub use rate::RateTracker;
pub use snapshot::{
    CpuUsage, InterfaceCounters, MemoryUsage, MetricGroup, RawStats, SnapshotParser, StatsSnapshot,
};
