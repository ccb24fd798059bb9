pub mod collector;
pub mod disk;
pub mod runner;
pub mod sockets;
pub mod status;

#[cfg(test)]
pub(crate) mod testing;

pub use collector::{CollectError, PollReport, StatsCollector};
pub use disk::DiskCollector;
pub use runner::{PollRunner, RunnerConfig};
pub use sockets::SocketCounter;
pub use status::{PollSummary, StatusBoard};
