use async_trait::async_trait;

use crate::domain::{ContainerId, InspectedContainer, RawStats};

/// Port for the container runtime API
#[async_trait]
pub trait ContainerSource: Send + Sync {
    /// List running containers
    async fn list_containers(&self) -> Result<Vec<ContainerId>, Box<dyn std::error::Error + Send + Sync>>;

    /// Inspect a container for its identity and top-level PID
    async fn inspect_container(
        &self,
        id: &ContainerId,
    ) -> Result<InspectedContainer, Box<dyn std::error::Error + Send + Sync>>;

    /// Single-shot (non-streaming) stats for a container
    async fn get_container_stats(
        &self,
        id: &ContainerId,
    ) -> Result<RawStats, Box<dyn std::error::Error + Send + Sync>>;

    /// Storage driver status rows as (label, value) pairs
    async fn driver_status(&self) -> Result<Vec<(String, String)>, Box<dyn std::error::Error + Send + Sync>>;
}
