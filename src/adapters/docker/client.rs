use async_trait::async_trait;
use bollard::container::{InspectContainerOptions, ListContainersOptions, StatsOptions};
use bollard::models::ContainerInspectResponse;
use bollard::{Docker, API_DEFAULT_VERSION};
use tracing::debug;

use crate::domain::{ContainerId, ContainerIdentity, InspectedContainer, RawStats};
use crate::ports::ContainerSource;

const CONNECT_TIMEOUT_SECS: u64 = 120;

/// Docker adapter using bollard client
pub struct DockerAdapter {
    client: Docker,
}

impl DockerAdapter {
    /// Connect using a `unix://`, `tcp://` or `http://` URL; anything else
    /// falls back to the local defaults
    pub fn with_url(client_url: &str) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let client = if let Some(path) = client_url.strip_prefix("unix://") {
            let path = if path.starts_with('/') {
                path.to_string()
            } else {
                format!("/{}", path)
            };
            Docker::connect_with_socket(&path, CONNECT_TIMEOUT_SECS, API_DEFAULT_VERSION)?
        } else if let Some(addr) = client_url.strip_prefix("tcp://") {
            Docker::connect_with_http(&format!("http://{}", addr), CONNECT_TIMEOUT_SECS, API_DEFAULT_VERSION)?
        } else if client_url.starts_with("http://") {
            Docker::connect_with_http(client_url, CONNECT_TIMEOUT_SECS, API_DEFAULT_VERSION)?
        } else {
            debug!(client_url, "Unrecognised client URL, using local defaults");
            Docker::connect_with_local_defaults()?
        };

        Ok(Self { client })
    }

    fn to_inspected(id: &ContainerId, response: ContainerInspectResponse) -> InspectedContainer {
        let (env, labels) = response
            .config
            .map(|config| (config.env.unwrap_or_default(), config.labels.unwrap_or_default()))
            .unwrap_or_default();

        let root_pid = response
            .state
            .and_then(|state| state.pid)
            .and_then(|pid| u32::try_from(pid).ok())
            .filter(|pid| *pid > 0);

        let identity = ContainerIdentity::new(
            response.id.map(ContainerId::new).unwrap_or_else(|| id.clone()),
            response.name.unwrap_or_default(),
        )
        .with_env(env)
        .with_labels(labels);

        InspectedContainer::new(identity, root_pid)
    }
}

#[async_trait]
impl ContainerSource for DockerAdapter {
    async fn list_containers(&self) -> Result<Vec<ContainerId>, Box<dyn std::error::Error + Send + Sync>> {
        let options = Some(ListContainersOptions::<String> {
            all: false,
            ..Default::default()
        });

        let containers = self
            .client
            .list_containers(options)
            .await?
            .into_iter()
            .filter_map(|summary| summary.id)
            .map(ContainerId::new)
            .collect();

        Ok(containers)
    }

    async fn inspect_container(
        &self,
        id: &ContainerId,
    ) -> Result<InspectedContainer, Box<dyn std::error::Error + Send + Sync>> {
        let response = self
            .client
            .inspect_container(id.as_str(), None::<InspectContainerOptions>)
            .await?;

        Ok(Self::to_inspected(id, response))
    }

    async fn get_container_stats(
        &self,
        id: &ContainerId,
    ) -> Result<RawStats, Box<dyn std::error::Error + Send + Sync>> {
        use futures::stream::StreamExt;

        let mut stream = self.client.stats(
            id.as_str(),
            Some(StatsOptions {
                stream: false,
                one_shot: true,
            }),
        );

        let stats = stream
            .next()
            .await
            .ok_or("No stats available")??;

        // Re-read through the optional-field model so schema variants are
        // handled by the snapshot parser
        let value = serde_json::to_value(&stats)?;
        Ok(serde_json::from_value(value)?)
    }

    async fn driver_status(&self) -> Result<Vec<(String, String)>, Box<dyn std::error::Error + Send + Sync>> {
        let info = self.client.info().await?;

        let rows = info
            .driver_status
            .unwrap_or_default()
            .into_iter()
            .filter_map(|row| {
                let mut cells = row.into_iter();
                Some((cells.next()?, cells.next()?))
            })
            .collect();

        Ok(rows)
    }
}
