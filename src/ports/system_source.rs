use std::path::Path;

use async_trait::async_trait;

use crate::domain::{DiskError, DiskUsageSample};

/// Port for host-level filesystem information
#[async_trait]
pub trait SystemSource: Send + Sync {
    /// Block totals for the filesystem mounted at `path`
    async fn disk_usage(&self, path: &Path) -> Result<DiskUsageSample, DiskError>;
}
