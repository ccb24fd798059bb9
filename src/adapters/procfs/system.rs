use std::path::Path;

use async_trait::async_trait;

use crate::domain::{DiskError, DiskUsageSample};
use crate::ports::SystemSource;

/// System source implementation using statvfs
#[derive(Debug, Clone, Default)]
pub struct StatvfsSystemSource;

impl StatvfsSystemSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SystemSource for StatvfsSystemSource {
    async fn disk_usage(&self, path: &Path) -> Result<DiskUsageSample, DiskError> {
        if !path.is_dir() {
            return Err(DiskError::MissingPath(path.display().to_string()));
        }

        let stat = nix::sys::statvfs::statvfs(path).map_err(|e| DiskError::Stat(e.to_string()))?;
        let block_size = stat.block_size() as u64;
        let total_bytes = stat.blocks() as u64 * block_size;
        let free_bytes = stat.blocks_free() as u64 * block_size;

        Ok(DiskUsageSample::new(
            path.display().to_string(),
            total_bytes,
            free_bytes,
        ))
    }
}
