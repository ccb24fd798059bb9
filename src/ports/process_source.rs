use std::io;
use std::path::PathBuf;

use async_trait::async_trait;

/// Port for inspecting the host process tree.
///
/// Reads are not atomic with respect to the processes being inspected: a
/// process or descriptor may disappear between calls, which surfaces as
/// `io::ErrorKind::NotFound`.
#[async_trait]
pub trait ProcessSource: Send + Sync {
    /// All descendants of `pid` (children, grandchildren, ...)
    async fn descendants(&self, pid: u32) -> io::Result<Vec<u32>>;

    /// Descriptor numbers currently open by `pid`
    async fn open_file_descriptors(&self, pid: u32) -> io::Result<Vec<u32>>;

    /// What descriptor `fd` of `pid` points at (e.g. `socket:[1234]`)
    async fn resolve_descriptor_target(&self, pid: u32, fd: u32) -> io::Result<PathBuf>;
}
