use std::io;
use std::path::Path;
use std::sync::Arc;

use crate::ports::ProcessSource;

/// Counts open sockets held by a container's process tree.
///
/// Best effort and not atomic: processes and descriptors that disappear
/// while the tree is walked are skipped without being counted or retried.
pub struct SocketCounter {
    processes: Arc<dyn ProcessSource>,
}

impl SocketCounter {
    pub fn new(processes: Arc<dyn ProcessSource>) -> Self {
        Self { processes }
    }

    /// Open socket descriptors of `root_pid` and all of its descendants
    pub async fn count_open_sockets(&self, root_pid: u32) -> io::Result<u64> {
        let mut pids = vec![root_pid];
        pids.extend(self.processes.descendants(root_pid).await?);

        let mut count = 0;
        for pid in pids {
            let fds = match self.processes.open_file_descriptors(pid).await {
                Ok(fds) => fds,
                Err(e) if is_race(&e) => continue,
                Err(e) => return Err(e),
            };

            for fd in fds {
                match self.processes.resolve_descriptor_target(pid, fd).await {
                    Ok(target) if is_socket_target(&target) => count += 1,
                    Ok(_) => {}
                    Err(e) if is_race(&e) => {}
                    Err(e) => return Err(e),
                }
            }
        }

        Ok(count)
    }
}

/// Descriptor targets look like `socket:[12345]` for sockets
fn is_socket_target(target: &Path) -> bool {
    target
        .to_str()
        .map(|s| s.starts_with("socket:"))
        .unwrap_or(false)
}

fn is_race(error: &io::Error) -> bool {
    error.kind() == io::ErrorKind::NotFound
}
