use std::collections::{HashMap, HashSet, VecDeque};
use std::fs;
use std::io;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::ports::ProcessSource;

use super::parser;
use super::ProcfsConfig;

/// Process source implementation using procfs
pub struct ProcfsProcessSource {
    config: ProcfsConfig,
}

impl ProcfsProcessSource {
    pub fn new(config: ProcfsConfig) -> Self {
        Self { config }
    }

    fn list_pids(&self) -> io::Result<Vec<u32>> {
        let mut pids = Vec::new();

        for entry in fs::read_dir(&self.config.proc_path)? {
            let entry = entry?;
            if let Some(pid) = parser::parse_numeric_name(&entry.file_name().to_string_lossy()) {
                pids.push(pid);
            }
        }

        Ok(pids)
    }

    /// Map of parent PID to its direct children. Processes that exit while
    /// the table is built are left out.
    fn children_by_parent(&self) -> io::Result<HashMap<u32, Vec<u32>>> {
        let mut tree: HashMap<u32, Vec<u32>> = HashMap::new();

        for pid in self.list_pids()? {
            let stat_path = self.config.proc_path.join(pid.to_string()).join("stat");
            let Ok(content) = fs::read_to_string(stat_path) else {
                continue;
            };
            if let Ok(ppid) = parser::parse_proc_ppid(&content) {
                tree.entry(ppid).or_default().push(pid);
            }
        }

        Ok(tree)
    }
}

#[async_trait]
impl ProcessSource for ProcfsProcessSource {
    async fn descendants(&self, pid: u32) -> io::Result<Vec<u32>> {
        let tree = self.children_by_parent()?;
        let mut found = Vec::new();
        let mut visited = HashSet::from([pid]);
        let mut queue = VecDeque::from([pid]);

        while let Some(parent) = queue.pop_front() {
            for child in tree.get(&parent).into_iter().flatten() {
                if visited.insert(*child) {
                    found.push(*child);
                    queue.push_back(*child);
                }
            }
        }

        Ok(found)
    }

    async fn open_file_descriptors(&self, pid: u32) -> io::Result<Vec<u32>> {
        let fd_dir = self.config.proc_path.join(pid.to_string()).join("fd");

        let fds = fs::read_dir(fd_dir)?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| parser::parse_numeric_name(&entry.file_name().to_string_lossy()))
            .collect();

        Ok(fds)
    }

    async fn resolve_descriptor_target(&self, pid: u32, fd: u32) -> io::Result<PathBuf> {
        let link = self
            .config
            .proc_path
            .join(pid.to_string())
            .join("fd")
            .join(fd.to_string());

        fs::read_link(link)
    }
}

#[cfg(test)]
mod tests {
    use std::os::unix::fs::symlink;
    use std::path::Path;

    use tempfile::TempDir;

    use super::*;

    /// Helper to create a fake /proc entry with a parent and descriptor links
    fn add_process(proc_root: &Path, pid: u32, ppid: u32, fds: &[&str]) {
        let dir = proc_root.join(pid.to_string());
        fs::create_dir_all(dir.join("fd")).unwrap();
        fs::write(
            dir.join("stat"),
            format!("{} (proc {}) S {} {} {} 0 -1\n", pid, pid, ppid, pid, pid),
        )
        .unwrap();

        for (fd, target) in fds.iter().enumerate() {
            symlink(target, dir.join("fd").join(fd.to_string())).unwrap();
        }
    }

    fn fake_proc() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        add_process(root, 1, 0, &["/dev/null"]);
        add_process(root, 100, 1, &["socket:[1]", "/dev/null"]);
        add_process(root, 101, 100, &["socket:[2]", "socket:[3]"]);
        add_process(root, 102, 101, &["pipe:[4]"]);
        add_process(root, 200, 1, &["socket:[5]"]);

        temp_dir
    }

    fn source(temp_dir: &TempDir) -> ProcfsProcessSource {
        ProcfsProcessSource::new(ProcfsConfig::new(temp_dir.path()))
    }

    #[tokio::test]
    async fn test_descendants_are_recursive() {
        let temp_dir = fake_proc();
        let mut descendants = source(&temp_dir).descendants(100).await.unwrap();
        descendants.sort();

        assert_eq!(descendants, vec![101, 102]);
    }

    #[tokio::test]
    async fn test_parent_cycle_terminates() {
        // pid reuse can leave a stale stat pointing back into the tree
        let temp_dir = fake_proc();
        add_process(temp_dir.path(), 300, 301, &[]);
        add_process(temp_dir.path(), 301, 300, &[]);

        let descendants = source(&temp_dir).descendants(300).await.unwrap();
        assert_eq!(descendants, vec![301]);
    }

    #[tokio::test]
    async fn test_leaf_has_no_descendants() {
        let temp_dir = fake_proc();
        assert!(source(&temp_dir).descendants(200).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_open_descriptors_and_targets() {
        let temp_dir = fake_proc();
        let source = source(&temp_dir);

        let mut fds = source.open_file_descriptors(100).await.unwrap();
        fds.sort();
        assert_eq!(fds, vec![0, 1]);

        let target = source.resolve_descriptor_target(100, 0).await.unwrap();
        assert_eq!(target, PathBuf::from("socket:[1]"));
    }

    #[tokio::test]
    async fn test_vanished_process_is_not_found() {
        let temp_dir = fake_proc();
        let err = source(&temp_dir).open_file_descriptors(999).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
