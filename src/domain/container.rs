use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Label carrying the ECS service tag (e.g. `service--web`)
pub const ECS_TAG_LABEL: &str = "tag";

/// Label the ECS agent stamps with the owning task's ARN
pub const ECS_TASK_ARN_LABEL: &str = "com.amazonaws.ecs.task-arn";

/// Unique identifier for a container
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerId(String);

impl ContainerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Conventional short form: the first 12 characters
    pub fn short(&self) -> &str {
        prefix_chars(&self.0, 12)
    }
}

impl From<String> for ContainerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for ContainerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for ContainerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of a container as read from the runtime on a single poll.
///
/// Never cached across polls: the same logical service may be backed by a
/// different container on the next one.
#[derive(Debug, Clone)]
pub struct ContainerIdentity {
    pub id: ContainerId,
    pub name: String,
    /// Raw `KEY=VALUE` strings as reported by the runtime
    pub env: Vec<String>,
    pub labels: HashMap<String, String>,
}

impl ContainerIdentity {
    pub fn new(id: impl Into<ContainerId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            env: Vec::new(),
            labels: HashMap::new(),
        }
    }

    pub fn with_env(mut self, env: Vec<String>) -> Self {
        self.env = env;
        self
    }

    pub fn with_labels(mut self, labels: HashMap<String, String>) -> Self {
        self.labels = labels;
        self
    }

    /// Environment as a map. Entries are split on the first `=` only; entries
    /// without one are ignored.
    pub fn environment(&self) -> HashMap<&str, &str> {
        self.env
            .iter()
            .filter_map(|pair| pair.split_once('='))
            .collect()
    }

    pub fn ecs_tag(&self) -> Option<&str> {
        self.label(ECS_TAG_LABEL)
    }

    pub fn task_arn(&self) -> Option<&str> {
        self.label(ECS_TASK_ARN_LABEL)
    }

    fn label(&self, key: &str) -> Option<&str> {
        self.labels
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }
}

/// Result of inspecting a running container
#[derive(Debug, Clone)]
pub struct InspectedContainer {
    pub identity: ContainerIdentity,
    /// PID of the container's top-level process, when the runtime reports one
    pub root_pid: Option<u32>,
}

impl InspectedContainer {
    pub fn new(identity: ContainerIdentity, root_pid: Option<u32>) -> Self {
        Self { identity, root_pid }
    }
}

pub(crate) fn prefix_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
