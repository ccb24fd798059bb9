use tracing::debug;

use super::container::{prefix_chars, ContainerIdentity};

/// Literal segment closing every container prefix, separating these metrics
/// from other producers sharing the namespace
pub const SOURCE_SEGMENT: &str = "docker";

/// Naming options
#[derive(Debug, Clone)]
pub struct NamingConfig {
    /// Environment variable whose value replaces the container name
    pub name_from_env: Option<String>,
    /// Turn `/a/b/` style names into `a.b`
    pub sanitize_slashes: bool,
    /// Prefer ECS task labels over the container identity
    pub ecs_mode: bool,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            name_from_env: None,
            sanitize_slashes: true,
            ecs_mode: false,
        }
    }
}

/// Name and instance label resolved for one container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedName {
    pub name: String,
    pub instance: String,
}

impl ResolvedName {
    /// `<name>.<instance>.docker`
    pub fn prefix(&self) -> String {
        [self.name.as_str(), self.instance.as_str(), SOURCE_SEGMENT].join(".")
    }
}

/// Derives stable metric prefixes from volatile container metadata
#[derive(Debug, Clone, Default)]
pub struct NameResolver {
    config: NamingConfig,
}

impl NameResolver {
    pub fn new(config: NamingConfig) -> Self {
        Self { config }
    }

    pub fn resolve(&self, identity: &ContainerIdentity) -> ResolvedName {
        let mut name = identity.name.clone();
        let mut instance = identity.id.short().to_string();

        if let Some(env_key) = &self.config.name_from_env {
            if let Some(value) = identity.environment().get(env_key.as_str()) {
                name = value.to_string();
            }
        }

        if self.config.sanitize_slashes {
            name = join_segments(&name, "/");
        }

        if self.config.ecs_mode {
            if let Some((tag, task_id)) = ecs_override(identity) {
                name = join_segments(tag, "--");
                instance = prefix_chars(task_id, 8).to_string();
            }
        }

        if name.is_empty() {
            debug!(container = %identity.id.short(), "Container name resolved to an empty segment");
        }

        ResolvedName { name, instance }
    }
}

/// Trim `separator` characters from both ends, then join the pieces with `.`
fn join_segments(name: &str, separator: &str) -> String {
    let trim: Vec<char> = separator.chars().collect();
    name.trim_matches(trim.as_slice())
        .split(separator)
        .collect::<Vec<_>>()
        .join(".")
}

/// Tag label plus the task id from the task ARN, when both are usable.
///
/// The task id is the last `/` segment, which covers both the short
/// (`task/<id>`) and the cluster-qualified (`task/<cluster>/<id>`) ARN forms.
fn ecs_override(identity: &ContainerIdentity) -> Option<(&str, &str)> {
    let tag = identity.ecs_tag()?;
    let (_, task_id) = identity.task_arn()?.rsplit_once('/')?;
    if task_id.is_empty() {
        return None;
    }
    Some((tag, task_id))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::domain::container::{ECS_TAG_LABEL, ECS_TASK_ARN_LABEL};

    const ID: &str = "146979a5328952af505cd43123b45b06c38db8679aaadb2a4c18ad699a5cbeec";

    fn identity() -> ContainerIdentity {
        ContainerIdentity::new(ID, "test")
            .with_env(vec!["TEST=/new/name/".to_string()])
            .with_labels(HashMap::from([
                (ECS_TAG_LABEL.to_string(), "ecs--name".to_string()),
                (
                    ECS_TASK_ARN_LABEL.to_string(),
                    "arn:aws:ecs:us-west-1:000000000000:task/abcdef12-3456-789a-bcde-f123456789ab"
                        .to_string(),
                ),
            ]))
    }

    #[test]
    fn test_defaults() {
        let resolved = NameResolver::default().resolve(&identity());
        assert_eq!(resolved.prefix(), "test.146979a53289.docker");
    }

    #[test]
    fn test_leading_slash_is_trimmed() {
        let resolved = NameResolver::default().resolve(&ContainerIdentity::new(ID, "/test"));
        assert_eq!(resolved.name, "test");
    }

    #[test]
    fn test_name_from_env() {
        let resolver = NameResolver::new(NamingConfig {
            name_from_env: Some("TEST".to_string()),
            ..Default::default()
        });
        let resolved = resolver.resolve(&identity());
        assert_eq!(resolved.name, "new.name");
        assert_eq!(resolved.prefix(), "new.name.146979a53289.docker");
    }

    #[test]
    fn test_missing_env_key_keeps_name() {
        let resolver = NameResolver::new(NamingConfig {
            name_from_env: Some("MISSING".to_string()),
            ..Default::default()
        });
        assert_eq!(resolver.resolve(&identity()).name, "test");
    }

    #[test]
    fn test_without_sanitizing() {
        let resolver = NameResolver::new(NamingConfig {
            name_from_env: Some("TEST".to_string()),
            sanitize_slashes: false,
            ecs_mode: false,
        });
        assert_eq!(resolver.resolve(&identity()).prefix(), "/new/name/.146979a53289.docker");
    }

    #[test]
    fn test_ecs_mode() {
        let resolver = NameResolver::new(NamingConfig {
            ecs_mode: true,
            ..Default::default()
        });
        let resolved = resolver.resolve(&identity());
        assert_eq!(resolved.name, "ecs.name");
        assert_eq!(resolved.instance, "abcdef12");
        assert_eq!(resolved.prefix(), "ecs.name.abcdef12.docker");
    }

    #[test]
    fn test_ecs_mode_with_cluster_qualified_arn() {
        let resolver = NameResolver::new(NamingConfig {
            ecs_mode: true,
            ..Default::default()
        });
        let mut long_form = identity();
        long_form.labels.insert(
            ECS_TASK_ARN_LABEL.to_string(),
            "arn:aws:ecs:us-west-1:000000000000:task/dev/abcdef123456".to_string(),
        );

        let resolved = resolver.resolve(&long_form);
        assert_eq!(resolved.instance, "abcdef12");
        assert!(!resolved.instance.contains('/'));
        assert_eq!(resolved.prefix(), "ecs.name.abcdef12.docker");
    }

    #[test]
    fn test_ecs_mode_distinguishes_tasks_in_one_cluster() {
        let resolver = NameResolver::new(NamingConfig {
            ecs_mode: true,
            ..Default::default()
        });
        let task = |id: &str| {
            let mut identity = identity();
            identity.labels.insert(
                ECS_TASK_ARN_LABEL.to_string(),
                format!("arn:aws:ecs:us-west-1:000000000000:task/production-cluster/{}", id),
            );
            resolver.resolve(&identity).prefix()
        };

        assert_ne!(task("11111111aaaa"), task("22222222bbbb"));
    }

    #[test]
    fn test_ecs_mode_needs_both_labels() {
        let resolver = NameResolver::new(NamingConfig {
            ecs_mode: true,
            ..Default::default()
        });
        let mut partial = identity();
        partial.labels.remove(ECS_TASK_ARN_LABEL);

        assert_eq!(resolver.resolve(&partial).prefix(), "test.146979a53289.docker");
    }

    #[test]
    fn test_only_slashes_gives_empty_segment() {
        let resolved = NameResolver::default().resolve(&ContainerIdentity::new(ID, "///"));
        assert_eq!(resolved.prefix(), ".146979a53289.docker");
    }
}
