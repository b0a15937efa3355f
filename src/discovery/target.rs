use std::{collections::BTreeMap, time::Duration};

use super::runtime::{ContainerSnapshot, RuntimeClient, RuntimeError};

pub const META_ID: &str = "__meta_docker_container_id";
pub const META_NAME: &str = "__meta_docker_container_name";
pub const META_STATUS: &str = "__meta_docker_container_status";
pub const META_LABEL_PREFIX: &str = "__meta_docker_container_label_";
pub const LABEL_PATH: &str = "__path__";

const RUNNING: &str = "running";

/// One discoverable target: a flat label set describing a single container.
///
/// Keys are kept sorted so the serialized form is stable across ticks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetRecord {
    labels: BTreeMap<String, String>,
}

impl TargetRecord {
    /// Build the record for a container regardless of its status.
    ///
    /// Container labels are applied in order of their original key, so when two
    /// keys sanitize to the same name the lexicographically greater one wins.
    pub fn from_snapshot(snapshot: &ContainerSnapshot) -> Self {
        let mut labels = BTreeMap::new();
        labels.insert(META_ID.to_string(), snapshot.id.clone());
        labels.insert(
            META_NAME.to_string(),
            strip_display_name(&snapshot.name).to_string(),
        );
        labels.insert(
            META_STATUS.to_string(),
            snapshot.status.as_ref().to_string(),
        );
        labels.insert(LABEL_PATH.to_string(), snapshot.log_path.clone());

        for (key, value) in &snapshot.labels {
            labels.insert(
                format!("{META_LABEL_PREFIX}{}", sanitize_label_name(key)),
                value.clone(),
            );
        }

        Self { labels }
    }

    pub fn id(&self) -> &str {
        self.get(META_ID).unwrap_or_default()
    }

    pub fn status(&self) -> &str {
        self.get(META_STATUS).unwrap_or_default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    pub fn labels(&self) -> &BTreeMap<String, String> {
        &self.labels
    }
}

/// Replace every `.` and `-` in a label name with `_`.
pub fn sanitize_label_name(name: &str) -> String {
    name.replace(['.', '-'], "_")
}

/// Docker reports names with a leading `/`.
pub fn strip_display_name(name: &str) -> &str {
    name.strip_prefix('/').unwrap_or(name)
}

/// What building a target for one container amounted to.
///
/// Only [`BuildOutcome::Target`] reaches the output; the other two variants
/// are kept apart so callers can tell a filtered container from a failed one.
#[derive(Debug)]
pub enum BuildOutcome {
    Target(TargetRecord),
    NotRunning { id: String, status: String },
    InspectFailed { id: String, error: RuntimeError },
}

/// Turn a snapshot into an outcome, filtering out anything not running.
pub fn build_target(snapshot: &ContainerSnapshot) -> BuildOutcome {
    let target = TargetRecord::from_snapshot(snapshot);
    if target.status() != RUNNING {
        return BuildOutcome::NotRunning {
            id: target.id().to_string(),
            status: target.status().to_string(),
        };
    }
    BuildOutcome::Target(target)
}

/// Inspect a container and build its target.
///
/// Inspection failures are reported as [`BuildOutcome::InspectFailed`] and
/// never abort the caller.
pub async fn inspect_target<C: RuntimeClient>(
    client: &C,
    id: &str,
    timeout: Option<Duration>,
) -> BuildOutcome {
    let inspected = match timeout {
        Some(timeout) => match tokio::time::timeout(timeout, client.inspect(id)).await {
            Ok(result) => result,
            Err(_) => Err(RuntimeError::Timeout {
                id: id.to_string(),
                timeout,
            }),
        },
        None => client.inspect(id).await,
    };

    match inspected {
        Ok(snapshot) => build_target(&snapshot),
        Err(error) => BuildOutcome::InspectFailed {
            id: id.to_string(),
            error,
        },
    }
}
