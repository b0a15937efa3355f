use std::{collections::BTreeMap, future::Future, time::Duration};

use bollard::models::{ContainerInspectResponse, ContainerStateStatusEnum};

/// Container engine operations the discovery loop depends on.
///
/// Implemented for [`bollard::Docker`] in `discovery::docker`. Every call is
/// read-only, so one client is shared by all concurrent inspections of a tick.
pub trait RuntimeClient: Send + Sync + 'static {
    /// Identifiers of every container known to the engine, running or not.
    fn list_ids(&self) -> impl Future<Output = Result<Vec<String>, RuntimeError>> + Send;

    /// Inspect a single container.
    fn inspect(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<ContainerSnapshot, RuntimeError>> + Send;
}

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("failed to list containers: {0}")]
    List(#[source] bollard::errors::Error),
    #[error("failed to inspect container `{id}`: {source}")]
    Inspect {
        id: String,
        #[source]
        source: bollard::errors::Error,
    },
    #[error("inspecting container `{id}` timed out after {timeout:?}")]
    Timeout { id: String, timeout: Duration },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerState {
    Empty,
    Created,
    Running,
    Paused,
    Restarting,
    Removing,
    Exited,
    Dead,
}

impl AsRef<str> for ContainerState {
    fn as_ref(&self) -> &str {
        match self {
            Self::Empty => "",
            Self::Created => "created",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Restarting => "restarting",
            Self::Removing => "removing",
            Self::Exited => "exited",
            Self::Dead => "dead",
        }
    }
}

impl From<ContainerStateStatusEnum> for ContainerState {
    fn from(status: ContainerStateStatusEnum) -> Self {
        match status {
            ContainerStateStatusEnum::EMPTY => Self::Empty,
            ContainerStateStatusEnum::CREATED => Self::Created,
            ContainerStateStatusEnum::RUNNING => Self::Running,
            ContainerStateStatusEnum::PAUSED => Self::Paused,
            ContainerStateStatusEnum::RESTARTING => Self::Restarting,
            ContainerStateStatusEnum::REMOVING => Self::Removing,
            ContainerStateStatusEnum::EXITED => Self::Exited,
            ContainerStateStatusEnum::DEAD => Self::Dead,
        }
    }
}

/// The parts of an inspection result that discovery cares about.
///
/// Fields missing from the engine response are left empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSnapshot {
    pub id: String,
    pub name: String,
    pub status: ContainerState,
    pub log_path: String,
    pub labels: BTreeMap<String, String>,
}

impl From<ContainerInspectResponse> for ContainerSnapshot {
    fn from(info: ContainerInspectResponse) -> Self {
        let status = info
            .state
            .and_then(|state| state.status)
            .map(ContainerState::from)
            .unwrap_or(ContainerState::Empty);
        let labels = info
            .config
            .and_then(|config| config.labels)
            .unwrap_or_default()
            .into_iter()
            .collect();

        Self {
            id: info.id.unwrap_or_default(),
            name: info.name.unwrap_or_default(),
            status,
            log_path: info.log_path.unwrap_or_default(),
            labels,
        }
    }
}
