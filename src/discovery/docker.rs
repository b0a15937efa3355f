//! Docker engine access using bollard.
//!
//! Connects with the local defaults (honouring `DOCKER_HOST`) and
//! implements [`RuntimeClient`] on top of the bollard API.

use bollard::Docker;
use bollard::query_parameters::{InspectContainerOptionsBuilder, ListContainersOptionsBuilder};

use super::error::DiscoveryError;
use super::runtime::{ContainerSnapshot, RuntimeClient, RuntimeError};

/// Connect to the Docker daemon and negotiate the API version.
pub async fn connect() -> Result<Docker, DiscoveryError> {
    let docker = Docker::connect_with_local_defaults().map_err(DiscoveryError::Connect)?;
    docker
        .negotiate_version()
        .await
        .map_err(DiscoveryError::Connect)
}

impl RuntimeClient for Docker {
    async fn list_ids(&self) -> Result<Vec<String>, RuntimeError> {
        let options = ListContainersOptionsBuilder::new().all(true).build();

        let containers = self
            .list_containers(Some(options))
            .await
            .map_err(RuntimeError::List)?;

        Ok(containers
            .into_iter()
            .filter_map(|container| container.id)
            .collect())
    }

    async fn inspect(&self, id: &str) -> Result<ContainerSnapshot, RuntimeError> {
        let options = InspectContainerOptionsBuilder::new().build();

        let info = self
            .inspect_container(id, Some(options))
            .await
            .map_err(|source| RuntimeError::Inspect {
                id: id.to_string(),
                source,
            })?;

        let mut snapshot = ContainerSnapshot::from(info);
        if snapshot.id.is_empty() {
            snapshot.id = id.to_string();
        }
        Ok(snapshot)
    }
}
