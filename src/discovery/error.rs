use std::path::PathBuf;

use super::runtime::RuntimeError;

/// Errors that stop the discovery loop.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("failed to connect to Docker: {0}")]
    Connect(#[source] bollard::errors::Error),
    #[error(transparent)]
    ListContainers(#[from] RuntimeError),
    #[error("failed to serialize targets: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write targets to `{path}`: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
