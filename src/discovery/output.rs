use std::{collections::BTreeMap, path::Path};

use serde::Serialize;

use super::{error::DiscoveryError, target::TargetRecord};

/// Wire shape of one entry in a file-based service discovery document.
#[derive(Debug, Serialize)]
pub struct TargetGroup<'a> {
    pub targets: [&'a str; 1],
    pub labels: &'a BTreeMap<String, String>,
}

impl<'a> From<&'a TargetRecord> for TargetGroup<'a> {
    fn from(target: &'a TargetRecord) -> Self {
        Self {
            targets: [target.id()],
            labels: target.labels(),
        }
    }
}

/// Serialize targets as a pretty-printed JSON array, two-space indented.
pub fn encode_targets(targets: &[TargetRecord]) -> Result<Vec<u8>, DiscoveryError> {
    let groups: Vec<TargetGroup<'_>> = targets.iter().map(TargetGroup::from).collect();
    Ok(serde_json::to_vec_pretty(&groups)?)
}

/// Replace the contents of `path` with `data`.
pub async fn write_targets(path: &Path, data: &[u8]) -> Result<(), DiscoveryError> {
    tokio::fs::write(path, data)
        .await
        .map_err(|source| DiscoveryError::Write {
            path: path.to_path_buf(),
            source,
        })
}
