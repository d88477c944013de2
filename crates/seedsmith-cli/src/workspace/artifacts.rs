use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use seedsmith_core::{DESCRIPTOR_VERSION, DependencyResolution, EntityDescriptor};

use super::WorkspaceResult;
use super::atomic::write_bytes_atomic;

/// Analyzed entities plus their dependency resolution, as written by `analyze`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisArtifact {
    pub descriptor_version: String,
    pub entities: Vec<EntityDescriptor>,
    #[serde(default)]
    pub resolution: DependencyResolution,
}

impl AnalysisArtifact {
    pub fn new(entities: Vec<EntityDescriptor>, resolution: DependencyResolution) -> Self {
        Self {
            descriptor_version: DESCRIPTOR_VERSION.to_string(),
            entities,
            resolution,
        }
    }
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> WorkspaceResult<T> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> WorkspaceResult<()> {
    let data = serde_json::to_vec_pretty(value)?;
    write_bytes_atomic(path, &data)
}
