use crate::core::io::Storage;
use crate::services::filename::ParsedFileInfo;
use crate::services::overrides::OverrideStore;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

#[derive(Serialize, Deserialize, Default, Clone, Debug, PartialEq)]
pub struct PersistedScan {
    #[serde(default)]
    pub directory_label: Option<String>,
    #[serde(default)]
    pub files: Vec<ParsedFileInfo>,
    #[serde(default)]
    pub overrides: OverrideStore,
}

/// Stores the last scan of each project as `<state_folder>/<project_id>/scan.json`.
pub struct ScanStore {
    storage: Arc<dyn Storage>,
    state_folder: String,
}

impl ScanStore {
    pub fn new(storage: Arc<dyn Storage>, state_folder: &str) -> Self {
        Self {
            storage,
            state_folder: state_folder.to_string(),
        }
    }

    fn path(&self, project_id: &str) -> Result<String> {
        if project_id.is_empty()
            || project_id.contains(['/', '\\'])
            || project_id.contains("..")
        {
            anyhow::bail!("Invalid project id for state storage: {:?}", project_id);
        }

        Ok(Path::new(&self.state_folder)
            .join(project_id)
            .join("scan.json")
            .to_string_lossy()
            .to_string())
    }

    pub async fn load(&self, project_id: &str) -> Result<PersistedScan> {
        let path = self.path(project_id)?;
        if !self.storage.exists(&path).await? {
            return Ok(PersistedScan::default());
        }

        log::debug!("Loading scan state from {}", path);
        let content = self.storage.read_to_string(&path).await?;
        serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path))
    }

    pub async fn save(&self, project_id: &str, scan: &PersistedScan) -> Result<()> {
        let path = self.path(project_id)?;
        let content = serde_json::to_string_pretty(scan)?;
        self.storage.write(&path, content.as_bytes()).await?;
        log::debug!("Saved scan state to {}", path);
        Ok(())
    }

    pub async fn clear(&self, project_id: &str) -> Result<()> {
        self.storage.delete(&self.path(project_id)?).await
    }
}
