use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_audio")]
    pub audio_folder: String,

    #[serde(default = "default_project")]
    pub project_file: String,

    #[serde(default = "default_state")]
    pub state_folder: String,

    #[serde(default)]
    pub unattended: bool,

    #[serde(default = "default_rescan_on_start")]
    pub rescan_on_start: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            audio_folder: default_audio(),
            project_file: default_project(),
            state_folder: default_state(),
            unattended: false,
            rescan_on_start: default_rescan_on_start(),
        }
    }
}

fn default_audio() -> String {
    "audio".to_string()
}
fn default_project() -> String {
    "project.json".to_string()
}
fn default_state() -> String {
    "build".to_string()
}
fn default_rescan_on_start() -> bool {
    true
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("config.yml"))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!("{} not found. Please create one.", path.display());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = serde_yaml_ng::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(Path::new("config.yml"))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = serde_yaml_ng::to_string(self)?;
        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn ensure_directories(&self) -> Result<()> {
        fs::create_dir_all(&self.audio_folder)?;
        fs::create_dir_all(&self.state_folder)?;
        Ok(())
    }
}
