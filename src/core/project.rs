use crate::core::io::Storage;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CharacterStatus {
    #[default]
    Active,
    Merged,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Character {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub cv_name: Option<String>, // performer alias
    #[serde(default)]
    pub status: CharacterStatus,
}

impl Character {
    pub fn is_active(&self) -> bool {
        self.status == CharacterStatus::Active
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ScriptLine {
    #[serde(default)]
    pub character_id: Option<String>,
    #[serde(default)]
    pub text: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Chapter {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub lines: Vec<ScriptLine>,
}

impl Chapter {
    /// Distinct character ids attributed in this chapter, in order of first appearance.
    pub fn character_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        for id in self.lines.iter().filter_map(|l| l.character_id.as_deref()) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Project {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub chapters: Vec<Chapter>,
    #[serde(default)]
    pub characters: Vec<Character>,
}

impl Project {
    pub async fn load(storage: &dyn Storage, path: &str) -> Result<Self> {
        let content = storage
            .read_to_string(path)
            .await
            .with_context(|| format!("Failed to load project file {}", path))?;
        let project: Project = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse project file {}", path))?;
        Ok(project)
    }

    pub fn active_characters(&self) -> impl Iterator<Item = &Character> {
        self.characters.iter().filter(|c| c.is_active())
    }

    pub fn chapter(&self, id: &str) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.id == id)
    }

    pub fn chapter_position(&self, id: &str) -> Option<usize> {
        self.chapters.iter().position(|c| c.id == id)
    }
}
