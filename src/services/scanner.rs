use crate::core::io::Storage;
use crate::services::filename::is_audio_file;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    /// Human readable name of the scanned location.
    pub label: String,
    pub filenames: Vec<String>,
}

/// Produces the complete list of audio filenames for one scan.
#[async_trait]
pub trait DirectoryScanner: Send + Sync {
    async fn scan(&self) -> Result<ScanResult>;
}

pub struct StorageScanner {
    storage: Arc<dyn Storage>,
    folder: String,
}

impl StorageScanner {
    pub fn new(storage: Arc<dyn Storage>, folder: &str) -> Self {
        Self {
            storage,
            folder: folder.to_string(),
        }
    }
}

#[async_trait]
impl DirectoryScanner for StorageScanner {
    async fn scan(&self) -> Result<ScanResult> {
        let entries = self
            .storage
            .list(&self.folder)
            .await
            .with_context(|| format!("Failed to scan {}", self.folder))?;

        let mut filenames: Vec<String> = entries
            .iter()
            .filter_map(|entry| Path::new(entry).file_name())
            .map(|name| name.to_string_lossy().to_string())
            .filter(|name| is_audio_file(name))
            .collect();
        filenames.sort();

        Ok(ScanResult {
            label: self.folder.clone(),
            filenames,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::NativeStorage;
    use std::fs;

    #[tokio::test]
    async fn test_scan_keeps_audio_files_sorted() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let audio_dir = temp_dir.path().join("audio");
        fs::create_dir_all(&audio_dir)?;
        for name in ["2_Hero.wav", "1_Hero.mp3", "notes.txt", "cover.jpg", "3_pb.MP3"] {
            fs::write(audio_dir.join(name), b"")?;
        }

        let folder = audio_dir.to_string_lossy().to_string();
        let scanner = StorageScanner::new(Arc::new(NativeStorage::new()), &folder);
        let result = scanner.scan().await?;

        assert_eq!(result.label, folder);
        assert_eq!(result.filenames, vec!["1_Hero.mp3", "2_Hero.wav", "3_pb.MP3"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_scan_missing_folder_fails() {
        let temp_dir = tempfile::tempdir().unwrap();
        let missing = temp_dir.path().join("nowhere").to_string_lossy().to_string();

        let scanner = StorageScanner::new(Arc::new(NativeStorage::new()), &missing);
        let err = scanner.scan().await.unwrap_err();
        assert!(err.to_string().contains("Failed to scan"));
    }
}
