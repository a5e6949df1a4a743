use crate::core::project::{Chapter, Project};
use crate::services::coverage::CoverageIndex;
use crate::services::filename::{parse_audio_filename, performer_aliases};
use crate::services::matcher::{
    chapter_ranges, compute_status, ChapterRange, MatchStatus, RANGE_SIZE,
};
use crate::services::overrides::OverrideStore;
use crate::services::persistence::{PersistedScan, ScanStore};
use crate::services::scanner::DirectoryScanner;
use anyhow::{anyhow, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSummary {
    pub label: String,
    pub total: usize,
    pub parsed: usize,
    pub rejected: usize,
}

/// Audio coverage review of one project.
///
/// Every operation that changes an input recomputes the whole `MatchStatus`.
/// Operations that change scan state persist it first and only then commit
/// it in memory, so a failure leaves the previous state in place.
pub struct CheckSession {
    project: Project,
    scanner: Box<dyn DirectoryScanner>,
    store: ScanStore,
    scan: PersistedScan,
    index: CoverageIndex,
    ranges: Vec<ChapterRange>,
    selected_range: usize,
    selected_chapter: Option<String>,
    status: MatchStatus,
}

impl CheckSession {
    pub async fn open(
        project: Project,
        scanner: Box<dyn DirectoryScanner>,
        store: ScanStore,
    ) -> Result<Self> {
        let scan = store.load(&project.id).await?;
        let index = CoverageIndex::build(&scan.files);
        let ranges = chapter_ranges(project.chapters.len());
        let selected_chapter = project.chapters.first().map(|c| c.id.clone());

        let mut session = Self {
            project,
            scanner,
            store,
            scan,
            index,
            ranges,
            selected_range: 0,
            selected_chapter,
            status: MatchStatus::default(),
        };
        session.recompute();
        Ok(session)
    }

    fn recompute(&mut self) {
        self.status = compute_status(
            &self.index,
            &self.project.chapters,
            &self.project.characters,
            &self.scan.overrides,
            self.selected_chapter.as_deref(),
        );
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn status(&self) -> &MatchStatus {
        &self.status
    }

    pub fn ranges(&self) -> &[ChapterRange] {
        &self.ranges
    }

    pub fn selected_range(&self) -> Option<&ChapterRange> {
        self.ranges.get(self.selected_range)
    }

    pub fn selected_chapter(&self) -> Option<&Chapter> {
        self.selected_chapter
            .as_deref()
            .and_then(|id| self.project.chapter(id))
    }

    pub fn overrides(&self) -> &OverrideStore {
        &self.scan.overrides
    }

    pub fn directory_label(&self) -> Option<&str> {
        self.scan.directory_label.as_deref()
    }

    pub fn file_count(&self) -> usize {
        self.scan.files.len()
    }

    /// Replaces the parsed file set with a fresh scan. Overrides are kept.
    pub async fn rescan(&mut self) -> Result<ScanSummary> {
        let result = match self.scanner.scan().await {
            Ok(result) => result,
            Err(e) => {
                log::warn!("Scan failed, keeping previous results: {:#}", e);
                return Err(e);
            }
        };

        let aliases = performer_aliases(self.project.active_characters());
        let files: Vec<_> = result
            .filenames
            .iter()
            .filter_map(|name| {
                let parsed = parse_audio_filename(name, &aliases);
                if parsed.is_none() {
                    log::debug!("Skipping unrecognized filename: {}", name);
                }
                parsed
            })
            .collect();

        let summary = ScanSummary {
            label: result.label.clone(),
            total: result.filenames.len(),
            parsed: files.len(),
            rejected: result.filenames.len() - files.len(),
        };
        log::info!(
            "Scanned {}: {} audio files, {} matched the naming scheme",
            summary.label,
            summary.total,
            summary.parsed
        );

        let scan = PersistedScan {
            directory_label: Some(result.label),
            files,
            overrides: self.scan.overrides.clone(),
        };
        self.store.save(&self.project.id, &scan).await?;

        self.index = CoverageIndex::build(&scan.files);
        self.scan = scan;
        self.recompute();
        Ok(summary)
    }

    /// Selects a range and its first chapter.
    pub fn select_range(&mut self, index: usize) -> Result<()> {
        let range = self
            .ranges
            .get(index)
            .ok_or_else(|| anyhow!("Range {} out of bounds ({} ranges)", index, self.ranges.len()))?;

        self.selected_chapter = self.project.chapters.get(range.start).map(|c| c.id.clone());
        self.selected_range = index;
        self.recompute();
        Ok(())
    }

    pub fn select_chapter(&mut self, chapter_id: &str) -> Result<()> {
        let position = self
            .project
            .chapter_position(chapter_id)
            .ok_or_else(|| anyhow!("Unknown chapter: {}", chapter_id))?;

        if let Some(range) = self.ranges.iter().find(|r| r.contains(position)) {
            self.selected_range = range.index;
        }
        self.selected_chapter = Some(chapter_id.to_string());
        self.recompute();
        Ok(())
    }

    /// Flips the character's reported status by storing the opposite as an
    /// override. Returns the stored value.
    pub async fn toggle_character(&mut self, character_id: &str) -> Result<bool> {
        let current = self.status.characters.get(character_id).copied();

        let mut scan = self.scan.clone();
        let value = scan.overrides.toggle(character_id, current);
        self.store.save(&self.project.id, &scan).await?;

        self.scan = scan;
        self.recompute();
        Ok(value)
    }

    /// Swaps in a new script structure, keeping the selection where it still applies.
    pub fn update_project(&mut self, project: Project) {
        self.project = project;
        self.ranges = chapter_ranges(self.project.chapters.len());

        let position = self
            .selected_chapter
            .as_deref()
            .and_then(|id| self.project.chapter_position(id));
        match position {
            Some(position) => self.selected_range = position / RANGE_SIZE,
            None => {
                self.selected_range = 0;
                self.selected_chapter = self.project.chapters.first().map(|c| c.id.clone());
            }
        }
        self.recompute();
    }

    /// Forgets the scanned files, the directory label and every override.
    pub async fn reset(&mut self) -> Result<()> {
        self.store.clear(&self.project.id).await?;
        self.scan = PersistedScan::default();
        self.index = CoverageIndex::default();
        self.recompute();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::NativeStorage;
    use crate::core::project::{Character, CharacterStatus, ScriptLine};
    use crate::services::scanner::{ScanResult, StorageScanner};
    use async_trait::async_trait;
    use std::fs;
    use std::path::Path;
    use std::sync::{Arc, Mutex};

    struct MockScanner {
        results: Arc<Mutex<Vec<Result<ScanResult>>>>,
    }

    impl MockScanner {
        fn new(results: Vec<Result<ScanResult>>) -> Self {
            Self {
                results: Arc::new(Mutex::new(results)),
            }
        }
    }

    #[async_trait]
    impl DirectoryScanner for MockScanner {
        async fn scan(&self) -> Result<ScanResult> {
            let mut results = self.results.lock().unwrap();
            if results.is_empty() {
                return Err(anyhow!("No more scans"));
            }
            results.remove(0)
        }
    }

    fn scan_of(names: &[&str]) -> Result<ScanResult> {
        Ok(ScanResult {
            label: "audio".to_string(),
            filenames: names.iter().map(|n| n.to_string()).collect(),
        })
    }

    fn project(chapter_count: usize) -> Project {
        let chapters = (1..=chapter_count)
            .map(|n| Chapter {
                id: format!("c{}", n),
                title: format!("第{}章", n),
                lines: vec![
                    ScriptLine {
                        character_id: Some("hero".to_string()),
                        text: "Hello".to_string(),
                    },
                    ScriptLine {
                        character_id: Some("villain".to_string()),
                        text: "Goodbye".to_string(),
                    },
                ],
            })
            .collect();

        Project {
            id: "p1".to_string(),
            name: "Demo".to_string(),
            chapters,
            characters: vec![
                Character {
                    id: "hero".to_string(),
                    name: "Hero".to_string(),
                    cv_name: Some("alice".to_string()),
                    status: CharacterStatus::Active,
                },
                Character {
                    id: "villain".to_string(),
                    name: "Villain".to_string(),
                    cv_name: Some("bob".to_string()),
                    status: CharacterStatus::Active,
                },
            ],
        }
    }

    fn store_in(dir: &Path) -> ScanStore {
        ScanStore::new(Arc::new(NativeStorage::new()), dir.to_str().unwrap())
    }

    #[tokio::test]
    async fn test_rescan_computes_status() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let scanner = MockScanner::new(vec![scan_of(&[
            "1_Hero.mp3",
            "1_bob.mp3",
            "2_alice.wav",
            "readme_notes.mp3",
        ])]);

        let mut session = CheckSession::open(project(2), Box::new(scanner), store_in(temp_dir.path())).await?;
        assert!(!session.status().chapters["c1"]);

        let summary = session.rescan().await?;
        assert_eq!(summary.total, 4);
        assert_eq!(summary.parsed, 3);
        assert_eq!(summary.rejected, 1);

        assert!(session.status().chapters["c1"]);
        assert!(!session.status().chapters["c2"]);
        assert!(!session.status().ranges["1-2"]);
        assert_eq!(session.directory_label(), Some("audio"));
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_scan_keeps_previous_state() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let scanner = MockScanner::new(vec![
            scan_of(&["1_Hero.mp3", "1_Villain.mp3"]),
            Err(anyhow!("Permission denied")),
        ]);

        let mut session = CheckSession::open(project(1), Box::new(scanner), store_in(temp_dir.path())).await?;
        session.rescan().await?;
        session.toggle_character("villain").await?;
        let before = session.status().clone();

        assert!(session.rescan().await.is_err());
        assert_eq!(session.status(), &before);
        assert_eq!(session.file_count(), 2);
        assert_eq!(session.overrides().get("villain"), Some(false));
        Ok(())
    }

    #[tokio::test]
    async fn test_toggle_overrides_and_survives_rescan() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let scanner = MockScanner::new(vec![scan_of(&["1_Hero.mp3"]), scan_of(&["1_Hero.mp3"])]);

        let mut session = CheckSession::open(project(1), Box::new(scanner), store_in(temp_dir.path())).await?;
        session.rescan().await?;
        assert_eq!(session.status().characters["villain"], false);
        assert!(!session.status().chapters["c1"]);

        assert!(session.toggle_character("villain").await?);
        assert_eq!(session.status().characters["villain"], true);
        assert!(session.status().chapters["c1"]);

        session.rescan().await?;
        assert!(session.status().chapters["c1"]);

        assert!(!session.toggle_character("villain").await?);
        assert!(!session.status().chapters["c1"]);

        // Unknown characters are marked covered on first toggle
        assert!(session.toggle_character("stranger").await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_state_is_restored_on_open() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        {
            let scanner = MockScanner::new(vec![scan_of(&["1_Hero.mp3"])]);
            let mut session = CheckSession::open(project(1), Box::new(scanner), store_in(temp_dir.path())).await?;
            session.rescan().await?;
            session.toggle_character("villain").await?;
        }

        let session = CheckSession::open(project(1), Box::new(MockScanner::new(vec![])), store_in(temp_dir.path())).await?;
        assert_eq!(session.file_count(), 1);
        assert_eq!(session.overrides().get("villain"), Some(true));
        assert!(session.status().chapters["c1"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_reset_clears_files_and_overrides() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let scanner = MockScanner::new(vec![scan_of(&["1_Hero.mp3", "1_Villain.mp3"])]);

        let mut session = CheckSession::open(project(1), Box::new(scanner), store_in(temp_dir.path())).await?;
        session.rescan().await?;
        session.toggle_character("hero").await?;
        assert!(!session.status().chapters["c1"]);

        session.reset().await?;
        assert_eq!(session.file_count(), 0);
        assert!(session.overrides().is_empty());
        assert_eq!(session.directory_label(), None);
        assert!(!session.status().chapters["c1"]);
        assert!(!temp_dir.path().join("p1").join("scan.json").exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_range_and_chapter_selection() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let mut session = CheckSession::open(project(230), Box::new(MockScanner::new(vec![])), store_in(temp_dir.path())).await?;

        let labels: Vec<&str> = session.ranges().iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["1-100", "101-200", "201-230"]);
        assert_eq!(session.selected_chapter().map(|c| c.id.as_str()), Some("c1"));

        session.select_range(1)?;
        assert_eq!(session.selected_range().map(|r| r.index), Some(1));
        assert_eq!(session.selected_chapter().map(|c| c.id.as_str()), Some("c101"));
        assert_eq!(session.status().characters.len(), 2);

        session.select_chapter("c215")?;
        assert_eq!(session.selected_range().map(|r| r.index), Some(2));

        assert!(session.select_range(3).is_err());
        assert!(session.select_chapter("c999").is_err());
        assert_eq!(session.selected_chapter().map(|c| c.id.as_str()), Some("c215"));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_project_recomputes() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let scanner = MockScanner::new(vec![scan_of(&["1_Hero.mp3"])]);
        let mut session = CheckSession::open(project(1), Box::new(scanner), store_in(temp_dir.path())).await?;
        session.rescan().await?;
        assert!(!session.status().chapters["c1"]);

        let mut updated = project(1);
        updated.chapters[0].lines.truncate(1);
        session.update_project(updated);
        assert!(session.status().chapters["c1"]);
        assert_eq!(session.selected_chapter().map(|c| c.id.as_str()), Some("c1"));
        Ok(())
    }

    #[tokio::test]
    async fn test_with_storage_scanner() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let audio_dir = temp_dir.path().join("audio");
        fs::create_dir_all(&audio_dir)?;
        for name in ["1-2_alice.mp3", "1-2_Villain.wav", "cover.png"] {
            fs::write(audio_dir.join(name), b"")?;
        }

        let storage = Arc::new(NativeStorage::new());
        let scanner = StorageScanner::new(storage.clone(), audio_dir.to_str().unwrap());
        let store = ScanStore::new(storage, temp_dir.path().join("build").to_str().unwrap());

        let mut session = CheckSession::open(project(3), Box::new(scanner), store).await?;
        let summary = session.rescan().await?;
        assert_eq!(summary.total, 2);

        assert!(session.status().chapters["c1"]);
        assert!(session.status().chapters["c2"]);
        assert!(!session.status().chapters["c3"]);
        Ok(())
    }
}
