use crate::core::project::{Chapter, Character};
use crate::services::chapter_number::extract_chapter_number;
use crate::services::coverage::CoverageIndex;
use crate::services::filename::ParsedFileInfo;
use crate::services::overrides::OverrideStore;
use serde::Serialize;
use std::collections::HashMap;

pub const RANGE_SIZE: usize = 100;

#[derive(Serialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct MatchStatus {
    /// Chapter id to coverage.
    pub chapters: HashMap<String, bool>,
    /// Range label to coverage.
    pub ranges: HashMap<String, bool>,
    /// Character id to coverage, for the selected chapter only.
    pub characters: HashMap<String, bool>,
}

/// A window of chapters by position in the project, `start..end`.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ChapterRange {
    pub index: usize,
    pub start: usize,
    pub end: usize,
    pub label: String,
}

impl ChapterRange {
    pub fn contains(&self, position: usize) -> bool {
        (self.start..self.end).contains(&position)
    }
}

pub fn chapter_ranges(chapter_count: usize) -> Vec<ChapterRange> {
    (0..chapter_count)
        .step_by(RANGE_SIZE)
        .enumerate()
        .map(|(index, start)| {
            let end = (start + RANGE_SIZE).min(chapter_count);
            ChapterRange {
                index,
                start,
                end,
                label: format!("{}-{}", start + 1, end),
            }
        })
        .collect()
}

/// Whether any file in the bucket carries the character's name or performer alias.
pub fn has_character_audio<'a, I>(character: &Character, bucket: I) -> bool
where
    I: IntoIterator<Item = &'a ParsedFileInfo>,
{
    let cv = character.cv_name.as_deref();
    bucket.into_iter().any(|file| {
        let by_name = file
            .character_name
            .as_deref()
            .is_some_and(|n| n == character.name || Some(n) == cv);
        let by_cv = cv.is_some() && file.cv_name.as_deref() == cv;
        by_name || by_cv
    })
}

fn is_character_covered(
    character: &Character,
    bucket: &[&ParsedFileInfo],
    overrides: &OverrideStore,
) -> bool {
    match overrides.get(&character.id) {
        Some(value) => value,
        None => has_character_audio(character, bucket.iter().copied()),
    }
}

fn is_chapter_covered(
    chapter: &Chapter,
    index: &CoverageIndex,
    characters: &HashMap<&str, &Character>,
    overrides: &OverrideStore,
) -> bool {
    // Titles without a readable number cannot be checked and count as covered.
    let Some(ordinal) = extract_chapter_number(&chapter.title) else {
        return true;
    };

    let bucket = index.bucket(ordinal);
    chapter
        .character_ids()
        .into_iter()
        .filter_map(|id| characters.get(id))
        .all(|character| is_character_covered(character, &bucket, overrides))
}

/// Computes the full status snapshot. Pure: identical inputs give identical output.
pub fn compute_status(
    index: &CoverageIndex,
    chapters: &[Chapter],
    characters: &[Character],
    overrides: &OverrideStore,
    selected_chapter_id: Option<&str>,
) -> MatchStatus {
    let lookup: HashMap<&str, &Character> = characters
        .iter()
        .filter(|c| c.is_active())
        .map(|c| (c.id.as_str(), c))
        .collect();

    let chapter_results: Vec<bool> = chapters
        .iter()
        .map(|chapter| is_chapter_covered(chapter, index, &lookup, overrides))
        .collect();

    let ranges = chapter_ranges(chapters.len())
        .into_iter()
        .map(|range| {
            let covered = chapter_results[range.start..range.end].iter().all(|&c| c);
            (range.label, covered)
        })
        .collect();

    let selected = selected_chapter_id
        .and_then(|id| chapters.iter().find(|c| c.id == id))
        .map(|chapter| character_statuses(chapter, index, &lookup, overrides))
        .unwrap_or_default();

    MatchStatus {
        chapters: chapters
            .iter()
            .zip(chapter_results)
            .map(|(chapter, covered)| (chapter.id.clone(), covered))
            .collect(),
        ranges,
        characters: selected,
    }
}

fn character_statuses(
    chapter: &Chapter,
    index: &CoverageIndex,
    characters: &HashMap<&str, &Character>,
    overrides: &OverrideStore,
) -> HashMap<String, bool> {
    let bucket = extract_chapter_number(&chapter.title)
        .map(|ordinal| index.bucket(ordinal))
        .unwrap_or_default();

    chapter
        .character_ids()
        .into_iter()
        .filter_map(|id| characters.get(id))
        .map(|character| {
            (
                character.id.clone(),
                is_character_covered(character, &bucket, overrides),
            )
        })
        .collect()
}
