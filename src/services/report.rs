use crate::core::project::{Chapter, Project};
use crate::services::matcher::{ChapterRange, MatchStatus};
use crate::services::overrides::OverrideStore;

fn mark(covered: bool) -> &'static str {
    if covered {
        "✓"
    } else {
        "✗"
    }
}

pub fn render_ranges(ranges: &[ChapterRange], status: &MatchStatus) -> Vec<String> {
    ranges
        .iter()
        .map(|r| {
            let covered = status.ranges.get(&r.label).copied().unwrap_or(false);
            format!("[{}] {}", mark(covered), r.label)
        })
        .collect()
}

/// One line per chapter of the range, numbered by position.
pub fn render_chapters(project: &Project, range: &ChapterRange, status: &MatchStatus) -> Vec<String> {
    project.chapters[range.start..range.end.min(project.chapters.len())]
        .iter()
        .enumerate()
        .map(|(offset, chapter)| {
            let covered = status.chapters.get(&chapter.id).copied().unwrap_or(false);
            format!("[{}] {:>4}. {}", mark(covered), range.start + offset + 1, chapter.title)
        })
        .collect()
}

pub fn render_characters(
    project: &Project,
    chapter: &Chapter,
    status: &MatchStatus,
    overrides: &OverrideStore,
) -> Vec<String> {
    chapter
        .character_ids()
        .into_iter()
        .filter_map(|id| project.characters.iter().find(|c| c.id == id))
        .filter_map(|character| {
            let covered = status.characters.get(&character.id)?;
            let mut line = format!("[{}] {}", mark(*covered), character.name);
            if let Some(cv) = &character.cv_name {
                line.push_str(&format!(" ({})", cv));
            }
            if overrides.get(&character.id).is_some() {
                line.push_str(" *manual");
            }
            Some(line)
        })
        .collect()
}
