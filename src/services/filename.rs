use crate::core::project::Character;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const AUDIO_EXTENSIONS: [&str; 2] = ["mp3", "wav"];

/// Alias used for narrator tracks.
pub const NARRATOR_CV: &str = "pb";
pub const NARRATOR_NAME: &str = "Narrator";

/// Widest chapter range a single file may claim.
pub const MAX_CHAPTER_SPAN: u32 = 100_000;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ParsedFileInfo {
    pub chapters: Vec<u32>,
    #[serde(default)]
    pub character_name: Option<String>,
    #[serde(default)]
    pub cv_name: Option<String>,
}

pub fn is_audio_file(filename: &str) -> bool {
    split_extension(filename).is_some()
}

/// Collects the performer aliases of every active character.
pub fn performer_aliases<'a, I>(characters: I) -> HashSet<String>
where
    I: IntoIterator<Item = &'a Character>,
{
    characters
        .into_iter()
        .filter(|c| c.is_active())
        .filter_map(|c| c.cv_name.clone())
        .collect()
}

/// Parses `"<chapters>[_<identifier>].<ext>"`, where `<chapters>` is `N` or
/// `A-B`. Returns `None` for anything that does not fit; rejection is not an
/// error.
pub fn parse_audio_filename(filename: &str, cv_aliases: &HashSet<String>) -> Option<ParsedFileInfo> {
    let base = split_extension(filename)?;

    let mut segments = base.split('_');
    let chapters = parse_chapter_spec(segments.next()?)?;

    let identifier = segments.collect::<Vec<_>>().join("_");
    let (mut character_name, mut cv_name) = if identifier.is_empty() {
        (None, None)
    } else if cv_aliases.contains(&identifier) {
        (None, Some(identifier))
    } else {
        (Some(identifier), None)
    };

    if character_name.as_deref() == Some(NARRATOR_CV) || cv_name.as_deref() == Some(NARRATOR_CV) {
        cv_name = Some(NARRATOR_CV.to_string());
        character_name = Some(NARRATOR_NAME.to_string());
    }

    Some(ParsedFileInfo {
        chapters,
        character_name,
        cv_name,
    })
}

fn split_extension(filename: &str) -> Option<&str> {
    let (base, ext) = filename.rsplit_once('.')?;
    AUDIO_EXTENSIONS
        .iter()
        .any(|e| e.eq_ignore_ascii_case(ext))
        .then_some(base)
}

fn parse_chapter_spec(spec: &str) -> Option<Vec<u32>> {
    let (start, end) = match spec.split_once('-') {
        Some((start, end)) => (parse_ordinal(start)?, parse_ordinal(end)?),
        None => {
            let chapter = parse_ordinal(spec)?;
            (chapter, chapter)
        }
    };

    if start == 0 || start > end || end - start >= MAX_CHAPTER_SPAN {
        return None;
    }
    Some((start..=end).collect())
}

fn parse_ordinal(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
