use crate::services::filename::ParsedFileInfo;
use std::collections::HashMap;

/// Chapter ordinal to every parsed file that covers it.
///
/// Each file is stored once; buckets hold positions into `files`.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CoverageIndex {
    files: Vec<ParsedFileInfo>,
    buckets: HashMap<u32, Vec<usize>>,
}

impl CoverageIndex {
    pub fn build<'a, I>(files: I) -> Self
    where
        I: IntoIterator<Item = &'a ParsedFileInfo>,
    {
        let files: Vec<ParsedFileInfo> = files.into_iter().cloned().collect();
        let mut buckets: HashMap<u32, Vec<usize>> = HashMap::new();
        for (position, file) in files.iter().enumerate() {
            for &chapter in &file.chapters {
                buckets.entry(chapter).or_default().push(position);
            }
        }
        Self { files, buckets }
    }

    /// Files covering `ordinal`, in scan order. Empty when none do.
    pub fn bucket(&self, ordinal: u32) -> Vec<&ParsedFileInfo> {
        self.buckets
            .get(&ordinal)
            .map(|positions| positions.iter().map(|&p| &self.files[p]).collect())
            .unwrap_or_default()
    }
}
