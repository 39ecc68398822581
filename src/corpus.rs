// src/corpus.rs
//! Raw corpus access: input discovery and record splitting.
//!
//! A dump file is a stream of `<page>...</page>` spans. The splitter yields
//! each span whole; a document is never cut between its start and end
//! delimiters. A trailing span with no closing tag is malformed and dropped.

use crate::error::{RankError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Opening delimiter of one raw document record.
pub const START_TAG: &str = "<page>";
/// Closing delimiter of one raw document record.
pub const END_TAG: &str = "</page>";

/// Lazy iterator over the complete document spans of one buffer.
pub struct DocumentSplitter<'a> {
    remaining: &'a str,
}

impl<'a> DocumentSplitter<'a> {
    #[must_use]
    pub fn new(content: &'a str) -> Self {
        Self { remaining: content }
    }
}

impl<'a> Iterator for DocumentSplitter<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let start = self.remaining.find(START_TAG)?;
        let after_start = &self.remaining[start..];
        let Some(end) = after_start.find(END_TAG) else {
            // Unterminated document: drop the tail.
            self.remaining = "";
            return None;
        };
        let span_len = end + END_TAG.len();
        let span = &after_start[..span_len];
        self.remaining = &after_start[span_len..];
        Some(span)
    }
}

/// Resolves the corpus input to a deterministic list of dump files.
///
/// A file path is used as-is; a directory is walked recursively with entries
/// sorted by file name so the corpus order is stable across runs.
///
/// # Errors
///
/// Returns an error if the path does not exist or the walk fails.
pub fn discover_inputs(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        return Err(RankError::Other(format!(
            "input path not found: {}",
            path.display()
        )));
    }

    let walker = WalkDir::new(path)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter();

    let mut files = Vec::new();
    for item in walker {
        let entry = item?;
        if entry.file_type().is_file() {
            files.push(entry.path().to_path_buf());
        }
    }
    Ok(files)
}

/// Reads every dump file under `path` and collects all complete documents.
///
/// # Errors
///
/// Returns an error if discovery or a file read fails.
pub fn collect_documents(path: &Path) -> Result<Vec<String>> {
    let mut documents = Vec::new();
    for file in discover_inputs(path)? {
        let content =
            std::fs::read_to_string(&file).map_err(|e| RankError::io(e, &file))?;
        documents.extend(DocumentSplitter::new(&content).map(str::to_string));
    }
    Ok(documents)
}
