//! Owns every loaded `SourceFile` and answers location queries against them.

use std::path::{Path, PathBuf};

use crate::file::SourceFile;
use crate::location::{FileId, SourceLocation, SourceRange};
use crate::{Result, SourceError};

/// One-based line and column, for human-readable diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineCol {
    pub line: u32,
    pub column: u32,
}

/// Owns all source files read during a run.
#[derive(Default, Debug)]
pub struct SourceManager {
    files: Vec<SourceFile>,
}

impl SourceManager {
    #[must_use]
    pub fn new() -> Self {
        Self { files: Vec::new() }
    }

    /// Read `path` from disk and register it, detecting language kind.
    pub fn load_file(&mut self, path: &Path, forced_opencl: bool) -> Result<FileId> {
        let text = std::fs::read_to_string(path).map_err(|source| SourceError::CannotRead {
            path: path.display().to_string(),
            source,
        })?;
        Ok(self.add_text(path.to_path_buf(), text, forced_opencl))
    }

    /// Register in-memory text as a source file (used by tests and the `#include`-free fixtures).
    pub fn add_text(&mut self, path: PathBuf, text: String, forced_opencl: bool) -> FileId {
        let id = FileId(self.files.len() as u32);
        self.files.push(SourceFile::new(id, path, text, forced_opencl));
        id
    }

    #[must_use]
    pub fn file(&self, id: FileId) -> &SourceFile {
        &self.files[id.0 as usize]
    }

    /// The first file registered; by convention the translation unit's main file.
    #[must_use]
    pub fn main_file(&self) -> FileId {
        FileId(0)
    }

    #[must_use]
    pub fn start_of(&self, file: FileId) -> SourceLocation {
        SourceLocation::new(file, 0)
    }

    #[must_use]
    pub fn text_of(&self, range: SourceRange) -> &str {
        let file = self.file(range.file);
        &file.text[range.start as usize..range.end as usize]
    }

    /// Translate a byte offset into 1-based line/column, for diagnostics.
    #[must_use]
    pub fn line_col(&self, loc: SourceLocation) -> LineCol {
        let file = self.file(loc.file);
        let line_idx = match file.line_starts.binary_search(&loc.offset) {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        };
        let line_start = file.line_starts[line_idx];
        LineCol {
            line: (line_idx + 1) as u32,
            column: loc.offset - line_start + 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_col_tracks_newlines() {
        let mut mgr = SourceManager::new();
        let id = mgr.add_text(PathBuf::from("a.cl"), "ab\ncd\nef".to_string(), true);
        let lc = mgr.line_col(SourceLocation::new(id, 4));
        assert_eq!(lc, LineCol { line: 2, column: 2 });
    }

    #[test]
    fn text_of_extracts_exact_range() {
        let mut mgr = SourceManager::new();
        let id = mgr.add_text(PathBuf::from("a.cl"), "hello world".to_string(), true);
        let range = SourceRange::new(id, 6, 11);
        assert_eq!(mgr.text_of(range), "world");
    }
}
