//! Loaded source files and OpenCL language-kind detection.

use std::path::{Path, PathBuf};

use crate::location::FileId;

/// Whether a file is to be treated as OpenCL C.
///
/// Mirrors the front end's `-x cl` flag: an explicit language override always
/// wins; otherwise the `.cl` extension decides.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LanguageKind {
    OpenCl,
    Other,
}

impl LanguageKind {
    #[must_use]
    pub fn detect(path: &Path, forced_opencl: bool) -> Self {
        if forced_opencl || path.extension().and_then(|e| e.to_str()) == Some("cl") {
            Self::OpenCl
        } else {
            Self::Other
        }
    }

    #[must_use]
    pub fn is_opencl(self) -> bool {
        matches!(self, Self::OpenCl)
    }
}

/// One loaded translation unit.
#[derive(Clone, Debug)]
pub struct SourceFile {
    pub id: FileId,
    pub path: PathBuf,
    pub text: String,
    pub kind: LanguageKind,
    /// Byte offset of the start of each line, `line_starts[0] == 0`.
    pub(crate) line_starts: Vec<u32>,
}

impl SourceFile {
    pub(crate) fn new(id: FileId, path: PathBuf, text: String, forced_opencl: bool) -> Self {
        let kind = LanguageKind::detect(&path, forced_opencl);
        let line_starts = compute_line_starts(&text);
        Self {
            id,
            path,
            text,
            kind,
            line_starts,
        }
    }

    #[must_use]
    pub fn display_name(&self) -> String {
        self.path.display().to_string()
    }
}

fn compute_line_starts(text: &str) -> Vec<u32> {
    let mut starts = vec![0u32];
    for (i, b) in text.bytes().enumerate() {
        if b == b'\n' {
            starts.push((i + 1) as u32);
        }
    }
    starts
}

/// The exact fatal message template for scenario 6 (non-OpenCL input kind).
#[must_use]
pub fn not_opencl_message(display_path: &str) -> String {
    format!(
        "Source file '{display_path}' isn't treated as OpenCL code. Make sure that you give the '-x cl' option or that the file has a '.cl' extension.\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_alone_detects_opencl() {
        let kind = LanguageKind::detect(Path::new("kernel.cl"), false);
        assert_eq!(kind, LanguageKind::OpenCl);
    }

    #[test]
    fn forced_flag_overrides_extension() {
        let kind = LanguageKind::detect(Path::new("kernel.txt"), true);
        assert_eq!(kind, LanguageKind::OpenCl);
    }

    #[test]
    fn plain_c_without_force_is_other() {
        let kind = LanguageKind::detect(Path::new("foo.c"), false);
        assert_eq!(kind, LanguageKind::Other);
    }

    #[test]
    fn message_matches_exact_template() {
        let msg = not_opencl_message("foo.c");
        assert_eq!(
            msg,
            "Source file 'foo.c' isn't treated as OpenCL code. Make sure that you give the '-x cl' option or that the file has a '.cl' extension.\n"
        );
    }
}
