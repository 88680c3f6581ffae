//! Text Rewriter (C8): a thin write-only wrapper around a source-range-
//! addressed edit buffer. Ranges scheduled here never genuinely nest in this
//! implementation's scope (the Transformer composes already-mangled names
//! into a single flat replacement rather than scheduling an inner rewrite
//! inside an outer one), so rendering is a single left-to-right scan rather
//! than a recursive inner-then-outer pass.

use webclv_source::{FileId, SourceLocation, SourceManager, SourceRange};

use crate::XformError;

#[derive(Clone, Debug)]
pub enum EditKind {
    Insert(String),
    Replace(String),
}

#[derive(Clone, Debug)]
pub struct ScheduledEdit {
    pub start: u32,
    pub end: u32,
    pub order: usize,
    pub kind: EditKind,
}

/// Accumulates edits for one file and flushes them into rewritten text.
pub struct TextRewriter<'a> {
    sources: &'a SourceManager,
    file: FileId,
    edits: Vec<ScheduledEdit>,
    next_order: usize,
}

impl<'a> TextRewriter<'a> {
    #[must_use]
    pub fn new(sources: &'a SourceManager, file: FileId) -> Self {
        Self {
            sources,
            file,
            edits: Vec::new(),
            next_order: 0,
        }
    }

    fn take_order(&mut self) -> usize {
        let order = self.next_order;
        self.next_order += 1;
        order
    }

    pub fn insert_before(&mut self, loc: SourceLocation, text: impl Into<String>) {
        let order = self.take_order();
        self.edits.push(ScheduledEdit {
            start: loc.offset,
            end: loc.offset,
            order,
            kind: EditKind::Insert(text.into()),
        });
    }

    pub fn insert_after(&mut self, loc: SourceLocation, text: impl Into<String>) {
        // An after-insertion at offset N and a before-insertion at offset N
        // must not interleave arbitrarily; bias it later by nudging its
        // order key past any before-insertion scheduled at the same point.
        let order = self.take_order();
        self.edits.push(ScheduledEdit {
            start: loc.offset,
            end: loc.offset,
            order: order + (u32::MAX as usize),
            kind: EditKind::Insert(text.into()),
        });
    }

    pub fn replace(&mut self, range: SourceRange, text: impl Into<String>) {
        let order = self.take_order();
        self.edits.push(ScheduledEdit {
            start: range.start,
            end: range.end,
            order,
            kind: EditKind::Replace(text.into()),
        });
    }

    pub fn remove(&mut self, range: SourceRange) {
        self.replace(range, String::new());
    }

    #[must_use]
    pub fn text_of(&self, range: SourceRange) -> &str {
        self.sources.text_of(range)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Flush the buffer, applying every scheduled edit over the original text.
    pub fn render(mut self) -> Result<String, XformError> {
        self.edits.sort_by_key(|e| (e.start, e.order));
        let original = &self.sources.file(self.file).text;
        let bytes = original.as_bytes();
        let mut out = String::with_capacity(original.len());
        let mut cursor = 0usize;

        for edit in &self.edits {
            let start = edit.start as usize;
            if start < cursor {
                return Err(XformError::OverlappingEdits { file: self.file });
            }
            out.push_str(
                std::str::from_utf8(&bytes[cursor..start]).map_err(|_| XformError::InvalidUtf8 { file: self.file })?,
            );
            match &edit.kind {
                EditKind::Insert(text) => {
                    out.push_str(text);
                    cursor = start;
                }
                EditKind::Replace(text) => {
                    out.push_str(text);
                    cursor = edit.end as usize;
                }
            }
        }
        out.push_str(std::str::from_utf8(&bytes[cursor..]).map_err(|_| XformError::InvalidUtf8 { file: self.file })?);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn manager(text: &str) -> (SourceManager, FileId) {
        let mut mgr = SourceManager::new();
        let id = mgr.add_text(PathBuf::from("k.cl"), text.to_string(), true);
        (mgr, id)
    }

    #[test]
    fn replace_and_insert_compose_left_to_right() {
        let (mgr, file) = manager("int a[4]; a[2] = 1;");
        let mut rw = TextRewriter::new(&mgr, file);
        rw.insert_before(mgr.start_of(file), "// banner\n");
        rw.replace(SourceRange::new(file, 10, 18), "a[(2) % 4]");
        let rendered = rw.render().unwrap();
        assert_eq!(rendered, "// banner\nint a[4]; a[(2) % 4] = 1;");
    }

    #[test]
    fn remove_deletes_the_range() {
        let (mgr, file) = manager("int x = 7; use(x);");
        let mut rw = TextRewriter::new(&mgr, file);
        rw.remove(SourceRange::new(file, 0, 11));
        let rendered = rw.render().unwrap();
        assert_eq!(rendered, "use(x);");
    }

    #[test]
    fn empty_buffer_renders_original_text_unchanged() {
        let (mgr, file) = manager("__kernel void k() {}");
        let rw = TextRewriter::new(&mgr, file);
        assert!(rw.is_empty());
        assert_eq!(rw.render().unwrap(), "__kernel void k() {}");
    }
}
