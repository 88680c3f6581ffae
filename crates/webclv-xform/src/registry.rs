//! Transformation Registry (C6): maps each AST node scheduled for edit to
//! the transformation that will rewrite it, de-duplicating by a declaration
//! key so the Transformer can tell whether a given declaration already has
//! a scheduled edit (used to keep a kernel-parameter subscript from also
//! being scheduled as a general one).

use rustc_hash::FxHashSet;
use webclv_source::{SourceLocation, SourceRange};

use crate::rewriter::TextRewriter;

#[derive(Clone, Debug)]
enum Kind {
    InsertBefore(SourceLocation, String),
    InsertAfter(SourceLocation, String),
    Replace(SourceRange, String),
}

#[derive(Clone, Debug)]
struct Entry {
    priority: i32,
    order: usize,
    kind: Kind,
}

/// Insertion-ordered, priority-ordered schedule of pending edits.
#[derive(Default)]
pub struct TransformationRegistry {
    entries: Vec<Entry>,
    scheduled_decls: FxHashSet<String>,
    next_order: usize,
}

impl TransformationRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a declaration (addressed by its own synthesized key, e.g. the
    /// mangled name of a kernel parameter) already has a scheduled edit.
    #[must_use]
    pub fn contains(&self, decl_key: &str) -> bool {
        self.scheduled_decls.contains(decl_key)
    }

    fn mark(&mut self, decl_key: Option<&str>) {
        if let Some(key) = decl_key {
            self.scheduled_decls.insert(key.to_string());
        }
    }

    fn next(&mut self) -> usize {
        let order = self.next_order;
        self.next_order += 1;
        order
    }

    pub fn schedule_insert_before(&mut self, loc: SourceLocation, priority: i32, text: impl Into<String>, decl_key: Option<&str>) {
        self.mark(decl_key);
        let order = self.next();
        self.entries.push(Entry {
            priority,
            order,
            kind: Kind::InsertBefore(loc, text.into()),
        });
    }

    pub fn schedule_insert_after(&mut self, loc: SourceLocation, priority: i32, text: impl Into<String>, decl_key: Option<&str>) {
        self.mark(decl_key);
        let order = self.next();
        self.entries.push(Entry {
            priority,
            order,
            kind: Kind::InsertAfter(loc, text.into()),
        });
    }

    pub fn schedule_replace(&mut self, range: SourceRange, priority: i32, text: impl Into<String>, decl_key: Option<&str>) {
        self.mark(decl_key);
        let order = self.next();
        self.entries.push(Entry {
            priority,
            order,
            kind: Kind::Replace(range, text.into()),
        });
    }

    pub fn schedule_remove(&mut self, range: SourceRange, priority: i32, decl_key: Option<&str>) {
        self.schedule_replace(range, priority, String::new(), decl_key);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Flush every scheduled entry into `rewriter`, in priority order with
    /// ties broken by insertion order.
    pub fn apply(mut self, rewriter: &mut TextRewriter<'_>) {
        self.entries.sort_by_key(|e| (e.priority, e.order));
        for entry in self.entries {
            match entry.kind {
                Kind::InsertBefore(loc, text) => rewriter.insert_before(loc, text),
                Kind::InsertAfter(loc, text) => rewriter.insert_after(loc, text),
                Kind::Replace(range, text) => rewriter.replace(range, text),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use webclv_source::SourceManager;

    #[test]
    fn contains_reports_previously_scheduled_decls() {
        let mut reg = TransformationRegistry::new();
        assert!(!reg.contains("a"));
        reg.schedule_replace(SourceRange::new(webclv_source::FileId::new(0), 0, 1), 0, "x", Some("a"));
        assert!(reg.contains("a"));
    }

    #[test]
    fn apply_orders_by_priority_then_insertion() {
        let mut mgr = SourceManager::new();
        let file = mgr.add_text(PathBuf::from("k.cl"), "ABC".to_string(), true);
        let mut reg = TransformationRegistry::new();
        reg.schedule_insert_before(mgr.start_of(file), 1, "second-", None);
        reg.schedule_insert_before(mgr.start_of(file), 0, "first-", None);
        let mut rw = TextRewriter::new(&mgr, file);
        reg.apply(&mut rw);
        assert_eq!(rw.render().unwrap(), "first-second-ABC");
    }
}
