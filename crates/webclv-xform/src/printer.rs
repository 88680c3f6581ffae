//! Printer (C9): guarantees the instrumented output carries the banner
//! comment as its literal first line, ahead of whatever prologue the
//! Transformer scheduled, then hands back the rendered text.

use webclv_source::SourceManager;

use crate::error::XformError;
use crate::registry::TransformationRegistry;
use crate::rewriter::TextRewriter;

const BANNER: &str = "// WebCL Validator: validation stage.\n";
const BANNER_PRIORITY: i32 = i32::MIN;

/// Schedules the banner and flushes `registry` through a fresh rewriter.
pub fn emit(sources: &SourceManager, file: webclv_source::FileId, mut registry: TransformationRegistry) -> Result<String, XformError> {
    registry.schedule_insert_before(sources.start_of(file), BANNER_PRIORITY, BANNER, None);
    let mut rewriter = TextRewriter::new(sources, file);
    registry.apply(&mut rewriter);
    rewriter.render()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn banner_is_always_the_first_line_even_with_no_other_edits() {
        let mut mgr = SourceManager::new();
        let file = mgr.add_text(PathBuf::from("k.cl"), "__kernel void k() {}".to_string(), true);
        let rendered = emit(&mgr, file, TransformationRegistry::new()).unwrap();
        assert_eq!(rendered, "// WebCL Validator: validation stage.\n__kernel void k() {}");
    }

    #[test]
    fn banner_precedes_other_scheduled_prologue_text() {
        let mut mgr = SourceManager::new();
        let file = mgr.add_text(PathBuf::from("k.cl"), "int x;".to_string(), true);
        let mut registry = TransformationRegistry::new();
        registry.schedule_insert_before(mgr.start_of(file), -20, "struct wcl_envelope { int unused; };\n", None);
        let rendered = emit(&mgr, file, registry).unwrap();
        assert!(rendered.starts_with("// WebCL Validator: validation stage.\nstruct wcl_envelope"));
    }
}
