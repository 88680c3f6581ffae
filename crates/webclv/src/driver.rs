//! Driver (C10): runs the Restrictor (C4), then the Analyser (C5), then, if
//! no fatal diagnostic was raised, the Transformer (C7 -> C6 -> C8 -> C9).

use tracing::debug;
use webclv_ast::TranslationUnit;
use webclv_lex::parse_translation_unit;
use webclv_sema::{Analyser, BuiltinRegistry, Restrictor};
use webclv_source::{not_opencl_message, DiagnosticBag, FileId, Kind, SourceManager};
use webclv_xform::{Transformer, ValidatorConfig};

use crate::{Error, Result};

/// One validator run over one translation unit.
pub struct Driver {
    config: ValidatorConfig,
}

impl Driver {
    #[must_use]
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(ValidatorConfig::new())
    }

    /// Validate and instrument the translation unit held by `sources[file]`.
    ///
    /// Returns the rewritten text on success. Returns `Err` carrying every
    /// diagnostic raised when the input fails the language-kind check, fails
    /// to parse, or is rejected by the Restrictor.
    pub fn run(&self, sources: &SourceManager, file: FileId) -> Result<String> {
        let mut diagnostics = DiagnosticBag::new();

        let source_file = sources.file(file);
        if !source_file.kind.is_opencl() {
            diagnostics.fatal(Kind::Input, not_opencl_message(&source_file.display_name()), None);
            return Err(Error::Diagnostics(render(sources, &diagnostics)));
        }

        debug!(file = %source_file.display_name(), "parse: start");
        let text = source_file.text.clone();
        let tu = parse_translation_unit(&text, file, &mut diagnostics);
        debug!("parse: end");
        let Some(tu) = tu else {
            return Err(Error::Diagnostics(render(sources, &diagnostics)));
        };

        if !self.restrict(&tu, &mut diagnostics) {
            return Err(Error::Diagnostics(render(sources, &diagnostics)));
        }

        debug!("analyse: start");
        let events = Analyser::new().analyse(&tu);
        debug!(events = events.len(), "analyse: end");

        debug!("transform/rewrite/print: start");
        let output = Transformer::new(&self.config, sources)
            .run(&tu, &events)
            .map_err(Error::Xform)?;
        debug!("transform/rewrite/print: end");

        Ok(output)
    }

    fn restrict(&self, tu: &TranslationUnit, diagnostics: &mut DiagnosticBag) -> bool {
        let builtins = BuiltinRegistry::new();
        debug!("restrict: start");
        let mut restrictor = Restrictor::new(&builtins, diagnostics);
        let ok = restrictor.check(tu);
        debug!(ok, "restrict: end");
        if self.config.is_strict() && has_builtin_advisory(diagnostics) {
            return false;
        }
        ok
    }
}

/// Strict mode (C1) escalates unsafe-builtin warnings to fatal; the
/// Restrictor itself always reports them as `BuiltinAdvisory` warnings, so
/// the Driver re-checks the bag for any of those after the restrictor runs.
fn has_builtin_advisory(diagnostics: &DiagnosticBag) -> bool {
    diagnostics.iter().any(|d| matches!(d.kind, Kind::BuiltinAdvisory))
}

fn render(sources: &SourceManager, diagnostics: &DiagnosticBag) -> String {
    diagnostics.iter().map(|d| d.render(sources)).collect::<Vec<_>>().join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn run_source(source: &str, forced_opencl: bool) -> Result<String> {
        let mut mgr = SourceManager::new();
        let file = mgr.add_text(PathBuf::from("k.cl"), source.to_string(), forced_opencl);
        Driver::with_defaults().run(&mgr, file)
    }

    #[test]
    fn empty_kernel_produces_banner_and_macro_prologue() {
        let out = run_source("__kernel void k(){}", true).expect("succeeds");
        assert!(out.starts_with("// WebCL Validator: validation stage.\n"));
        assert!(out.contains("WCL_PTR_CHECKER"));
        assert!(!out.contains("wcl_private_record"));
    }

    #[test]
    fn unsupported_builtin_call_is_fatal() {
        let err = run_source("__kernel void k(__global int *a){ prefetch(a,1); }", true).unwrap_err();
        match err {
            Error::Diagnostics(msg) => assert!(msg.contains("unsupported builtin")),
            other => panic!("expected diagnostics error, got {other:?}"),
        }
    }

    #[test]
    fn non_opencl_file_without_forced_flag_is_fatal() {
        let err = run_source("int main(void) { return 0; }", false).unwrap_err();
        match err {
            Error::Diagnostics(msg) => assert!(msg.contains("isn't treated as OpenCL code")),
            other => panic!("expected diagnostics error, got {other:?}"),
        }
    }

    #[test]
    fn global_pointer_kernel_gains_a_size_parameter() {
        let out = run_source("__kernel void k(__global int *a){ a[get_global_id(0)] = 1; }", true).expect("succeeds");
        assert!(out.contains("wcl_a_size"));
    }
}
