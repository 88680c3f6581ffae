//! webclv - WebCL Validator
//!
//! Instruments OpenCL C kernels with memory-safety bounds checks: pointer
//! dereferences and array subscripts are rewritten to clamp into the
//! extents the validator can prove, addressable variables are relocated
//! into per-address-space records, and an envelope of those records is
//! threaded through every function a kernel can reach.
//!
//! # Example
//!
//! ```ignore
//! use webclv::{Driver, ValidatorConfig};
//! use webclv_source::SourceManager;
//!
//! let mut sources = SourceManager::new();
//! let file = sources.load_file("kernel.cl".as_ref(), false)?;
//! let rewritten = Driver::new(ValidatorConfig::new()).run(&sources, file)?;
//! ```

// Re-export from sub-crates
pub use webclv_ast::{
    AddressSpace, BinaryOp, Expr, ExprKind, FunctionDecl, Param, Stmt, StmtKind, TranslationUnit, Type, UnaryOp, VarDecl,
};
pub use webclv_lex::{parse_translation_unit, Lexer, Parser};
pub use webclv_sema::{walk_translation_unit, Analyser, AnalysisEvent, AstVisitor, BuiltinRegistry, Restrictor};
pub use webclv_source::{
    not_opencl_message, Diagnostic, DiagnosticBag, FileId, Kind, LanguageKind, LineCol, Severity, SourceError, SourceFile,
    SourceLocation, SourceManager, SourceRange,
};
pub use webclv_xform::{CheckerKind, TextRewriter, TransformationRegistry, Transformer, ValidatorConfig};

mod driver;
mod error;

pub use driver::Driver;
pub use error::{Error, Result};

/// Validate and instrument a source file on disk, auto-detecting OpenCL
/// kind from the `.cl` extension unless `force_opencl` is set.
pub fn validate_file(path: &std::path::Path, force_opencl: bool, config: ValidatorConfig) -> Result<String> {
    let mut sources = SourceManager::new();
    let file = sources.load_file(path, force_opencl)?;
    Driver::new(config).run(&sources, file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_file_roundtrips_a_trivial_kernel() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("k.cl");
        std::fs::write(&path, "__kernel void k(){}").unwrap();
        let output = validate_file(&path, false, ValidatorConfig::new()).expect("succeeds");
        assert!(output.starts_with("// WebCL Validator: validation stage.\n"));
    }
}
