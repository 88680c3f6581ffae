//! Declarations: variables, parameters, and functions.

use webclv_source::{FileId, SourceRange};

use crate::expr::Expr;
use crate::stmt::Stmt;
use crate::types::{AddressSpace, Type};

#[derive(Clone, Debug)]
pub struct VarDecl {
    pub name: String,
    pub ty: Type,
    pub space: AddressSpace,
    pub init: Option<Expr>,
    /// `static` at function scope; treated as addressable per the recorded
    /// decision for the unspecified-in-source case.
    pub is_static: bool,
    pub span: SourceRange,
    pub name_span: SourceRange,
}

#[derive(Clone, Debug)]
pub struct Param {
    pub name: String,
    pub ty: Type,
    pub space: AddressSpace,
    pub span: SourceRange,
    pub name_span: SourceRange,
}

impl Param {
    #[must_use]
    pub fn is_pointer(&self) -> bool {
        matches!(self.ty, Type::Pointer { .. })
    }
}

#[derive(Clone, Debug)]
pub struct FunctionDecl {
    pub name: String,
    pub is_kernel: bool,
    pub return_ty: Type,
    pub params: Vec<Param>,
    /// `None` for a prototype with no body (not instrumented).
    pub body: Option<Stmt>,
    pub span: SourceRange,
    pub name_span: SourceRange,
}

#[derive(Clone, Debug)]
pub struct TranslationUnit {
    pub file: FileId,
    pub functions: Vec<FunctionDecl>,
}

impl TranslationUnit {
    #[must_use]
    pub fn kernels(&self) -> impl Iterator<Item = &FunctionDecl> {
        self.functions.iter().filter(|f| f.is_kernel)
    }
}
