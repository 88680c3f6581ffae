//! Statement nodes.

use webclv_source::SourceRange;

use crate::decl::VarDecl;
use crate::expr::Expr;

/// One statement, tagged by `kind`.
#[derive(Clone, Debug)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: SourceRange,
}

#[derive(Clone, Debug)]
pub enum StmtKind {
    Expr(Expr),
    Decl(VarDecl),
    Compound(Vec<Stmt>),
    If {
        cond: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
    },
    For {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        step: Option<Expr>,
        body: Box<Stmt>,
    },
    Return(Option<Expr>),
}

impl Stmt {
    #[must_use]
    pub fn expr(expr: Expr, span: SourceRange) -> Self {
        Self {
            kind: StmtKind::Expr(expr),
            span,
        }
    }

    #[must_use]
    pub fn decl(decl: VarDecl, span: SourceRange) -> Self {
        Self {
            kind: StmtKind::Decl(decl),
            span,
        }
    }

    #[must_use]
    pub fn compound(stmts: Vec<Stmt>, span: SourceRange) -> Self {
        Self {
            kind: StmtKind::Compound(stmts),
            span,
        }
    }

    #[must_use]
    pub fn if_then(cond: Expr, then_branch: Stmt, span: SourceRange) -> Self {
        Self {
            kind: StmtKind::If {
                cond,
                then_branch: Box::new(then_branch),
                else_branch: None,
            },
            span,
        }
    }

    #[must_use]
    pub fn if_then_else(cond: Expr, then_branch: Stmt, else_branch: Stmt, span: SourceRange) -> Self {
        Self {
            kind: StmtKind::If {
                cond,
                then_branch: Box::new(then_branch),
                else_branch: Some(Box::new(else_branch)),
            },
            span,
        }
    }

    #[must_use]
    pub fn while_loop(cond: Expr, body: Stmt, span: SourceRange) -> Self {
        Self {
            kind: StmtKind::While {
                cond,
                body: Box::new(body),
            },
            span,
        }
    }

    #[must_use]
    pub fn for_loop(
        init: Option<Stmt>,
        cond: Option<Expr>,
        step: Option<Expr>,
        body: Stmt,
        span: SourceRange,
    ) -> Self {
        Self {
            kind: StmtKind::For {
                init: init.map(Box::new),
                cond,
                step,
                body: Box::new(body),
            },
            span,
        }
    }

    #[must_use]
    pub fn return_stmt(value: Option<Expr>, span: SourceRange) -> Self {
        Self {
            kind: StmtKind::Return(value),
            span,
        }
    }

    /// Byte offset immediately after this statement's opening brace, for
    /// kernel functions: where the kernel prologue is inserted. Only
    /// meaningful when `self` is a `Compound`.
    #[must_use]
    pub fn body_start(&self) -> Option<u32> {
        match &self.kind {
            StmtKind::Compound(_) => Some(self.span.start + 1),
            _ => None,
        }
    }
}
