//! Expression nodes.

use webclv_source::SourceRange;

use crate::types::Type;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
    BitNot,
    AddrOf,
    Deref,
    PreInc,
    PreDec,
    PostInc,
    PostDec,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

/// One expression, tagged by `kind`, carrying the source range it was parsed from.
#[derive(Clone, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: SourceRange,
}

#[derive(Clone, Debug)]
pub enum ExprKind {
    IntLiteral(i64),
    FloatLiteral(f64),
    Ident(String),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Assign {
        target: Box<Expr>,
        value: Box<Expr>,
    },
    Subscript {
        base: Box<Expr>,
        index: Box<Expr>,
    },
    Call {
        callee: String,
        args: Vec<Expr>,
    },
    Cast {
        ty: Type,
        operand: Box<Expr>,
    },
}

impl Expr {
    #[must_use]
    pub fn int_literal(value: i64, span: SourceRange) -> Self {
        Self {
            kind: ExprKind::IntLiteral(value),
            span,
        }
    }

    #[must_use]
    pub fn float_literal(value: f64, span: SourceRange) -> Self {
        Self {
            kind: ExprKind::FloatLiteral(value),
            span,
        }
    }

    #[must_use]
    pub fn ident(name: impl Into<String>, span: SourceRange) -> Self {
        Self {
            kind: ExprKind::Ident(name.into()),
            span,
        }
    }

    #[must_use]
    pub fn unary(op: UnaryOp, operand: Expr, span: SourceRange) -> Self {
        Self {
            kind: ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            span,
        }
    }

    #[must_use]
    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr, span: SourceRange) -> Self {
        Self {
            kind: ExprKind::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            span,
        }
    }

    #[must_use]
    pub fn assign(target: Expr, value: Expr, span: SourceRange) -> Self {
        Self {
            kind: ExprKind::Assign {
                target: Box::new(target),
                value: Box::new(value),
            },
            span,
        }
    }

    #[must_use]
    pub fn subscript(base: Expr, index: Expr, span: SourceRange) -> Self {
        Self {
            kind: ExprKind::Subscript {
                base: Box::new(base),
                index: Box::new(index),
            },
            span,
        }
    }

    #[must_use]
    pub fn call(callee: impl Into<String>, args: Vec<Expr>, span: SourceRange) -> Self {
        Self {
            kind: ExprKind::Call {
                callee: callee.into(),
                args,
            },
            span,
        }
    }

    #[must_use]
    pub fn cast(ty: Type, operand: Expr, span: SourceRange) -> Self {
        Self {
            kind: ExprKind::Cast {
                ty,
                operand: Box::new(operand),
            },
            span,
        }
    }

    /// Whether this expression is a compile-time-constant integer literal,
    /// used to decide variable-initializer preservation (invariant 5).
    #[must_use]
    pub fn is_constant(&self) -> bool {
        matches!(self.kind, ExprKind::IntLiteral(_) | ExprKind::FloatLiteral(_))
    }

    #[must_use]
    pub fn as_ident(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Ident(name) => Some(name),
            _ => None,
        }
    }
}
