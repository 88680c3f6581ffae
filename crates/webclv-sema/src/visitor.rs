//! A shared read-only AST traversal, overridable at the node categories the
//! core's passes care about (variable decls, subscript expressions, unary
//! operators, call expressions, function decls), per the design note
//! mapping the original's visitor hierarchy onto a trait with default hooks.

use webclv_ast::{Expr, ExprKind, FunctionDecl, Stmt, StmtKind, TranslationUnit, UnaryOp, VarDecl};

#[allow(unused_variables)]
pub trait AstVisitor {
    fn visit_function(&mut self, f: &FunctionDecl) {
        walk_function(self, f);
    }
    fn visit_var_decl(&mut self, v: &VarDecl, in_kernel: bool) {
        if let Some(init) = &v.init {
            self.visit_expr(init);
        }
    }
    fn visit_stmt(&mut self, s: &Stmt) {
        walk_stmt(self, s);
    }
    fn visit_expr(&mut self, e: &Expr) {
        walk_expr(self, e);
    }
    fn visit_subscript(&mut self, base: &Expr, index: &Expr, whole: &Expr) {
        self.visit_expr(base);
        self.visit_expr(index);
    }
    fn visit_unary(&mut self, op: UnaryOp, operand: &Expr, whole: &Expr) {
        self.visit_expr(operand);
    }
    fn visit_call(&mut self, callee: &str, args: &[Expr], whole: &Expr) {
        for a in args {
            self.visit_expr(a);
        }
    }
}

pub fn walk_translation_unit<V: AstVisitor + ?Sized>(v: &mut V, tu: &TranslationUnit) {
    for f in &tu.functions {
        v.visit_function(f);
    }
}

pub fn walk_function<V: AstVisitor + ?Sized>(v: &mut V, f: &FunctionDecl) {
    if let Some(body) = &f.body {
        v.visit_stmt(body);
    }
}

pub fn walk_stmt<V: AstVisitor + ?Sized>(v: &mut V, s: &Stmt) {
    match &s.kind {
        StmtKind::Expr(e) => v.visit_expr(e),
        StmtKind::Decl(decl) => v.visit_var_decl(decl, false),
        StmtKind::Compound(stmts) => {
            for stmt in stmts {
                v.visit_stmt(stmt);
            }
        }
        StmtKind::If {
            cond,
            then_branch,
            else_branch,
        } => {
            v.visit_expr(cond);
            v.visit_stmt(then_branch);
            if let Some(e) = else_branch {
                v.visit_stmt(e);
            }
        }
        StmtKind::While { cond, body } => {
            v.visit_expr(cond);
            v.visit_stmt(body);
        }
        StmtKind::For { init, cond, step, body } => {
            if let Some(init) = init {
                v.visit_stmt(init);
            }
            if let Some(cond) = cond {
                v.visit_expr(cond);
            }
            if let Some(step) = step {
                v.visit_expr(step);
            }
            v.visit_stmt(body);
        }
        StmtKind::Return(value) => {
            if let Some(value) = value {
                v.visit_expr(value);
            }
        }
    }
}

pub fn walk_expr<V: AstVisitor + ?Sized>(v: &mut V, e: &Expr) {
    match &e.kind {
        ExprKind::IntLiteral(_) | ExprKind::FloatLiteral(_) | ExprKind::Ident(_) => {}
        ExprKind::Unary { op, operand } => v.visit_unary(*op, operand, e),
        ExprKind::Binary { lhs, rhs, .. } => {
            v.visit_expr(lhs);
            v.visit_expr(rhs);
        }
        ExprKind::Assign { target, value } => {
            v.visit_expr(target);
            v.visit_expr(value);
        }
        ExprKind::Subscript { base, index } => v.visit_subscript(base, index, e),
        ExprKind::Call { callee, args } => v.visit_call(callee, args, e),
        ExprKind::Cast { operand, .. } => v.visit_expr(operand),
    }
}
