//! Recursive-descent parser for the OpenCL C subset the core instruments.

use webclv_ast::{AddressSpace, BinaryOp, Expr, FunctionDecl, Param, Stmt, TranslationUnit, Type, UnaryOp, VarDecl};
use webclv_source::{DiagnosticBag, FileId, Kind, SourceRange as AstSourceRange};

use crate::token::{Token, TokenKind};

type AstStmtList = Vec<Stmt>;

const ADDRESS_SPACE_KEYWORDS: &[(&str, AddressSpace)] = &[
    ("__global", AddressSpace::Global),
    ("global", AddressSpace::Global),
    ("__local", AddressSpace::Local),
    ("local", AddressSpace::Local),
    ("__constant", AddressSpace::Constant),
    ("constant", AddressSpace::Constant),
    ("__private", AddressSpace::Private),
    ("private", AddressSpace::Private),
];

const KERNEL_KEYWORDS: &[&str] = &["__kernel", "kernel"];
const TYPE_NOISE_WORDS: &[&str] = &["const", "unsigned", "signed", "volatile", "restrict", "__restrict"];

pub struct Parser<'d> {
    tokens: Vec<Token>,
    pos: usize,
    file: FileId,
    diagnostics: &'d mut DiagnosticBag,
}

impl<'d> Parser<'d> {
    #[must_use]
    pub fn new(tokens: Vec<Token>, file: FileId, diagnostics: &'d mut DiagnosticBag) -> Self {
        Self {
            tokens,
            pos: 0,
            file,
            diagnostics,
        }
    }

    /// Parse a full translation unit. Returns `None` if a fatal parse
    /// diagnostic was raised; partial progress is discarded, matching the
    /// core's "partially rewritten output is not emitted" failure semantics.
    pub fn parse_translation_unit(mut self) -> Option<TranslationUnit> {
        let mut functions = Vec::new();
        while !self.at_eof() {
            functions.push(self.parse_function_decl()?);
        }
        Some(TranslationUnit {
            file: self.file,
            functions,
        })
    }

    // ---- token stream helpers ----

    fn at_eof(&self) -> bool {
        matches!(self.cur().kind, TokenKind::Eof)
    }

    fn cur(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn cur_ident(&self) -> Option<&str> {
        self.cur().ident_text()
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.cur().kind) == std::mem::discriminant(kind)
    }

    fn check_ident(&self, text: &str) -> bool {
        self.cur_ident() == Some(text)
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_ident(&mut self, text: &str) -> bool {
        if self.check_ident(text) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind, what: &str) -> Option<Token> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            self.fatal_here(format!("expected {what}"));
            None
        }
    }

    fn expect_ident(&mut self, what: &str) -> Option<(String, AstSourceRange)> {
        if let Some(name) = self.cur_ident() {
            let name = name.to_string();
            let span = to_ast_span(self.cur().span);
            self.advance();
            Some((name, span))
        } else {
            self.fatal_here(format!("expected {what}"));
            None
        }
    }

    fn fatal_here(&mut self, message: impl Into<String>) {
        self.diagnostics
            .fatal(Kind::Setup, message, Some(to_ast_span(self.cur().span).start_loc()));
    }

    fn span_from(&self, start: AstSourceRange) -> AstSourceRange {
        let end = to_ast_span(self.tokens[self.pos.saturating_sub(1)].span);
        AstSourceRange::new(start.file, start.start, end.end)
    }

    // ---- declarations ----

    fn parse_function_decl(&mut self) -> Option<FunctionDecl> {
        let start_span = to_ast_span(self.cur().span);
        let mut is_kernel = false;
        while let Some(name) = self.cur_ident() {
            if KERNEL_KEYWORDS.contains(&name) {
                is_kernel = true;
                self.advance();
            } else {
                break;
            }
        }

        let return_ty = self.parse_type()?;
        let (name, name_span) = self.expect_ident("function name")?;
        self.expect(&TokenKind::LParen, "'('")?;
        let params = self.parse_param_list()?;
        self.expect(&TokenKind::RParen, "')'")?;

        let body = if self.eat(&TokenKind::Semi) {
            None
        } else {
            Some(self.parse_compound_stmt()?)
        };

        Some(FunctionDecl {
            name,
            is_kernel,
            return_ty,
            params,
            body,
            span: self.span_from(start_span),
            name_span,
        })
    }

    fn parse_param_list(&mut self) -> Option<Vec<Param>> {
        let mut params = Vec::new();
        if self.check(&TokenKind::RParen) {
            return Some(params);
        }
        if self.check_ident("void") && self.peek_is_rparen_after_void() {
            self.advance();
            return Some(params);
        }
        loop {
            params.push(self.parse_param()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        Some(params)
    }

    fn peek_is_rparen_after_void(&self) -> bool {
        self.tokens
            .get(self.pos + 1)
            .is_some_and(|t| matches!(t.kind, TokenKind::RParen))
    }

    fn parse_param(&mut self) -> Option<Param> {
        let start_span = to_ast_span(self.cur().span);
        let (base_ty, space) = self.parse_type_with_space()?;
        let is_ptr = self.eat(&TokenKind::Star);
        let (name, name_span) = self.expect_ident("parameter name")?;
        let ty = if is_ptr {
            Type::pointer(space, base_ty)
        } else if self.eat(&TokenKind::LBracket) {
            let size = self.parse_int_literal()?;
            self.expect(&TokenKind::RBracket, "']'")?;
            Type::array(base_ty, size)
        } else {
            base_ty
        };
        Some(Param {
            name,
            ty,
            space,
            span: self.span_from(start_span),
            name_span,
        })
    }

    /// Parses a type, consuming any address-space qualifiers and folding
    /// them into the returned space (defaulting to `Private`).
    fn parse_type_with_space(&mut self) -> Option<(Type, AddressSpace)> {
        let mut space = AddressSpace::Private;
        loop {
            let Some(name) = self.cur_ident() else { break };
            if let Some((_, tagged)) = ADDRESS_SPACE_KEYWORDS.iter().find(|(kw, _)| *kw == name) {
                space = *tagged;
                self.advance();
            } else if TYPE_NOISE_WORDS.contains(&name) {
                self.advance();
            } else {
                break;
            }
        }
        let (base_name, _) = self.expect_ident("type name")?;
        Some((Type::scalar(base_name), space))
    }

    fn parse_type(&mut self) -> Option<Type> {
        self.parse_type_with_space().map(|(ty, _)| ty)
    }

    fn parse_int_literal(&mut self) -> Option<u64> {
        match self.cur().kind {
            TokenKind::IntLit(v) => {
                self.advance();
                Some(v.max(0) as u64)
            }
            _ => {
                self.fatal_here("expected integer literal");
                None
            }
        }
    }

    // ---- statements ----

    fn parse_compound_stmt(&mut self) -> Option<Stmt> {
        let start_span = to_ast_span(self.cur().span);
        self.expect(&TokenKind::LBrace, "'{'")?;
        let mut stmts = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_eof() {
            stmts.extend(self.parse_stmt()?);
        }
        self.expect(&TokenKind::RBrace, "'}'")?;
        Some(Stmt::compound(stmts, self.span_from(start_span)))
    }

    fn parse_stmt(&mut self) -> Option<AstStmtList> {
        if self.check(&TokenKind::LBrace) {
            return Some(vec![self.parse_compound_stmt()?]);
        }
        if self.check_ident("if") {
            return Some(vec![self.parse_if_stmt()?]);
        }
        if self.check_ident("while") {
            return Some(vec![self.parse_while_stmt()?]);
        }
        if self.check_ident("for") {
            return Some(vec![self.parse_for_stmt()?]);
        }
        if self.check_ident("return") {
            return Some(vec![self.parse_return_stmt()?]);
        }
        if self.looks_like_decl() {
            return self.parse_decl_stmt();
        }
        let start_span = to_ast_span(self.cur().span);
        let expr = self.parse_expr()?;
        self.expect(&TokenKind::Semi, "';'")?;
        Some(vec![Stmt::expr(expr, self.span_from(start_span))])
    }

    fn looks_like_decl(&self) -> bool {
        let Some(name) = self.cur_ident() else { return false };
        name == "static"
            || ADDRESS_SPACE_KEYWORDS.iter().any(|(kw, _)| *kw == name)
            || TYPE_NOISE_WORDS.contains(&name)
            || is_known_scalar_type(name)
    }

    fn parse_decl_stmt(&mut self) -> Option<AstStmtList> {
        let start_span = to_ast_span(self.cur().span);
        let is_static = self.eat_ident("static");
        let (base_ty, space) = self.parse_type_with_space()?;

        let mut out = Vec::new();
        loop {
            let is_ptr = self.eat(&TokenKind::Star);
            let (name, name_span) = self.expect_ident("variable name")?;
            let mut ty = if is_ptr {
                Type::pointer(space, base_ty.clone())
            } else {
                base_ty.clone()
            };
            if self.eat(&TokenKind::LBracket) {
                let size = self.parse_int_literal()?;
                self.expect(&TokenKind::RBracket, "']'")?;
                ty = Type::array(ty, size);
            }
            let init = if self.eat(&TokenKind::Eq) { Some(self.parse_assignment()?) } else { None };
            out.push(Stmt::decl(
                VarDecl {
                    name,
                    ty,
                    space,
                    init,
                    is_static,
                    span: self.span_from(start_span),
                    name_span,
                },
                self.span_from(start_span),
            ));
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::Semi, "';'")?;
        Some(out)
    }

    fn parse_if_stmt(&mut self) -> Option<Stmt> {
        let start_span = to_ast_span(self.cur().span);
        self.advance(); // 'if'
        self.expect(&TokenKind::LParen, "'('")?;
        let cond = self.parse_expr()?;
        self.expect(&TokenKind::RParen, "')'")?;
        let then_branch = self.parse_single_stmt()?;
        if self.eat_ident("else") {
            let else_branch = self.parse_single_stmt()?;
            Some(Stmt::if_then_else(cond, then_branch, else_branch, self.span_from(start_span)))
        } else {
            Some(Stmt::if_then(cond, then_branch, self.span_from(start_span)))
        }
    }

    fn parse_while_stmt(&mut self) -> Option<Stmt> {
        let start_span = to_ast_span(self.cur().span);
        self.advance(); // 'while'
        self.expect(&TokenKind::LParen, "'('")?;
        let cond = self.parse_expr()?;
        self.expect(&TokenKind::RParen, "')'")?;
        let body = self.parse_single_stmt()?;
        Some(Stmt::while_loop(cond, body, self.span_from(start_span)))
    }

    fn parse_for_stmt(&mut self) -> Option<Stmt> {
        let start_span = to_ast_span(self.cur().span);
        self.advance(); // 'for'
        self.expect(&TokenKind::LParen, "'('")?;
        let init = if self.check(&TokenKind::Semi) {
            self.advance();
            None
        } else if self.looks_like_decl() {
            let mut decls = self.parse_decl_stmt()?;
            decls.pop()
        } else {
            let e = self.parse_expr()?;
            self.expect(&TokenKind::Semi, "';'")?;
            let span = e.span;
            Some(Stmt::expr(e, span))
        };
        let cond = if self.check(&TokenKind::Semi) { None } else { Some(self.parse_expr()?) };
        self.expect(&TokenKind::Semi, "';'")?;
        let step = if self.check(&TokenKind::RParen) { None } else { Some(self.parse_expr()?) };
        self.expect(&TokenKind::RParen, "')'")?;
        let body = self.parse_single_stmt()?;
        Some(Stmt::for_loop(init, cond, step, body, self.span_from(start_span)))
    }

    fn parse_return_stmt(&mut self) -> Option<Stmt> {
        let start_span = to_ast_span(self.cur().span);
        self.advance(); // 'return'
        let value = if self.check(&TokenKind::Semi) { None } else { Some(self.parse_expr()?) };
        self.expect(&TokenKind::Semi, "';'")?;
        Some(Stmt::return_stmt(value, self.span_from(start_span)))
    }

    /// A sub-statement of `if`/`while`/`for`: either a brace block or a single
    /// statement, matching C's dangling-else-capable grammar.
    fn parse_single_stmt(&mut self) -> Option<Stmt> {
        self.parse_stmt()?.into_iter().next()
    }

    // ---- expressions (precedence climbing) ----

    fn parse_expr(&mut self) -> Option<Expr> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> Option<Expr> {
        let lhs = self.parse_logical_or()?;
        if self.eat(&TokenKind::Eq) {
            let rhs = self.parse_assignment()?;
            let span = AstSourceRange::new(lhs.span.file, lhs.span.start, rhs.span.end);
            return Some(Expr::assign(lhs, rhs, span));
        }
        Some(lhs)
    }

    fn parse_logical_or(&mut self) -> Option<Expr> {
        self.parse_binary_left(Self::parse_logical_and, &[(TokenKind::OrOr, BinaryOp::Or)])
    }

    fn parse_logical_and(&mut self) -> Option<Expr> {
        self.parse_binary_left(Self::parse_bit_or, &[(TokenKind::AndAnd, BinaryOp::And)])
    }

    fn parse_bit_or(&mut self) -> Option<Expr> {
        self.parse_binary_left(Self::parse_bit_xor, &[(TokenKind::Pipe, BinaryOp::BitOr)])
    }

    fn parse_bit_xor(&mut self) -> Option<Expr> {
        self.parse_binary_left(Self::parse_bit_and, &[(TokenKind::Caret, BinaryOp::BitXor)])
    }

    fn parse_bit_and(&mut self) -> Option<Expr> {
        self.parse_binary_left(Self::parse_equality, &[(TokenKind::Amp, BinaryOp::BitAnd)])
    }

    fn parse_equality(&mut self) -> Option<Expr> {
        self.parse_binary_left(
            Self::parse_relational,
            &[(TokenKind::EqEq, BinaryOp::Eq), (TokenKind::NotEq, BinaryOp::Ne)],
        )
    }

    fn parse_relational(&mut self) -> Option<Expr> {
        self.parse_binary_left(
            Self::parse_shift,
            &[
                (TokenKind::Lt, BinaryOp::Lt),
                (TokenKind::Le, BinaryOp::Le),
                (TokenKind::Gt, BinaryOp::Gt),
                (TokenKind::Ge, BinaryOp::Ge),
            ],
        )
    }

    fn parse_shift(&mut self) -> Option<Expr> {
        self.parse_binary_left(
            Self::parse_additive,
            &[(TokenKind::Shl, BinaryOp::Shl), (TokenKind::Shr, BinaryOp::Shr)],
        )
    }

    fn parse_additive(&mut self) -> Option<Expr> {
        self.parse_binary_left(
            Self::parse_multiplicative,
            &[(TokenKind::Plus, BinaryOp::Add), (TokenKind::Minus, BinaryOp::Sub)],
        )
    }

    fn parse_multiplicative(&mut self) -> Option<Expr> {
        self.parse_binary_left(
            Self::parse_unary,
            &[
                (TokenKind::Star, BinaryOp::Mul),
                (TokenKind::Slash, BinaryOp::Div),
                (TokenKind::Percent, BinaryOp::Mod),
            ],
        )
    }

    fn parse_binary_left(
        &mut self,
        mut next: impl FnMut(&mut Self) -> Option<Expr>,
        ops: &[(TokenKind, BinaryOp)],
    ) -> Option<Expr> {
        let mut lhs = next(self)?;
        loop {
            let Some((_, op)) = ops.iter().find(|(kind, _)| self.check(kind)) else { break };
            self.advance();
            let rhs = next(self)?;
            let span = AstSourceRange::new(lhs.span.file, lhs.span.start, rhs.span.end);
            lhs = Expr::binary(*op, lhs, rhs, span);
        }
        Some(lhs)
    }

    fn parse_unary(&mut self) -> Option<Expr> {
        let start_span = to_ast_span(self.cur().span);
        let op = match self.cur().kind {
            TokenKind::Amp => Some(UnaryOp::AddrOf),
            TokenKind::Star => Some(UnaryOp::Deref),
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Not => Some(UnaryOp::Not),
            TokenKind::Tilde => Some(UnaryOp::BitNot),
            TokenKind::PlusPlus => Some(UnaryOp::PreInc),
            TokenKind::MinusMinus => Some(UnaryOp::PreDec),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let operand = self.parse_unary()?;
            return Some(Expr::unary(op, operand, self.span_from(start_span)));
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Option<Expr> {
        let start_span = to_ast_span(self.cur().span);
        let mut expr = self.parse_primary()?;
        loop {
            if self.eat(&TokenKind::LBracket) {
                let index = self.parse_expr()?;
                self.expect(&TokenKind::RBracket, "']'")?;
                expr = Expr::subscript(expr, index, self.span_from(start_span));
            } else if self.check(&TokenKind::LParen) {
                if let Some(callee) = expr.as_ident().map(str::to_string) {
                    self.advance();
                    let args = self.parse_arg_list()?;
                    self.expect(&TokenKind::RParen, "')'")?;
                    expr = Expr::call(callee, args, self.span_from(start_span));
                } else {
                    break;
                }
            } else if self.eat(&TokenKind::PlusPlus) {
                expr = Expr::unary(UnaryOp::PostInc, expr, self.span_from(start_span));
            } else if self.eat(&TokenKind::MinusMinus) {
                expr = Expr::unary(UnaryOp::PostDec, expr, self.span_from(start_span));
            } else {
                break;
            }
        }
        Some(expr)
    }

    fn parse_arg_list(&mut self) -> Option<Vec<Expr>> {
        let mut args = Vec::new();
        if self.check(&TokenKind::RParen) {
            return Some(args);
        }
        loop {
            args.push(self.parse_assignment()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        Some(args)
    }

    fn parse_primary(&mut self) -> Option<Expr> {
        let span = to_ast_span(self.cur().span);
        match self.cur().kind.clone() {
            TokenKind::IntLit(v) => {
                self.advance();
                Some(Expr::int_literal(v, span))
            }
            TokenKind::FloatLit(v) => {
                self.advance();
                Some(Expr::float_literal(v, span))
            }
            TokenKind::Ident(name) => {
                self.advance();
                Some(Expr::ident(name, span))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(&TokenKind::RParen, "')'")?;
                Some(inner)
            }
            _ => {
                self.fatal_here("expected expression");
                None
            }
        }
    }
}

fn is_known_scalar_type(name: &str) -> bool {
    matches!(
        name,
        "void"
            | "bool"
            | "char"
            | "uchar"
            | "short"
            | "ushort"
            | "int"
            | "uint"
            | "long"
            | "ulong"
            | "float"
            | "double"
            | "half"
            | "size_t"
    ) || name.ends_with(['2', '3', '4', '8'])
        || name.ends_with("16")
}

fn to_ast_span(span: webclv_source::SourceRange) -> AstSourceRange {
    AstSourceRange::new(span.file, span.start, span.end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use webclv_source::FileId;

    fn parse(src: &str) -> (Option<TranslationUnit>, DiagnosticBag) {
        let mut diags = DiagnosticBag::new();
        let file = FileId::new(0);
        let tokens = Lexer::new(src, file).tokenize(&mut diags);
        let tu = Parser::new(tokens, file, &mut diags).parse_translation_unit();
        (tu, diags)
    }

    #[test]
    fn parses_empty_kernel() {
        let (tu, diags) = parse("__kernel void k(){}");
        assert!(!diags.has_fatal());
        let tu = tu.unwrap();
        assert_eq!(tu.functions.len(), 1);
        assert!(tu.functions[0].is_kernel);
        assert_eq!(tu.functions[0].name, "k");
    }

    #[test]
    fn parses_global_pointer_write() {
        let (tu, diags) = parse("__kernel void k(__global int *a){ a[get_global_id(0)] = 1; }");
        assert!(!diags.has_fatal());
        let tu = tu.unwrap();
        let f = &tu.functions[0];
        assert_eq!(f.params.len(), 1);
        assert!(f.params[0].is_pointer());
        assert_eq!(f.params[0].space, AddressSpace::Global);
    }

    #[test]
    fn parses_addressable_private_and_deref() {
        let (tu, diags) = parse("__kernel void k(){ int x=7; int *p=&x; *p=3; }");
        assert!(!diags.has_fatal(), "{diags:?}");
        assert_eq!(tu.unwrap().functions.len(), 1);
    }

    #[test]
    fn parses_constant_bounded_subscript() {
        let (tu, diags) = parse("__kernel void k(){ int a[4]; int i=0; a[i]=i; }");
        assert!(!diags.has_fatal());
        assert_eq!(tu.unwrap().functions.len(), 1);
    }

    #[test]
    fn rejects_garbage_with_fatal_diagnostic() {
        let (tu, diags) = parse("__kernel void k(}{");
        assert!(diags.has_fatal());
        assert!(tu.is_none());
    }
}
