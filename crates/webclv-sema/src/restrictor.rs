//! C4: a read-only traversal verifying the rules a kernel must satisfy
//! before instrumentation, fatal on the first violation per rule.
//!
//! Function-pointer declarations, variadic parameter lists, and `goto` are
//! not representable by the host front end's grammar at all, so those three
//! rules are enforced structurally by parse failure rather than checked
//! here; see the design ledger.

use rustc_hash::{FxHashMap, FxHashSet};
use webclv_ast::{AddressSpace, Expr, FunctionDecl, TranslationUnit, Type};
use webclv_source::{DiagnosticBag, Kind, SourceManager};

use crate::builtins::BuiltinRegistry;
use crate::visitor::{walk_function, AstVisitor};

pub struct Restrictor<'a> {
    builtins: &'a BuiltinRegistry,
    diagnostics: &'a mut DiagnosticBag,
    current_function: String,
}

impl<'a> Restrictor<'a> {
    #[must_use]
    pub fn new(builtins: &'a BuiltinRegistry, diagnostics: &'a mut DiagnosticBag) -> Self {
        Self {
            builtins,
            diagnostics,
            current_function: String::new(),
        }
    }

    /// Runs both the builtin/cast checks and recursion detection over `tu`.
    /// Returns `false` if a fatal violation was reported.
    pub fn check(&mut self, tu: &TranslationUnit) -> bool {
        for f in &tu.functions {
            self.current_function = f.name.clone();
            self.visit_function(f);
        }
        if let Some(cycle) = find_recursion(tu) {
            self.diagnostics.fatal(
                Kind::Validation,
                format!("recursion is not supported: {}", cycle.join(" -> ")),
                None,
            );
        }
        !self.diagnostics.has_fatal()
    }
}

impl AstVisitor for Restrictor<'_> {
    fn visit_function(&mut self, f: &FunctionDecl) {
        self.current_function = f.name.clone();
        walk_function(self, f);
    }

    fn visit_call(&mut self, callee: &str, args: &[Expr], whole: &Expr) {
        if self.builtins.is_unsupported(callee) {
            self.diagnostics.fatal(
                Kind::Validation,
                format!("call to unsupported builtin '{callee}'"),
                Some(whole.span.start_loc()),
            );
        } else if self.builtins.is_unsafe(callee) {
            self.diagnostics.warning(
                Kind::BuiltinAdvisory,
                format!("call to '{callee}' is not checked for memory safety"),
                Some(whole.span.start_loc()),
            );
        }
        for a in args {
            self.visit_expr(a);
        }
    }

    fn visit_expr(&mut self, e: &Expr) {
        if let webclv_ast::ExprKind::Cast { ty, operand } = &e.kind {
            if let (Some(from), Some(to)) = (pointee_space(operand_type_hint(operand)), ty.as_pointer_space()) {
                if from != to {
                    self.diagnostics.fatal(
                        Kind::Validation,
                        format!("pointer cast between incompatible address spaces ({from:?} to {to:?})"),
                        Some(e.span.start_loc()),
                    );
                }
            }
            self.visit_expr(operand);
            return;
        }
        crate::visitor::walk_expr(self, e);
    }
}

/// The host front end does not track inferred expression types, so a cast's
/// source address space is only known when the operand is itself a cast or
/// an address-of expression; other operands yield `None` and the check is
/// skipped rather than guessed at.
fn operand_type_hint(operand: &Expr) -> Option<&Type> {
    match &operand.kind {
        webclv_ast::ExprKind::Cast { ty, .. } => Some(ty),
        _ => None,
    }
}

fn pointee_space(ty: Option<&Type>) -> Option<AddressSpace> {
    ty.and_then(Type::as_pointer_space)
}

/// Builds the local call graph (edges only to names matching a function
/// declared in this translation unit) and returns the first cycle found, as
/// the chain of function names that closes it.
fn find_recursion(tu: &TranslationUnit) -> Option<Vec<String>> {
    let local_names: FxHashSet<&str> = tu.functions.iter().map(|f| f.name.as_str()).collect();
    let mut graph: FxHashMap<&str, Vec<&str>> = FxHashMap::default();
    for f in &tu.functions {
        let callees = collect_local_calls(f, &local_names);
        graph.insert(f.name.as_str(), callees);
    }

    for start in tu.functions.iter().map(|f| f.name.as_str()) {
        let mut stack = vec![start];
        let mut on_stack = vec![start];
        if let Some(cycle) = dfs(start, &graph, &mut stack, &mut on_stack) {
            return Some(cycle);
        }
    }
    None
}

fn dfs<'a>(
    node: &'a str,
    graph: &FxHashMap<&'a str, Vec<&'a str>>,
    stack: &mut Vec<&'a str>,
    on_stack: &mut Vec<&'a str>,
) -> Option<Vec<String>> {
    let Some(callees) = graph.get(node) else {
        return None;
    };
    for &callee in callees {
        if on_stack.contains(&callee) {
            let start = stack.iter().position(|&n| n == callee).unwrap_or(0);
            let mut cycle: Vec<String> = stack[start..].iter().map(|s| (*s).to_string()).collect();
            cycle.push(callee.to_string());
            return Some(cycle);
        }
        stack.push(callee);
        on_stack.push(callee);
        if let Some(cycle) = dfs(callee, graph, stack, on_stack) {
            return Some(cycle);
        }
        stack.pop();
        on_stack.pop();
    }
    None
}

fn collect_local_calls<'a>(f: &FunctionDecl, local_names: &FxHashSet<&'a str>) -> Vec<&'a str> {
    struct CallCollector<'s> {
        local_names: &'s FxHashSet<&'s str>,
        found: Vec<&'s str>,
    }
    impl<'s> AstVisitor for CallCollector<'s> {
        fn visit_call(&mut self, callee: &str, args: &[Expr], _whole: &Expr) {
            if let Some(&name) = self.local_names.get(callee) {
                self.found.push(name);
            }
            for a in args {
                self.visit_expr(a);
            }
        }
    }
    let mut collector = CallCollector {
        local_names,
        found: Vec::new(),
    };
    walk_function(&mut collector, f);
    collector.found
}

/// Renders accumulated diagnostics against `sources`, for callers that want
/// the formatted text rather than the raw bag (used by the CLI and tests).
#[must_use]
pub fn render_all(diagnostics: &DiagnosticBag, sources: &SourceManager) -> Vec<String> {
    diagnostics.iter().map(|d| d.render(sources)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use webclv_lex::parse_translation_unit;
    use webclv_source::FileId;

    fn parse(src: &str) -> (Option<TranslationUnit>, DiagnosticBag) {
        let mut diagnostics = DiagnosticBag::new();
        let tu = parse_translation_unit(src, FileId::new(0), &mut diagnostics);
        (tu, diagnostics)
    }

    #[test]
    fn direct_recursion_is_rejected() {
        let (tu, mut diagnostics) = parse("void f(int n) { f(n); }");
        let tu = tu.expect("parses");
        let builtins = BuiltinRegistry::new();
        let mut restrictor = Restrictor::new(&builtins, &mut diagnostics);
        assert!(!restrictor.check(&tu));
    }

    #[test]
    fn indirect_recursion_is_rejected() {
        let (tu, mut diagnostics) = parse("void g(int n); void f(int n) { g(n); } void g(int n) { f(n); }");
        let tu = tu.expect("parses");
        let builtins = BuiltinRegistry::new();
        let mut restrictor = Restrictor::new(&builtins, &mut diagnostics);
        assert!(!restrictor.check(&tu));
    }

    #[test]
    fn unsupported_builtin_call_is_fatal() {
        let (tu, mut diagnostics) =
            parse("__kernel void k(__global int* a) { prefetch(a, 1); }");
        let tu = tu.expect("parses");
        let builtins = BuiltinRegistry::new();
        let mut restrictor = Restrictor::new(&builtins, &mut diagnostics);
        assert!(!restrictor.check(&tu));
    }

    #[test]
    fn unsafe_builtin_call_warns_but_does_not_fail() {
        let (tu, mut diagnostics) = parse("__kernel void k() { sincos(1, 1); }");
        let tu = tu.expect("parses");
        let builtins = BuiltinRegistry::new();
        let mut restrictor = Restrictor::new(&builtins, &mut diagnostics);
        assert!(restrictor.check(&tu));
        assert!(!diagnostics.is_empty());
    }

    #[test]
    fn ordinary_kernel_passes_clean() {
        let (tu, mut diagnostics) = parse("__kernel void k(__global int* a) { a[0] = 1; }");
        let tu = tu.expect("parses");
        let builtins = BuiltinRegistry::new();
        let mut restrictor = Restrictor::new(&builtins, &mut diagnostics);
        assert!(restrictor.check(&tu));
        assert!(diagnostics.is_empty());
    }
}
