//! C5: the single read-only traversal that populates translation-unit state
//! for the Transformer, by emitting one `AnalysisEvent` per fact the
//! rewriter will act on.

use rustc_hash::{FxHashMap, FxHashSet};
use webclv_ast::{AddressSpace, Expr, FunctionDecl, TranslationUnit, UnaryOp, VarDecl};

use crate::events::AnalysisEvent;
use crate::visitor::{walk_function, AstVisitor};

#[derive(Clone, Debug)]
struct Symbol {
    space: AddressSpace,
    is_pointer: bool,
    extent: Option<u64>,
    is_kernel_param: bool,
    element_type: String,
}

pub struct Analyser {
    events: Vec<AnalysisEvent>,
}

impl Analyser {
    #[must_use]
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    #[must_use]
    pub fn analyse(mut self, tu: &TranslationUnit) -> Vec<AnalysisEvent> {
        let needs_envelope = functions_needing_envelope(tu);
        let mut envelope_announced: FxHashSet<String> = FxHashSet::default();
        let function_spans: FxHashMap<String, webclv_source::SourceRange> =
            tu.functions.iter().map(|f| (f.name.clone(), f.span)).collect();

        for f in &tu.functions {
            let Some(body) = &f.body else { continue };
            let symbols = collect_symbols(f);
            let addressed = collect_addressed_names(body);
            let decls = collect_decls(body);

            if f.is_kernel {
                self.events.push(AnalysisEvent::KernelFound {
                    name: f.name.clone(),
                    span: f.span,
                });
            }

            for p in &f.params {
                if f.is_kernel && p.is_pointer() {
                    self.events.push(AnalysisEvent::KernelPointerParameter {
                        kernel_name: f.name.clone(),
                        param_name: p.name.clone(),
                        space: p.space,
                        param_span: p.span,
                    });
                }
            }

            for decl in &decls {
                if decl.is_static || addressed.contains(&decl.name) || decl.ty.is_array() {
                    self.events.push(AnalysisEvent::AddressableVariable {
                        name: decl.name.clone(),
                        ty: decl.ty.clone(),
                        init: decl.init.clone(),
                        space: decl.space,
                        span: decl.span,
                        owner: f.name.clone(),
                    });
                }
            }

            let mut emitter = EventEmitter {
                is_kernel: f.is_kernel,
                symbols: &symbols,
                needs_envelope: &needs_envelope,
                envelope_announced: &mut envelope_announced,
                function_spans: &function_spans,
                caller: f.name.clone(),
                events: &mut self.events,
            };
            emitter.visit_stmt(body);
        }

        self.events
    }
}

impl Default for Analyser {
    fn default() -> Self {
        Self::new()
    }
}

struct EventEmitter<'a> {
    is_kernel: bool,
    symbols: &'a FxHashMap<String, Symbol>,
    needs_envelope: &'a FxHashSet<String>,
    envelope_announced: &'a mut FxHashSet<String>,
    function_spans: &'a FxHashMap<String, webclv_source::SourceRange>,
    caller: String,
    events: &'a mut Vec<AnalysisEvent>,
}

impl AstVisitor for EventEmitter<'_> {
    fn visit_subscript(&mut self, base: &Expr, index: &Expr, whole: &Expr) {
        self.visit_expr(index);
        let Some(name) = base.as_ident() else {
            self.visit_expr(base);
            return;
        };
        let Some(sym) = self.symbols.get(name) else {
            return;
        };
        if self.is_kernel && sym.is_kernel_param {
            self.events.push(AnalysisEvent::SubscriptKernelParameter {
                param_name: name.to_string(),
                space: sym.space,
                index_span: index.span,
                whole_span: whole.span,
            });
            return;
        }
        if let Some(extent) = sym.extent {
            self.events.push(AnalysisEvent::SubscriptConstantIndex {
                array_name: name.to_string(),
                extent,
                index_span: index.span,
                whole_span: whole.span,
            });
            return;
        }
        if sym.is_pointer {
            self.events.push(AnalysisEvent::SubscriptGeneral {
                base_name: name.to_string(),
                space: sym.space,
                element_type: sym.element_type.clone(),
                index_span: index.span,
                whole_span: whole.span,
            });
        }
    }

    fn visit_unary(&mut self, op: UnaryOp, operand: &Expr, whole: &Expr) {
        if op == UnaryOp::Deref {
            if let Some(name) = operand.as_ident() {
                if let Some(sym) = self.symbols.get(name) {
                    if sym.is_pointer {
                        self.events.push(AnalysisEvent::PointerDereference {
                            pointer_name: name.to_string(),
                            space: sym.space,
                            element_type: sym.element_type.clone(),
                            whole_span: whole.span,
                        });
                        return;
                    }
                }
            }
        }
        self.visit_expr(operand);
    }

    fn visit_call(&mut self, callee: &str, args: &[Expr], whole: &Expr) {
        if self.needs_envelope.contains(callee) {
            if self.envelope_announced.insert(callee.to_string()) {
                let decl_span = self
                    .function_spans
                    .get(callee)
                    .copied()
                    .unwrap_or(whole.span);
                self.events.push(AnalysisEvent::FunctionTakesEnvelope {
                    function_name: callee.to_string(),
                    decl_span,
                });
            }
            self.events.push(AnalysisEvent::CallPassesEnvelope {
                caller: self.caller.clone(),
                callee: callee.to_string(),
                call_span: whole.span,
            });
        }
        for a in args {
            self.visit_expr(a);
        }
    }
}

fn collect_symbols(f: &FunctionDecl) -> FxHashMap<String, Symbol> {
    let mut symbols = FxHashMap::default();
    for p in &f.params {
        symbols.insert(
            p.name.clone(),
            Symbol {
                space: p.space,
                is_pointer: p.is_pointer(),
                extent: p.ty.array_extent(),
                is_kernel_param: true,
                element_type: p.ty.element_type_name().to_string(),
            },
        );
    }
    if let Some(body) = &f.body {
        for decl in collect_decls(body) {
            symbols.insert(
                decl.name.clone(),
                Symbol {
                    space: decl.space,
                    is_pointer: matches!(decl.ty, webclv_ast::Type::Pointer { .. }),
                    extent: decl.ty.array_extent(),
                    is_kernel_param: false,
                    element_type: decl.ty.element_type_name().to_string(),
                },
            );
        }
    }
    symbols
}

fn collect_decls(body: &webclv_ast::Stmt) -> Vec<VarDecl> {
    struct DeclCollector {
        found: Vec<VarDecl>,
    }
    impl AstVisitor for DeclCollector {
        fn visit_var_decl(&mut self, v: &VarDecl, _in_kernel: bool) {
            self.found.push(v.clone());
            if let Some(init) = &v.init {
                self.visit_expr(init);
            }
        }
    }
    let mut collector = DeclCollector { found: Vec::new() };
    collector.visit_stmt(body);
    collector.found
}

fn collect_addressed_names(body: &webclv_ast::Stmt) -> FxHashSet<String> {
    struct AddrCollector {
        found: FxHashSet<String>,
    }
    impl AstVisitor for AddrCollector {
        fn visit_unary(&mut self, op: UnaryOp, operand: &Expr, _whole: &Expr) {
            if op == UnaryOp::AddrOf {
                if let Some(name) = operand.as_ident() {
                    self.found.insert(name.to_string());
                    return;
                }
            }
            self.visit_expr(operand);
        }
    }
    let mut collector = AddrCollector {
        found: FxHashSet::default(),
    };
    collector.visit_stmt(body);
    collector.found
}

/// Non-kernel functions whose body dereferences or subscripts a pointer,
/// directly or transitively through a call to another such function, and so
/// must have the envelope threaded into their parameter list.
fn functions_needing_envelope(tu: &TranslationUnit) -> FxHashSet<String> {
    let local_names: FxHashSet<&str> = tu.functions.iter().map(|f| f.name.as_str()).collect();
    let mut direct: FxHashMap<String, bool> = FxHashMap::default();
    let mut call_edges: FxHashMap<String, Vec<String>> = FxHashMap::default();

    for f in &tu.functions {
        if f.is_kernel {
            continue;
        }
        let symbols = collect_symbols(f);
        let mut scanner = PointerUsageScanner {
            symbols: &symbols,
            local_names: &local_names,
            touches_pointer: false,
            calls: Vec::new(),
        };
        if let Some(body) = &f.body {
            scanner.visit_stmt(body);
        }
        direct.insert(f.name.clone(), scanner.touches_pointer);
        call_edges.insert(f.name.clone(), scanner.calls);
    }

    let mut needs: FxHashSet<String> = direct
        .iter()
        .filter(|(_, &touches)| touches)
        .map(|(name, _)| name.clone())
        .collect();

    loop {
        let mut changed = false;
        for (name, callees) in &call_edges {
            if needs.contains(name) {
                continue;
            }
            if callees.iter().any(|c| needs.contains(c)) {
                needs.insert(name.clone());
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
    needs
}

struct PointerUsageScanner<'a> {
    symbols: &'a FxHashMap<String, Symbol>,
    local_names: &'a FxHashSet<&'a str>,
    touches_pointer: bool,
    calls: Vec<String>,
}

impl AstVisitor for PointerUsageScanner<'_> {
    fn visit_subscript(&mut self, base: &Expr, index: &Expr, _whole: &Expr) {
        if let Some(name) = base.as_ident() {
            if self.symbols.get(name).is_some_and(|s| s.is_pointer) {
                self.touches_pointer = true;
            }
        }
        self.visit_expr(index);
    }

    fn visit_unary(&mut self, op: UnaryOp, operand: &Expr, _whole: &Expr) {
        if op == UnaryOp::Deref {
            if let Some(name) = operand.as_ident() {
                if self.symbols.get(name).is_some_and(|s| s.is_pointer) {
                    self.touches_pointer = true;
                }
            }
        }
        self.visit_expr(operand);
    }

    fn visit_call(&mut self, callee: &str, args: &[Expr], _whole: &Expr) {
        if self.local_names.contains(callee) {
            self.calls.push(callee.to_string());
        }
        for a in args {
            self.visit_expr(a);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use webclv_lex::parse_translation_unit;
    use webclv_source::{DiagnosticBag, FileId};

    fn parse(src: &str) -> TranslationUnit {
        let mut diagnostics = DiagnosticBag::new();
        parse_translation_unit(src, FileId::new(0), &mut diagnostics).expect("parses")
    }

    #[test]
    fn kernel_and_pointer_parameter_are_reported() {
        let tu = parse("__kernel void k(__global int* a) { a[0] = 1; }");
        let events = Analyser::new().analyse(&tu);
        assert!(events
            .iter()
            .any(|e| matches!(e, AnalysisEvent::KernelFound { name, .. } if name == "k")));
        assert!(events
            .iter()
            .any(|e| matches!(e, AnalysisEvent::KernelPointerParameter { param_name, .. } if param_name == "a")));
    }

    #[test]
    fn constant_index_subscript_is_classified_separately_from_general() {
        let tu = parse("__kernel void k(__global int* a) { int b[4]; b[2] = a[0]; }");
        let events = Analyser::new().analyse(&tu);
        assert!(events
            .iter()
            .any(|e| matches!(e, AnalysisEvent::SubscriptConstantIndex { extent: 4, .. })));
        assert!(events
            .iter()
            .any(|e| matches!(e, AnalysisEvent::SubscriptKernelParameter { param_name, .. } if param_name == "a")));
    }

    #[test]
    fn address_taken_local_is_addressable() {
        let tu = parse("__kernel void k() { int x; int* p = &x; }");
        let events = Analyser::new().analyse(&tu);
        assert!(events
            .iter()
            .any(|e| matches!(e, AnalysisEvent::AddressableVariable { name, .. } if name == "x")));
    }

    #[test]
    fn callee_touching_a_pointer_gets_the_envelope() {
        let tu = parse("void helper(__global int* p) { *p = 1; } __kernel void k(__global int* a) { helper(a); }");
        let events = Analyser::new().analyse(&tu);
        assert!(events
            .iter()
            .any(|e| matches!(e, AnalysisEvent::FunctionTakesEnvelope { function_name, .. } if function_name == "helper")));
        assert!(events
            .iter()
            .any(|e| matches!(e, AnalysisEvent::CallPassesEnvelope { callee, .. } if callee == "helper")));
    }
}
