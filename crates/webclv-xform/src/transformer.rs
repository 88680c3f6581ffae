//! Transformer (C7): consumes the Analyser's event stream plus the original
//! tree and schedules every rewrite into a `TransformationRegistry`, then
//! synthesizes the file-start and kernel-start prologues (component design
//! 4.6).

use std::collections::{BTreeMap, BTreeSet};

use rustc_hash::FxHashMap;
use webclv_ast::{AddressSpace, ExprKind, TranslationUnit, UnaryOp};
use webclv_sema::{walk_translation_unit, AnalysisEvent, AstVisitor};
use webclv_source::{SourceLocation, SourceManager, SourceRange};

use crate::config::{CheckerKind, ValidatorConfig};
use crate::error::XformError;
use crate::printer;
use crate::prologue::{self, RelocatedVar};
use crate::registry::TransformationRegistry;

const PROLOGUE_PRIORITY: i32 = -20;
const KERNEL_PROLOGUE_PRIORITY: i32 = -10;
const PARAM_PRIORITY: i32 = 0;
const REWRITE_PRIORITY: i32 = 10;
const REMOVE_PRIORITY: i32 = 20;

struct OwnedRelocatedVar {
    owner: String,
    var: RelocatedVar,
}

/// Schedules every rewrite the event stream calls for, then renders the
/// instrumented translation unit.
pub struct Transformer<'a> {
    config: &'a ValidatorConfig,
    sources: &'a SourceManager,
    registry: TransformationRegistry,
    relocated: BTreeMap<AddressSpace, Vec<OwnedRelocatedVar>>,
    relocated_space_of: FxHashMap<String, AddressSpace>,
    checked_pointer_types: BTreeSet<(AddressSpace, String)>,
    checked_index_types: BTreeSet<(AddressSpace, String)>,
}

impl<'a> Transformer<'a> {
    #[must_use]
    pub fn new(config: &'a ValidatorConfig, sources: &'a SourceManager) -> Self {
        Self {
            config,
            sources,
            registry: TransformationRegistry::new(),
            relocated: BTreeMap::new(),
            relocated_space_of: FxHashMap::default(),
            checked_pointer_types: BTreeSet::new(),
            checked_index_types: BTreeSet::new(),
        }
    }

    /// Run the full C7 -> C6 -> C8 -> C9 pipeline and return the
    /// instrumented text, banner included.
    pub fn run(mut self, tu: &TranslationUnit, events: &[AnalysisEvent]) -> Result<String, XformError> {
        for event in events {
            self.process_event(event)?;
        }
        self.schedule_addr_of_rewrites(tu);
        self.schedule_kernel_prologues(tu);
        self.schedule_file_prologue(tu);

        printer::emit(self.sources, tu.file, self.registry)
    }

    fn process_event(&mut self, event: &AnalysisEvent) -> Result<(), XformError> {
        match event {
            AnalysisEvent::KernelFound { .. } => {}

            AnalysisEvent::AddressableVariable { name, ty, init, space, span, owner } => {
                let init_text = init
                    .as_ref()
                    .filter(|e| e.is_constant())
                    .map(|e| self.sources.text_of(e.span).to_string());
                self.relocated.entry(*space).or_default().push(OwnedRelocatedVar {
                    owner: owner.clone(),
                    var: RelocatedVar {
                        name: name.clone(),
                        ty: ty.clone(),
                        init_text,
                    },
                });
                self.relocated_space_of.insert(name.clone(), *space);
                self.registry
                    .schedule_remove(*span, REMOVE_PRIORITY, Some(&format!("decl::{name}")));
            }

            AnalysisEvent::KernelPointerParameter { param_name, param_span, .. } => {
                let size_name = self.config.size_param_name(param_name);
                self.registry.schedule_insert_after(
                    param_span.end_loc(),
                    PARAM_PRIORITY,
                    format!(", size_t {size_name}"),
                    Some(&format!("kparam::{param_name}")),
                );
            }

            AnalysisEvent::FunctionTakesEnvelope { decl_span, .. } => {
                let (loc, empty) = self.paren_insertion(*decl_span)?;
                let envelope_ty = self.config.envelope_type_name();
                let envelope_instance = self.config.envelope_instance_name();
                let text = if empty {
                    format!("const struct {envelope_ty}* {envelope_instance}")
                } else {
                    format!("const struct {envelope_ty}* {envelope_instance}, ")
                };
                self.registry.schedule_insert_before(loc, PARAM_PRIORITY, text, None);
            }

            AnalysisEvent::CallPassesEnvelope { call_span, .. } => {
                let (loc, empty) = self.paren_insertion(*call_span)?;
                let envelope_instance = self.config.envelope_instance_name();
                let text = if empty { envelope_instance } else { format!("{envelope_instance}, ") };
                self.registry.schedule_insert_before(loc, PARAM_PRIORITY, text, None);
            }

            AnalysisEvent::SubscriptConstantIndex { array_name, extent, index_span, whole_span } => {
                let index_text = self.sources.text_of(*index_span);
                let base_text = self.base_text(array_name);
                let text = format!("{base_text}[({index_text}) % {extent}]");
                self.registry.schedule_replace(*whole_span, REWRITE_PRIORITY, text, None);
            }

            AnalysisEvent::SubscriptKernelParameter { param_name, index_span, whole_span, .. } => {
                let size_name = self.config.size_param_name(param_name);
                let index_text = self.sources.text_of(*index_span);
                let text = format!("{param_name}[{size_name} == 0 ? 0 : ({index_text}) % {size_name}]");
                self.registry.schedule_replace(*whole_span, REWRITE_PRIORITY, text, None);
            }

            AnalysisEvent::SubscriptGeneral { base_name, space, element_type, index_span, whole_span } => {
                self.checked_index_types.insert((*space, element_type.clone()));
                let checker = self.config.checker_name(CheckerKind::Idx, *space, element_type);
                let base_text = self.base_text(base_name);
                let index_text = self.sources.text_of(*index_span);
                let envelope = self.config.envelope_instance_name();
                let text = format!("{base_text}[{checker}({envelope}, {base_text}, {index_text})]");
                self.registry.schedule_replace(*whole_span, REWRITE_PRIORITY, text, None);
            }

            AnalysisEvent::PointerDereference { pointer_name, space, element_type, whole_span } => {
                self.checked_pointer_types.insert((*space, element_type.clone()));
                let checker = self.config.checker_name(CheckerKind::Ptr, *space, element_type);
                let base_text = self.base_text(pointer_name);
                let envelope = self.config.envelope_instance_name();
                let text = format!("*{checker}({envelope}, {base_text})");
                self.registry.schedule_replace(*whole_span, REWRITE_PRIORITY, text, None);
            }
        }
        Ok(())
    }

    /// The text a relocated variable's bare name must be replaced with
    /// everywhere it is still used as an array/pointer base; unrelocated
    /// names pass through untouched.
    fn base_text(&self, name: &str) -> String {
        match self.relocated_space_of.get(name) {
            Some(space) => format!("{}.{}", self.config.record_instance_name(*space), self.config.relocated_field_name(name)),
            None => name.to_string(),
        }
    }

    /// Locates the first `'('` in a declaration or call's own text and
    /// reports whether its parameter/argument list is empty, so the caller
    /// knows whether the inserted text needs a trailing separator.
    fn paren_insertion(&self, range: SourceRange) -> Result<(SourceLocation, bool), XformError> {
        let text = self.sources.text_of(range);
        let idx = text.find('(').ok_or_else(|| XformError::MissingLocation {
            what: format!("opening '(' in {range:?}"),
        })?;
        let after = &text[idx + 1..];
        let empty = after.trim_start().starts_with(')');
        Ok((SourceLocation::new(range.file, range.start + idx as u32 + 1), empty))
    }

    /// A second, independent walk over the whole tree: every `&name` where
    /// `name` was relocated becomes `&record.field`. Not covered by any
    /// Analyser event because the only access that needs rewriting for an
    /// addressable scalar is the address-of itself; everything downstream
    /// goes through the resulting pointer and is covered by
    /// `PointerDereference`/subscript events instead.
    fn schedule_addr_of_rewrites(&mut self, tu: &TranslationUnit) {
        let mut rewriter = AddrOfRewriter {
            relocated_space_of: &self.relocated_space_of,
            config: self.config,
            registry: &mut self.registry,
        };
        walk_translation_unit(&mut rewriter, tu);
    }

    fn schedule_kernel_prologues(&mut self, tu: &TranslationUnit) {
        for kernel in tu.kernels() {
            let Some(start) = kernel.body.as_ref().and_then(webclv_ast::Stmt::body_start) else {
                continue;
            };
            let loc = SourceLocation::new(tu.file, start);
            let mut text = String::new();
            let mut populated = Vec::new();

            for space in AddressSpace::all() {
                let Some(vars) = self.relocated.get(&space) else { continue };
                let owned: Vec<&OwnedRelocatedVar> = vars.iter().filter(|v| v.owner == kernel.name).collect();
                if owned.is_empty() {
                    continue;
                }
                populated.push(space);
                let record_ty = self.config.record_type_name(space);
                let record_instance = self.config.record_instance_name(space);
                let fields = owned
                    .iter()
                    .map(|v| {
                        let field = self.config.relocated_field_name(&v.var.name);
                        let value = v.var.init_text.clone().unwrap_or_else(|| v.var.ty.zero_initializer().to_string());
                        format!(".{field} = {value}")
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                text.push_str(&format!("struct {record_ty} {record_instance} = {{ {fields} }};\n"));
            }

            // Every checker call site treats the envelope name as a pointer,
            // whether it arrives as a threaded parameter (helpers) or is
            // constructed locally (kernels); store the kernel's own
            // envelope value under a private name and alias the pointer
            // checker calls actually use to it.
            let envelope_ty = self.config.envelope_type_name();
            let envelope_instance = self.config.envelope_instance_name();
            let envelope_storage = format!("{envelope_instance}_storage");
            let field_values = AddressSpace::all()
                .into_iter()
                .map(|space| {
                    if populated.contains(&space) {
                        format!("&{}", self.config.record_instance_name(space))
                    } else {
                        "0".to_string()
                    }
                })
                .collect::<Vec<_>>()
                .join(", ");
            text.push_str(&format!("struct {envelope_ty} {envelope_storage} = {{ {field_values} }};\n"));
            text.push_str(&format!("const struct {envelope_ty} *{envelope_instance} = &{envelope_storage};\n"));

            self.registry.schedule_insert_before(loc, KERNEL_PROLOGUE_PRIORITY, text, None);
        }
    }

    fn schedule_file_prologue(&mut self, tu: &TranslationUnit) {
        let relocated: BTreeMap<AddressSpace, Vec<RelocatedVar>> = self
            .relocated
            .iter()
            .map(|(space, vars)| (*space, vars.iter().map(|v| clone_relocated(&v.var)).collect()))
            .collect();
        let checked_pointer_types: Vec<_> = self.checked_pointer_types.iter().cloned().collect();
        let checked_index_types: Vec<_> = self.checked_index_types.iter().cloned().collect();
        let text = prologue::render(self.config, &relocated, &checked_pointer_types, &checked_index_types);
        let loc = self.sources.start_of(tu.file);
        self.registry.schedule_insert_before(loc, PROLOGUE_PRIORITY, text, None);
    }
}

fn clone_relocated(v: &RelocatedVar) -> RelocatedVar {
    RelocatedVar {
        name: v.name.clone(),
        ty: v.ty.clone(),
        init_text: v.init_text.clone(),
    }
}

struct AddrOfRewriter<'a> {
    relocated_space_of: &'a FxHashMap<String, AddressSpace>,
    config: &'a ValidatorConfig,
    registry: &'a mut TransformationRegistry,
}

impl AstVisitor for AddrOfRewriter<'_> {
    fn visit_unary(&mut self, op: UnaryOp, operand: &webclv_ast::Expr, whole: &webclv_ast::Expr) {
        if op == UnaryOp::AddrOf {
            if let ExprKind::Ident(name) = &operand.kind {
                if let Some(space) = self.relocated_space_of.get(name) {
                    let text = format!(
                        "&{}.{}",
                        self.config.record_instance_name(*space),
                        self.config.relocated_field_name(name)
                    );
                    self.registry.schedule_replace(whole.span, REWRITE_PRIORITY, text, None);
                    return;
                }
            }
        }
        webclv_sema::walk_expr(self, operand);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use webclv_lex::parse_translation_unit;
    use webclv_sema::{Analyser, BuiltinRegistry, Restrictor};
    use webclv_source::{DiagnosticBag, SourceManager};

    fn transform(source: &str) -> String {
        let mut mgr = SourceManager::new();
        let file = mgr.add_text(PathBuf::from("k.cl"), source.to_string(), true);
        let mut diags = DiagnosticBag::new();
        let tu = parse_translation_unit(source, file, &mut diags).expect("parses");
        let builtins = BuiltinRegistry::new();
        let mut restrictor_diags = DiagnosticBag::new();
        let mut restrictor = Restrictor::new(&builtins, &mut restrictor_diags);
        assert!(restrictor.check(&tu));

        let events = Analyser::new().analyse(&tu);
        let config = ValidatorConfig::new();
        Transformer::new(&config, &mgr).run(&tu, &events).expect("renders")
    }

    #[test]
    fn relocates_addressed_local_and_rewrites_its_deref() {
        let out = transform("__kernel void k() { int x = 7; int *p = &x; *p = 3; }");
        assert!(out.contains("struct wcl_private_record"));
        assert!(out.contains(".wcl_x = 7"));
        assert!(out.contains("&wcl_privates.wcl_x"));
        assert!(out.contains("wcl_private_int_ptr"));
    }

    #[test]
    fn constant_index_subscript_clamps_inline() {
        let out = transform("__kernel void k() { int a[4]; a[2] = 1; }");
        assert!(out.contains("[(2) % 4]"));
    }

    #[test]
    fn kernel_pointer_parameter_gains_a_size_parameter_and_clamp() {
        let out = transform("__kernel void k(__global int *buf, int i) { buf[i] = 0; }");
        assert!(out.contains("size_t wcl_buf_size"));
        assert!(out.contains("wcl_buf_size == 0 ? 0 : (i) % wcl_buf_size"));
    }

    #[test]
    fn banner_free_prologue_still_carries_fixed_macros() {
        let out = transform("__kernel void k() { }");
        assert!(out.contains("WCL_PTR_CHECKER"));
        assert!(!out.contains("wcl_private_record"));
    }
}
