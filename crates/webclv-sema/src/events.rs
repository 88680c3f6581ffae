//! The event stream C5's traversal emits, consumed by the Transformer (C7).
//! One variant per event kind listed for the Analyser in the component
//! design: kernels, addressable variables, the three subscript shapes,
//! pointer dereferences, envelope-threading points, and kernel pointer
//! parameters.

use webclv_ast::{AddressSpace, Expr, Type};
use webclv_source::SourceRange;

#[derive(Clone, Debug)]
pub enum AnalysisEvent {
    /// A `__kernel`-qualified function was found.
    KernelFound { name: String, span: SourceRange },

    /// A variable whose address is taken, or that is a `static` local, and
    /// so must be relocated into its address space's record.
    AddressableVariable {
        name: String,
        ty: Type,
        init: Option<Expr>,
        space: AddressSpace,
        span: SourceRange,
        /// The function whose scope the variable is relocated out of; the
        /// Transformer needs this to know which kernel's prologue should
        /// construct the record it ends up in.
        owner: String,
    },

    /// `arr[i]` where `i` is a compile-time-constant integer literal: clamp
    /// at rewrite time with `% extent`, no checker call needed.
    SubscriptConstantIndex {
        array_name: String,
        extent: u64,
        index_span: SourceRange,
        whole_span: SourceRange,
    },

    /// `arr[i]` where `arr` is a kernel parameter of array/pointer type and
    /// the extent is only known at the kernel's own call boundary.
    SubscriptKernelParameter {
        param_name: String,
        space: AddressSpace,
        index_span: SourceRange,
        whole_span: SourceRange,
    },

    /// Any other subscript on a pointer: routed through a generated index
    /// checker call.
    SubscriptGeneral {
        base_name: String,
        space: AddressSpace,
        element_type: String,
        index_span: SourceRange,
        whole_span: SourceRange,
    },

    /// `*p` or a bare pointer read/write not covered by a subscript: routed
    /// through a generated pointer checker call.
    PointerDereference {
        pointer_name: String,
        space: AddressSpace,
        element_type: String,
        whole_span: SourceRange,
    },

    /// A function (not the kernel entry point) that needs the envelope
    /// threaded into its parameter list, because its body touches a pointer.
    FunctionTakesEnvelope { function_name: String, decl_span: SourceRange },

    /// A call site that must be rewritten to pass the envelope through.
    CallPassesEnvelope { caller: String, callee: String, call_span: SourceRange },

    /// A kernel parameter of pointer type: source of one envelope field.
    KernelPointerParameter {
        kernel_name: String,
        param_name: String,
        space: AddressSpace,
        param_span: SourceRange,
    },
}
