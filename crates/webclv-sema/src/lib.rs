//! Builtin classification (C2), the Restrictor (C4), and the Analyser (C5):
//! the two read-only translation-unit passes that run after parsing and
//! before any text is rewritten.

mod analyser;
mod builtins;
mod events;
mod restrictor;
mod visitor;

pub use analyser::Analyser;
pub use builtins::BuiltinRegistry;
pub use events::AnalysisEvent;
pub use restrictor::{render_all, Restrictor};
pub use visitor::{walk_expr, walk_function, walk_stmt, walk_translation_unit, AstVisitor};
