//! Configuration (C1), the Transformation Registry (C6), the Transformer
//! (C7), the Text Rewriter (C8), and the Printer (C9): everything that turns
//! an Analyser event stream into instrumented OpenCL C text.

mod config;
mod error;
mod printer;
mod prologue;
mod registry;
mod rewriter;
mod transformer;

pub use config::{CheckerKind, ValidatorConfig};
pub use error::{Result, XformError};
pub use registry::TransformationRegistry;
pub use rewriter::TextRewriter;
pub use transformer::Transformer;
