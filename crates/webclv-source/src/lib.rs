//! Source file loading, location tracking, and diagnostics for the WebCL validator.

mod diagnostics;
mod file;
mod location;
mod manager;

pub use diagnostics::*;
pub use file::*;
pub use location::*;
pub use manager::*;

use thiserror::Error;

/// Errors that can occur before or while loading a source file (section 7: setup/input).
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("cannot read source file '{path}': {source}")]
    CannotRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, SourceError>;
