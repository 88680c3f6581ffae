//! Rewrite-stage errors (section 7 kind "rewrite": internal inconsistency
//! that makes the partially rewritten output unsafe to emit).

use thiserror::Error;
use webclv_source::FileId;

#[derive(Error, Debug)]
pub enum XformError {
    #[error("scheduled edits overlap in file {file:?}")]
    OverlappingEdits { file: FileId },

    #[error("source buffer for file {file:?} is not valid UTF-8")]
    InvalidUtf8 { file: FileId },

    #[error("could not locate a source range for {what}")]
    MissingLocation { what: String },
}

pub type Result<T> = std::result::Result<T, XformError>;
