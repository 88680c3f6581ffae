use thiserror::Error;

/// Validator errors, composed from each sub-crate's own error type
/// (section 10.4).
#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Source(#[from] webclv_source::SourceError),
    #[error(transparent)]
    Xform(#[from] webclv_xform::XformError),
    #[error("{0}")]
    Diagnostics(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
