//! CLI definitions and argument types.

use std::path::PathBuf;

use clap::Parser;

/// Exit code for success.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code for a setup/input failure (bad arguments, unreadable file, wrong language kind).
pub const EXIT_SETUP_FAILURE: i32 = 1;
/// Exit code for a validation failure (the Restrictor rejected the input).
pub const EXIT_VALIDATION_FAILURE: i32 = 2;
/// Exit code for an internal rewrite failure.
pub const EXIT_REWRITE_FAILURE: i32 = 3;

#[derive(Parser)]
#[command(name = "webclv")]
#[command(about = "WebCL Validator - instruments OpenCL C kernels with memory-safety bounds checks")]
#[command(version)]
pub struct Cli {
    /// Input OpenCL C source file
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Write the instrumented output here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Force the input to be treated as OpenCL C regardless of its extension
    /// (mirrors the `-x cl` front-end flag)
    #[arg(short = 'x', long = "language", value_name = "cl")]
    pub language: Option<String>,

    /// Additional include search path, forwarded to the host parser
    /// (accepted for forward compatibility; the hand-rolled front end does
    /// not yet implement preprocessing)
    #[arg(short = 'I', long = "include", value_name = "DIR")]
    pub include: Vec<PathBuf>,

    /// Preprocessor macro definition, forwarded to the host parser
    /// (accepted for forward compatibility; see `--include`)
    #[arg(short = 'D', value_name = "NAME[=VALUE]")]
    pub define: Vec<String>,

    /// Escalate unsafe-builtin warnings to fatal diagnostics
    #[arg(long)]
    pub strict: bool,

    /// Override the generated-identifier prefix (default "wcl")
    #[arg(long, default_value = "wcl")]
    pub prefix: String,

    /// Enable verbose output (sets RUST_LOG=debug)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    #[must_use]
    pub fn force_opencl(&self) -> bool {
        matches!(self.language.as_deref(), Some("cl"))
    }
}
