//! Driver API example.
//!
//! Demonstrates the lower-level stages the Driver runs in sequence, for
//! callers that want to inspect the Restrictor's verdict or the Analyser's
//! event stream before the Transformer rewrites anything.
//!
//! # Stages
//!
//! ```text
//! source text
//!     |
//!     v
//! parse_translation_unit()   lex + recursive-descent parse -> AST
//!     |
//!     v
//! Restrictor::check()        reject recursion/unsupported builtins/bad casts
//!     |
//!     v
//! Analyser::analyse()        emit kernel/addressable-variable/subscript events
//!     |
//!     v
//! Transformer::run()         schedule rewrites, emit prologue, print text
//! ```
//!
//! # Usage
//!
//! ```bash
//! cargo run --example driver_api -- path/to/kernel.cl
//! ```

use std::path::PathBuf;

use webclv::{Analyser, BuiltinRegistry, DiagnosticBag, Restrictor, SourceManager, Transformer, ValidatorConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <kernel.cl>", args[0]);
        std::process::exit(1);
    }
    let input = PathBuf::from(&args[1]);

    println!("=== Stage 1: Load source ===");
    let mut sources = SourceManager::new();
    let file = sources.load_file(&input, false)?;
    println!("File: {}", sources.file(file).display_name());

    println!("\n=== Stage 2: Parse ===");
    let mut diagnostics = DiagnosticBag::new();
    let text = sources.file(file).text.clone();
    let Some(tu) = webclv::parse_translation_unit(&text, file, &mut diagnostics) else {
        for diag in diagnostics.iter() {
            eprintln!("{}", diag.render(&sources));
        }
        std::process::exit(1);
    };
    println!("Functions: {}", tu.functions.len());
    println!("Kernels: {}", tu.kernels().count());

    println!("\n=== Stage 3: Restrict ===");
    let builtins = BuiltinRegistry::new();
    let mut restrictor_diags = DiagnosticBag::new();
    let mut restrictor = Restrictor::new(&builtins, &mut restrictor_diags);
    if !restrictor.check(&tu) {
        for diag in restrictor_diags.iter() {
            eprintln!("{}", diag.render(&sources));
        }
        std::process::exit(1);
    }
    println!("Accepted ({} diagnostics)", restrictor_diags.len());

    println!("\n=== Stage 4: Analyse ===");
    let events = Analyser::new().analyse(&tu);
    println!("Events: {}", events.len());

    println!("\n=== Stage 5: Transform ===");
    let config = ValidatorConfig::new();
    let output = Transformer::new(&config, &sources).run(&tu, &events)?;
    println!("Output bytes: {}", output.len());
    println!("\n{output}");

    Ok(())
}
