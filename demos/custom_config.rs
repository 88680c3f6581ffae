//! Custom configuration example.
//!
//! Demonstrates configuring the validator with:
//! - A non-default identifier prefix (collision-proofing against names
//!   already used by the input)
//! - Wider generated-code indentation
//! - Strict mode, which escalates unsafe-builtin usage from a warning to a
//!   fatal diagnostic
//!
//! # Usage
//!
//! ```bash
//! cargo run --example custom_config -- path/to/kernel.cl
//! ```

use std::path::PathBuf;

use webclv::ValidatorConfig;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <kernel.cl>", args[0]);
        std::process::exit(1);
    }
    let input = PathBuf::from(&args[1]);

    let config = ValidatorConfig::new().with_prefix("ocl_chk").with_indent("  ").with_strict_mode(true);

    let output = webclv::validate_file(&input, false, config)?;
    print!("{output}");
    Ok(())
}
