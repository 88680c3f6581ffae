//! Basic validation example.
//!
//! Demonstrates instrumenting an OpenCL C kernel and printing the result.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example basic_validate -- path/to/kernel.cl
//! ```

use std::path::PathBuf;

use webclv::ValidatorConfig;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let input = parse_args()?;

    let output = webclv::validate_file(&input, false, ValidatorConfig::new())?;
    print!("{output}");
    Ok(())
}

fn parse_args() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <kernel.cl>", args[0]);
        std::process::exit(1);
    }
    Ok(PathBuf::from(&args[1]))
}
