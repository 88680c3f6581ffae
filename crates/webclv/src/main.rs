//! webclv CLI - WebCL Validator

mod cli;

use clap::Parser;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

use cli::{Cli, EXIT_REWRITE_FAILURE, EXIT_SETUP_FAILURE, EXIT_SUCCESS, EXIT_VALIDATION_FAILURE};
use webclv::{Driver, Error, SourceManager, ValidatorConfig};

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "webclv=debug" } else { "webclv=info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(default_level.parse().unwrap()))
        .with_target(false)
        .with_span_events(FmtSpan::CLOSE)
        .init();

    std::process::exit(run(&cli));
}

fn run(cli: &Cli) -> i32 {
    let mut sources = SourceManager::new();
    let file = match sources.load_file(&cli.input, cli.force_opencl()) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("{err}");
            return EXIT_SETUP_FAILURE;
        }
    };

    let config = ValidatorConfig::new().with_prefix(cli.prefix.clone()).with_strict_mode(cli.strict);
    let output = match Driver::new(config).run(&sources, file) {
        Ok(output) => output,
        Err(Error::Diagnostics(message)) => {
            eprintln!("{message}");
            return EXIT_VALIDATION_FAILURE;
        }
        Err(err) => {
            eprintln!("{err}");
            return EXIT_REWRITE_FAILURE;
        }
    };

    let write_result = match &cli.output {
        Some(path) => std::fs::write(path, output),
        None => {
            print!("{output}");
            Ok(())
        }
    };

    if let Err(err) = write_result {
        eprintln!("{err}");
        return EXIT_SETUP_FAILURE;
    }

    EXIT_SUCCESS
}
