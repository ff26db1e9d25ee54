//! basecamp CLI entry point.

use std::process::ExitCode;

use basecamp::cli::{Cli, Driver};
use basecamp::config::SetupConfig;
use basecamp::deps::DependencyRegistry;
use basecamp::ui::{Output, OutputMode};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is INFO
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("basecamp=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("basecamp=info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    tracing::debug!("basecamp starting with args: {:?}", cli);

    let output_mode = if cli.quiet {
        OutputMode::Quiet
    } else if cli.verbose {
        OutputMode::Verbose
    } else {
        OutputMode::Normal
    };

    if cli.no_color {
        std::env::set_var("NO_COLOR", "1");
    }

    let working_dir = std::env::current_dir().unwrap_or_default();
    let scratch_dir = cli
        .scratch_dir
        .clone()
        .unwrap_or_else(|| working_dir.clone());

    let output = Output::new(output_mode);

    let config = match SetupConfig::load(cli.config.as_deref(), &working_dir) {
        Ok(config) => config,
        Err(e) => {
            output.error(&e.to_string());
            return ExitCode::from(1);
        }
    };

    let registry = DependencyRegistry::builtin().with_custom(&config.custom);
    let driver = Driver::new(registry, config, output, scratch_dir);

    let summary = driver.run(&cli);
    ExitCode::from(summary.exit_code())
}
