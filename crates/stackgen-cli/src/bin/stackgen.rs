//! Stackgen CLI Binary
//!
//! Lowers a JSON encoded IR module to WebAssembly function bodies.
//!
//! # Usage
//!
//! ```bash
//! # Write the raw code bodies next to the input
//! stackgen module.json --output module.code
//!
//! # Inspect the generated instructions
//! stackgen module.json --format listing
//! ```

use clap::{Parser, ValueEnum};
use stackgen_cli::{
    commands::{generate_command, GenerateArgs},
    config::{OutputFormat, StackgenConfig},
    diagnostics::setup_error_reporting,
    Result,
};
use stackgen_wasm::FailurePolicy;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(
    name = "stackgen",
    version = env!("CARGO_PKG_VERSION"),
    about = "Lower stackgen IR modules to WebAssembly code section bodies"
)]
struct Cli {
    /// IR module in JSON form
    input: PathBuf,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format (overrides the configuration file)
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Stop at the first function that fails to generate
    #[arg(long)]
    abort_on_failure: bool,

    /// Enable verbose logging (use multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    quiet: bool,

    /// Set log level (overrides --verbose/--quiet)
    #[arg(long, value_enum)]
    log: Option<LogLevel>,

    /// Set log output format
    #[arg(long, value_enum, default_value = "pretty")]
    log_format: LogFormat,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_error_reporting()?;
    setup_logging(cli.verbose, cli.quiet, cli.log, cli.log_format);

    let mut config = StackgenConfig::load(cli.config.as_deref())?;
    if cli.abort_on_failure {
        config.codegen.failure_policy = FailurePolicy::Abort;
    }

    let args = GenerateArgs {
        input: cli.input,
        output: cli.output,
        format: cli.format,
    };

    match generate_command(&args, &config) {
        Ok(summary) if summary.failed == 0 => {
            info!("Generated {} functions", summary.generated);
            Ok(())
        }
        Ok(summary) => {
            error!(
                "{} of {} functions failed to generate",
                summary.failed,
                summary.failed + summary.generated
            );
            std::process::exit(1);
        }
        Err(e) => {
            error!("{}", e);
            if cli.verbose > 0 {
                error!(?e, "detailed error context");
            }
            std::process::exit(1);
        }
    }
}

fn setup_logging(verbose: u8, quiet: bool, log_level: Option<LogLevel>, log_format: LogFormat) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if let Some(level) = log_level {
        EnvFilter::new(match level {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        })
    } else if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let formatter = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .with_level(true);

    match log_format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(formatter)
                .with(filter)
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(formatter.json())
                .with(filter)
                .init();
        }
    }
}
