//! tungsten CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments
//! - 3: Upstream data error
//! - 4: Template error
//! - 5: Document or selector error

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tungsten_view::{DomError, RenderError, RequestError, TemplateError};

mod commands;

use commands::{Cli, Commands, LogFormat};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const UPSTREAM_ERROR: u8 = 3;
    pub const TEMPLATE_ERROR: u8 = 4;
    pub const DOCUMENT_ERROR: u8 = 5;
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    let result = match cli.command {
        Commands::Render(args) => commands::render::execute(args).await,
        Commands::Query(args) => commands::query::execute(args).await,
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

/// Install the tracing subscriber. `RUST_LOG` takes precedence over flags.
fn init_logging(cli: &Cli) {
    let level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    let default_filter = format!("warn,tungsten_view={level},tungsten_cli={level}");
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let (text, json) = match cli.log_format {
        LogFormat::Text => (
            Some(fmt::layer().with_target(false).with_writer(std::io::stderr)),
            None,
        ),
        LogFormat::Json => (None, Some(fmt::layer().json().with_writer(std::io::stderr))),
    };

    let log_result = tracing_subscriber::registry()
        .with(filter)
        .with(text)
        .with(json)
        .try_init();

    if log_result.is_err() {
        // Logging already initialized, continue
    }
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    for cause in e.chain() {
        if let Some(render) = cause.downcast_ref::<RenderError<RequestError>>() {
            return match render {
                RenderError::Upstream(_) => ExitCodes::UPSTREAM_ERROR,
                RenderError::Template(_) => ExitCodes::TEMPLATE_ERROR,
                RenderError::Dom(_) => ExitCodes::DOCUMENT_ERROR,
            };
        }
        if cause.is::<RequestError>() {
            return ExitCodes::UPSTREAM_ERROR;
        }
        if cause.is::<TemplateError>() {
            return ExitCodes::TEMPLATE_ERROR;
        }
        if cause.is::<DomError>() {
            return ExitCodes::DOCUMENT_ERROR;
        }
    }

    if e.to_string().to_lowercase().contains("argument") {
        ExitCodes::INVALID_ARGS
    } else {
        ExitCodes::GENERAL_ERROR
    }
}
