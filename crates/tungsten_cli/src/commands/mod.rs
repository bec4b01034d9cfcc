//! CLI command definitions.

use clap::{Parser, Subcommand, ValueEnum};

pub mod query;
pub mod render;

/// tungsten - render templated views into HTML documents
#[derive(Parser)]
#[command(name = "tungsten")]
#[command(version, about = "tungsten - render templated views into HTML documents")]
#[command(long_about = r#"
tungsten resolves a JSON data source, renders it through a template literal
view, and optionally injects the markup into every element of an HTML
document that matches a selector list.

COMMANDS:
  render  → Render data through a template (optionally into a document)
  query   → List the elements of a document matching a selector list

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  3 - Upstream data error
  4 - Template error
  5 - Document or selector error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text, env = "TUNGSTEN_LOG_FORMAT")]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render JSON data through a template literal
    Render(render::RenderArgs),

    /// List elements matching a selector list
    Query(query::QueryArgs),
}
