//! MX CLI - docstring-to-MDX documentation compiler.
//!
//! Provides commands for:
//! - `generate`: run the full pipeline and write the artifact tree
//! - `validate`: extract and validate only, print the issue report
//! - `list-issues`: machine-readable dump of all validation issues
//! - `rewrite-path`: rewrite the version path prefix in a generated manifest

mod commands;
mod error;
mod output;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{GenerateArgs, ListIssuesArgs, RewritePathArgs, ValidateArgs};
use output::Output;

/// MX - documentation compiler.
#[derive(Parser)]
#[command(name = "mx", version, about)]
struct Cli {
    /// Enable info-level logging.
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline and write the artifact tree.
    Generate(GenerateArgs),
    /// Run extraction and validation only, without rendering.
    Validate(ValidateArgs),
    /// Dump every validation issue in machine-readable form.
    ListIssues(ListIssuesArgs),
    /// Rewrite the version path prefix in an already-generated manifest.
    RewritePath(RewritePathArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let result = match cli.command {
        Commands::Generate(args) => args.execute(&output),
        Commands::Validate(args) => args.execute(&output),
        Commands::ListIssues(args) => args.execute(),
        Commands::RewritePath(args) => args.execute(&output),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            output.error(&format!("Error: {err}"));
            // Fatal defects: duplicate names, unresolved rewrite token,
            // unreadable inputs.
            ExitCode::from(2)
        }
    }
}
