//! `mx list-issues` command implementation.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;

use mx_build::Builder;
use mx_config::{CliSettings, Config};
use mx_extract::Allowlist;
use mx_source_py::PySourceReader;

use crate::error::CliError;

/// Arguments for the list-issues command.
#[derive(Args)]
pub(crate) struct ListIssuesArgs {
    /// Python source tree root (overrides config).
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// OPML allow-list path (overrides config).
    #[arg(short, long)]
    allowlist: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover mx.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl ListIssuesArgs {
    /// Dump one JSON object per issue to stdout.
    ///
    /// The dump carries entry name, rule kind, line/column and byte span;
    /// it is the input CI gates and editors consume.
    pub(crate) fn execute(self) -> Result<ExitCode, CliError> {
        let cli_settings = CliSettings {
            source_dir: self.source_dir.clone(),
            allowlist: self.allowlist.clone(),
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let allowlist = Allowlist::load(&config.docs_resolved.allowlist)?;
        let reader = PySourceReader::new(&config.docs_resolved.source_dir);
        let check = Builder::new(&reader).check(&allowlist)?;

        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        for issue in &check.issues {
            writeln!(out, "{}", serde_json::to_string(issue)?)?;
        }

        if check.is_clean() {
            Ok(ExitCode::SUCCESS)
        } else {
            Ok(ExitCode::from(1))
        }
    }
}
