//! `mx validate` command implementation.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;

use mx_build::Builder;
use mx_config::{CliSettings, Config};
use mx_extract::Allowlist;
use mx_source_py::PySourceReader;

use crate::commands::print_check_report;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the validate command.
#[derive(Args)]
pub(crate) struct ValidateArgs {
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

impl ValidateArgs {
    pub(crate) fn execute(self, output: &Output) -> Result<ExitCode, CliError> {
        let cli_settings = CliSettings {
            source_dir: self.source_dir.clone(),
            allowlist: self.allowlist.clone(),
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let allowlist = Allowlist::load(&config.docs_resolved.allowlist)?;
        let reader = PySourceReader::new(&config.docs_resolved.source_dir);

        let check = Builder::new(&reader).check(&allowlist)?;

        print_check_report(output, &check);

        if check.is_clean() {
            Ok(ExitCode::SUCCESS)
        } else {
            Ok(ExitCode::from(1))
        }
    }
}
