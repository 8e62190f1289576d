//! `mx generate` command implementation.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;

use mx_build::{Builder, write_tree};
use mx_config::{CliSettings, Config};
use mx_extract::Allowlist;
use mx_source_py::PySourceReader;

use crate::commands::{print_check_report, renderer_config};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the generate command.
#[derive(Args)]
pub(crate) struct GenerateArgs {
    /// Output directory for the artifact tree (overrides config).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Python source tree root (overrides config).
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// OPML allow-list path (overrides config).
    #[arg(short, long)]
    allowlist: Option<PathBuf>,

    /// Navigation tab label (overrides config).
    #[arg(long)]
    tab: Option<String>,

    /// GitHub `owner/repo` for source links (overrides config).
    #[arg(long)]
    repo: Option<String>,

    /// Branch or tag source links point at (overrides config).
    #[arg(long)]
    branch: Option<String>,

    /// Omit issue details from placeholder stubs.
    #[arg(long)]
    no_errors: bool,

    /// Path to configuration file (default: auto-discover mx.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl GenerateArgs {
    pub(crate) fn execute(self, output: &Output) -> Result<ExitCode, CliError> {
        let cli_settings = CliSettings {
            source_dir: self.source_dir.clone(),
            allowlist: self.allowlist.clone(),
            output_dir: self.output_dir.clone(),
            tab: self.tab.clone(),
            repo: self.repo.clone(),
            branch: self.branch.clone(),
            show_errors: self.no_errors.then_some(false),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        output.info(&format!(
            "Source: {}",
            config.docs_resolved.source_dir.display()
        ));
        output.info(&format!(
            "Allow-list: {}",
            config.docs_resolved.allowlist.display()
        ));
        output.info(&format!(
            "Output: {}",
            config.docs_resolved.output_dir.display()
        ));

        let allowlist = Allowlist::load(&config.docs_resolved.allowlist)?;
        let reader = PySourceReader::new(&config.docs_resolved.source_dir);

        let report = Builder::new(&reader)
            .with_tab(&config.package.tab)
            .with_renderer_config(renderer_config(&config))
            .build(&allowlist)?;

        write_tree(&config.docs_resolved.output_dir, &report)?;

        output.success(&format!(
            "Wrote {} page(s) to {}",
            report.pages.len(),
            config.docs_resolved.output_dir.display()
        ));

        if report.check.is_clean() {
            Ok(ExitCode::SUCCESS)
        } else {
            // Artifacts are written with placeholders in place; the
            // non-zero exit is the publish gate.
            print_check_report(output, &report.check);
            Ok(ExitCode::from(1))
        }
    }
}
