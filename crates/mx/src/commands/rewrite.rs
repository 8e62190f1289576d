//! `mx rewrite-path` command implementation.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;

use mx_config::Config;
use mx_manifest::VersionPathRewriter;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the rewrite-path command.
#[derive(Args)]
pub(crate) struct RewritePathArgs {
    /// Release version or PR identifier to scope page paths with.
    #[arg(long)]
    prefix: String,

    /// Manifest to rewrite (default: `<output_dir>/docs.json`).
    #[arg(short, long)]
    manifest: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover mx.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl RewritePathArgs {
    pub(crate) fn execute(self, output: &Output) -> Result<ExitCode, CliError> {
        let config = Config::load(self.config.as_deref(), None)?;
        let path = self
            .manifest
            .unwrap_or_else(|| config.docs_resolved.output_dir.join("docs.json"));

        let text = fs::read_to_string(&path)?;
        let mut doc: serde_json::Value = serde_json::from_str(&text)?;

        let rewriter = VersionPathRewriter::new(&self.prefix);
        let manifest = rewriter.manifest(&mut doc, &self.prefix)?;

        fs::write(&path, serde_json::to_string_pretty(&doc)? + "\n")?;

        let manifest_path = path.with_file_name("version.json");
        fs::write(
            &manifest_path,
            serde_json::to_string_pretty(&manifest)? + "\n",
        )?;

        output.success(&format!(
            "Rewrote {} page path(s) under `{}` in {}",
            manifest.pages.len(),
            self.prefix,
            path.display()
        ));
        Ok(ExitCode::SUCCESS)
    }
}
