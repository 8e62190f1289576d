//! Artifact tree layout.
//!
//! The writer is the thin boundary between the pure pipeline and the
//! filesystem. Page files land under the placeholder path segment so the
//! on-disk layout matches the paths navigation references before any
//! version rewrite.

use std::fs;
use std::path::Path;

use mx_manifest::PATH_TOKEN;

use crate::builder::{BuildError, BuildReport};

/// Write pages, navigation and the issue report under `out_dir`.
///
/// The output directory is created as needed; existing page files are
/// overwritten, matching the regenerate-wholesale model.
///
/// # Errors
///
/// Returns [`BuildError::Io`] on filesystem failures and
/// [`BuildError::Json`] if an artifact fails to serialize.
pub fn write_tree(out_dir: &Path, report: &BuildReport) -> Result<(), BuildError> {
    let pages_dir = out_dir.join(PATH_TOKEN);
    fs::create_dir_all(&pages_dir)?;

    for page in &report.pages {
        let path = pages_dir.join(format!("{}.mdx", page.slug));
        fs::write(&path, &page.body)?;
        tracing::debug!(path = %path.display(), "wrote page");
    }

    let docs_json = serde_json::to_string_pretty(&report.navigation)?;
    fs::write(out_dir.join("docs.json"), docs_json + "\n")?;

    let issues_json = serde_json::to_string_pretty(&report.check.issues)?;
    fs::write(out_dir.join("issues.json"), issues_json + "\n")?;

    Ok(())
}
