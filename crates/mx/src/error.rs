//! CLI error types.

use mx_build::BuildError;
use mx_config::ConfigError;
use mx_extract::AllowlistError;
use mx_manifest::RewriteError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Allowlist(#[from] AllowlistError),

    #[error("{0}")]
    Build(#[from] BuildError),

    #[error("{0}")]
    Rewrite(#[from] RewriteError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Json(#[from] serde_json::Error),
}
