//! Configuration management for the MX documentation compiler.
//!
//! Parses `mx.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support `$VAR` / `${VAR}` environment
//! variable expansion. Expanded fields:
//!
//! - `docs.source_dir`
//! - `docs.allowlist`
//! - `docs.output_dir`
//! - `github.repo`
//! - `github.branch`

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "mx.toml";

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("environment expansion failed: {0}")]
    Expand(String),

    #[error("invalid configuration: {0}")]
    Validation(String),
}

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the Python source tree root.
    pub source_dir: Option<PathBuf>,
    /// Override the allow-list path.
    pub allowlist: Option<PathBuf>,
    /// Override the artifact output directory.
    pub output_dir: Option<PathBuf>,
    /// Override the navigation tab label.
    pub tab: Option<String>,
    /// Override the GitHub `owner/repo` for source links.
    pub repo: Option<String>,
    /// Override the branch source links point at.
    pub branch: Option<String>,
    /// Override whether placeholders list issue details.
    pub show_errors: Option<bool>,
}

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Documented package settings.
    pub package: PackageConfig,
    /// Paths configuration (relative strings from TOML).
    docs: DocsConfigRaw,
    /// GitHub source link configuration.
    pub github: Option<GithubConfig>,
    /// Error display configuration.
    pub errors: ErrorsConfig,

    /// Resolved paths (set after loading).
    #[serde(skip)]
    pub docs_resolved: DocsConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Documented package settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PackageConfig {
    /// Top-level import name of the documented package.
    pub name: String,
    /// Navigation tab label.
    pub tab: String,
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            tab: "API Reference".to_owned(),
        }
    }
}

/// Raw paths as parsed from TOML (strings, possibly with env vars).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DocsConfigRaw {
    source_dir: Option<String>,
    allowlist: Option<String>,
    output_dir: Option<String>,
}

/// Resolved paths configuration.
#[derive(Debug, Default, Clone)]
pub struct DocsConfig {
    /// Python source tree root.
    pub source_dir: PathBuf,
    /// OPML allow-list path.
    pub allowlist: PathBuf,
    /// Artifact output directory.
    pub output_dir: PathBuf,
}

/// GitHub source link configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct GithubConfig {
    /// `owner/repo`.
    pub repo: String,
    /// Branch or tag for source links.
    #[serde(default = "default_branch")]
    pub branch: String,
}

fn default_branch() -> String {
    "main".to_owned()
}

/// Error display configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ErrorsConfig {
    /// Whether placeholder stubs list issue details.
    pub show: bool,
}

impl Default for ErrorsConfig {
    fn default() -> Self {
        Self { show: true }
    }
}

impl Config {
    /// Load configuration, optionally from an explicit path, applying CLI
    /// overrides afterwards.
    ///
    /// Without an explicit path, `mx.toml` is searched for in the current
    /// directory and its ancestors; when none exists the defaults apply,
    /// rooted in the current directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on unreadable or unparsable files, failed
    /// environment expansion, or invalid values.
    pub fn load(path: Option<&Path>, cli: Option<&CliSettings>) -> Result<Self, ConfigError> {
        let discovered = match path {
            Some(p) => Some(p.to_owned()),
            None => discover(&std::env::current_dir()?),
        };

        let mut config = match &discovered {
            Some(file) => {
                let text = std::fs::read_to_string(file)?;
                let base = file.parent().unwrap_or(Path::new(".")).to_owned();
                let mut config: Self = toml::from_str(&text)?;
                config.config_path = Some(file.clone());
                config.resolve(&base)?;
                config
            }
            None => Self::default(),
        };

        if let Some(cli) = cli {
            config.apply_cli(cli);
        }
        config.validate()?;
        Ok(config)
    }

    /// Defaults rooted at `base`.
    #[must_use]
    pub fn default_with_base(base: &Path) -> Self {
        Self {
            package: PackageConfig::default(),
            docs: DocsConfigRaw::default(),
            github: None,
            errors: ErrorsConfig::default(),
            docs_resolved: DocsConfig {
                source_dir: base.to_owned(),
                allowlist: base.join("public_api.opml"),
                output_dir: base.join("target"),
            },
            config_path: None,
        }
    }

    /// Expand env vars and resolve raw paths relative to `base`.
    fn resolve(&mut self, base: &Path) -> Result<(), ConfigError> {
        let defaults = Self::default_with_base(base);

        self.docs_resolved = DocsConfig {
            source_dir: resolve_path(self.docs.source_dir.as_deref(), base)?
                .unwrap_or(defaults.docs_resolved.source_dir),
            allowlist: resolve_path(self.docs.allowlist.as_deref(), base)?
                .unwrap_or(defaults.docs_resolved.allowlist),
            output_dir: resolve_path(self.docs.output_dir.as_deref(), base)?
                .unwrap_or(defaults.docs_resolved.output_dir),
        };

        if let Some(github) = &mut self.github {
            github.repo = expand(&github.repo)?;
            github.branch = expand(&github.branch)?;
        }
        Ok(())
    }

    fn apply_cli(&mut self, cli: &CliSettings) {
        if let Some(dir) = &cli.source_dir {
            self.docs_resolved.source_dir.clone_from(dir);
        }
        if let Some(list) = &cli.allowlist {
            self.docs_resolved.allowlist.clone_from(list);
        }
        if let Some(out) = &cli.output_dir {
            self.docs_resolved.output_dir.clone_from(out);
        }
        if let Some(tab) = &cli.tab {
            self.package.tab.clone_from(tab);
        }
        if let Some(repo) = &cli.repo {
            let branch = cli
                .branch
                .clone()
                .or_else(|| self.github.as_ref().map(|g| g.branch.clone()))
                .unwrap_or_else(default_branch);
            self.github = Some(GithubConfig {
                repo: repo.clone(),
                branch,
            });
        } else if let (Some(branch), Some(github)) = (&cli.branch, &mut self.github) {
            github.branch.clone_from(branch);
        }
        if let Some(show) = cli.show_errors {
            self.errors.show = show;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(github) = &self.github {
            if !github.repo.contains('/') {
                return Err(ConfigError::Validation(format!(
                    "github.repo must be `owner/repo`, got `{}`",
                    github.repo
                )));
            }
        }
        if self.package.tab.trim().is_empty() {
            return Err(ConfigError::Validation(
                "package.tab must not be empty".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Walk `start` and its ancestors for the config file.
fn discover(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILENAME))
        .find(|candidate| candidate.is_file())
}

fn expand(value: &str) -> Result<String, ConfigError> {
    shellexpand::env(value)
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| ConfigError::Expand(e.to_string()))
}

fn resolve_path(raw: Option<&str>, base: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let expanded = expand(raw)?;
    let path = PathBuf::from(expanded);
    Ok(Some(if path.is_absolute() {
        path
    } else {
        base.join(path)
    }))
}
