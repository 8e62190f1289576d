//! CLI command implementations.

pub(crate) mod generate;
pub(crate) mod issues;
pub(crate) mod rewrite;
pub(crate) mod validate;

pub(crate) use generate::GenerateArgs;
pub(crate) use issues::ListIssuesArgs;
pub(crate) use rewrite::RewritePathArgs;
pub(crate) use validate::ValidateArgs;

use mx_build::CheckReport;
use mx_config::Config;
use mx_render::RendererConfig;

use crate::output::Output;

/// Renderer settings derived from the loaded configuration.
pub(crate) fn renderer_config(config: &Config) -> RendererConfig {
    RendererConfig {
        github_repo: config.github.as_ref().map(|g| g.repo.clone()),
        github_branch: config
            .github
            .as_ref()
            .map_or_else(|| "main".to_owned(), |g| g.branch.clone()),
        show_errors: config.errors.show,
    }
}

/// Print the end-of-run report for recoverable problems.
pub(crate) fn print_check_report(output: &Output, check: &CheckReport) {
    output.separator();
    output.highlight("VALIDATION REPORT");
    output.separator();

    if !check.missing.is_empty() {
        output.warning(&format!("Missing entries ({}):", check.missing.len()));
        for missing in &check.missing {
            output.warning(&format!("  - {}: {}", missing.entry, missing.reason));
        }
    }

    if !check.issues.is_empty() {
        output.warning(&format!("Structural issues ({}):", check.issues.len()));
        for issue in &check.issues {
            output.warning(&format!(
                "  - {} {}:{} {}: {}",
                issue.entry, issue.line, issue.column, issue.rule, issue.message
            ));
        }
    }

    output.separator();
    output.info(&format!(
        "Entries: {}  Invalid: {}  Issues: {}  Missing: {}",
        check.entries,
        check.invalid,
        check.issues.len(),
        check.missing.len()
    ));

    if check.is_clean() {
        output.success("All docstrings validate clean");
    } else {
        output.error("Structural problems found; invalid entries render as placeholders");
    }
}
