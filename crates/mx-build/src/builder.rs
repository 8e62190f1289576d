//! The build pipeline.

use rayon::prelude::*;
use serde::Serialize;

use mx_extract::{
    Allowlist, Extractor, Registry, RegistryError, SourceReader, ValidationStatus,
};
use mx_manifest::Navigation;
use mx_render::{Page, Renderer, RendererConfig};
use mx_validate::{ValidationIssue, line_col, validate};

/// Build pipeline error.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("{0}")]
    Registry(#[from] RegistryError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize artifact: {0}")]
    Json(#[from] serde_json::Error),
}

/// One issue in the machine-readable report, with derived position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueRecord {
    pub entry: String,
    pub rule: String,
    pub line: usize,
    pub column: usize,
    pub start: usize,
    pub end: usize,
    pub message: String,
}

/// One allow-listed symbol that resolved to nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingRecord {
    pub entry: String,
    pub reason: String,
}

/// Result of the extract + validate stages.
#[derive(Debug)]
pub struct CheckReport {
    pub issues: Vec<IssueRecord>,
    pub missing: Vec<MissingRecord>,
    /// Extracted entry count.
    pub entries: usize,
    /// Entries whose docstring failed validation.
    pub invalid: usize,
}

impl CheckReport {
    /// True when the surface extracted completely and validated clean.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty() && self.missing.is_empty()
    }
}

/// Result of the full pipeline.
#[derive(Debug)]
pub struct BuildReport {
    pub check: CheckReport,
    pub pages: Vec<Page>,
    /// The navigation document, placeholder token included.
    pub navigation: serde_json::Value,
}

/// Runs the pipeline against a source reader.
pub struct Builder<'a> {
    reader: &'a dyn SourceReader,
    renderer: RendererConfig,
    tab: String,
}

impl<'a> Builder<'a> {
    #[must_use]
    pub fn new(reader: &'a dyn SourceReader) -> Self {
        Self {
            reader,
            renderer: RendererConfig::default(),
            tab: "API Reference".to_owned(),
        }
    }

    /// Set the renderer configuration.
    #[must_use]
    pub fn with_renderer_config(mut self, config: RendererConfig) -> Self {
        self.renderer = config;
        self
    }

    /// Set the navigation tab label.
    #[must_use]
    pub fn with_tab(mut self, tab: impl Into<String>) -> Self {
        self.tab = tab.into();
        self
    }

    /// Run extract + validate only. No pages are produced and nothing is
    /// written; this backs the pre-publish gate.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Registry`] on a duplicate qualified name.
    pub fn check(&self, allowlist: &Allowlist) -> Result<CheckReport, BuildError> {
        let (report, _, _) = self.extract_and_validate(allowlist)?;
        Ok(report)
    }

    /// Run the full pipeline: extract, validate, render, assemble
    /// navigation.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Registry`] on a duplicate qualified name,
    /// before any page is produced.
    pub fn build(&self, allowlist: &Allowlist) -> Result<BuildReport, BuildError> {
        let (check, registry, issues) = self.extract_and_validate(allowlist)?;

        let pages = Renderer::new(self.renderer.clone()).render(&registry, &issues);
        let navigation = Navigation::from_pages(&self.tab, &pages).to_value();

        tracing::info!(
            pages = pages.len(),
            entries = check.entries,
            issues = check.issues.len(),
            missing = check.missing.len(),
            "build complete"
        );

        Ok(BuildReport {
            check,
            pages,
            navigation,
        })
    }

    fn extract_and_validate(
        &self,
        allowlist: &Allowlist,
    ) -> Result<(CheckReport, Registry, Vec<ValidationIssue>), BuildError> {
        let outcome = Extractor::new(self.reader).extract(allowlist)?;
        let mut registry = outcome.registry;

        // Entries are independent; validate them in parallel. Collecting
        // per-entry first keeps the report in registry order.
        let per_entry: Vec<Vec<ValidationIssue>> = registry
            .entries_mut()
            .par_iter_mut()
            .map(|entry| {
                let issues = validate(&entry.qualified_name, &entry.doc);
                entry.resolve_status(if issues.is_empty() {
                    ValidationStatus::Valid
                } else {
                    ValidationStatus::Invalid
                });
                issues
            })
            .collect();

        let issues: Vec<ValidationIssue> = per_entry.into_iter().flatten().collect();
        let invalid = registry
            .iter()
            .filter(|e| e.status() == ValidationStatus::Invalid)
            .count();

        let records = issues
            .iter()
            .map(|issue| {
                let doc = registry.get(&issue.entry).map_or("", |e| e.doc.as_str());
                let (line, column) = line_col(doc, issue.start);
                IssueRecord {
                    entry: issue.entry.clone(),
                    rule: issue.rule.to_string(),
                    line,
                    column,
                    start: issue.start,
                    end: issue.end,
                    message: issue.message.clone(),
                }
            })
            .collect();

        let missing = outcome
            .missing
            .into_iter()
            .map(|m| MissingRecord {
                entry: m.qualified_name,
                reason: m.reason,
            })
            .collect();

        let report = CheckReport {
            issues: records,
            missing,
            entries: registry.len(),
            invalid,
        };
        Ok((report, registry, issues))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use mx_extract::{Allowlist, MockSourceReader, Param, Signature};

    use super::*;

    const LIST: &str = r#"<opml><body>
        <outline text="module|pkg">
          <outline text="func|pkg.create"/>
          <outline text="func|pkg.broken"/>
        </outline>
    </body></opml>"#;

    fn signature() -> Signature {
        Signature {
            params: vec![Param::new("name")],
            return_type: None,
        }
    }

    fn reader() -> MockSourceReader {
        MockSourceReader::new()
            .with_doc("pkg", "Package docs.")
            .with_symbol("pkg.create", signature(), "Create a table.")
            .with_symbol("pkg.broken", signature(), ">>> transcript outside fence")
    }

    #[test]
    fn test_build_produces_pages_and_navigation() {
        let reader = reader();
        let allowlist = Allowlist::parse(LIST).unwrap();
        let report = Builder::new(&reader)
            .with_tab("SDK")
            .build(&allowlist)
            .unwrap();

        assert_eq!(report.pages.len(), 1);
        assert_eq!(report.check.entries, 3);
        assert_eq!(report.check.invalid, 1);
        assert_eq!(report.navigation["tab"], "SDK");
        assert_eq!(
            report.navigation["dropdowns"][0]["groups"][0]["pages"][0],
            "sdk/latest/pkg"
        );
    }

    #[test]
    fn test_issue_records_carry_position() {
        let reader = reader();
        let allowlist = Allowlist::parse(LIST).unwrap();
        let report = Builder::new(&reader).build(&allowlist).unwrap();

        assert_eq!(report.check.issues.len(), 1);
        let issue = &report.check.issues[0];
        assert_eq!(issue.entry, "pkg.broken");
        assert_eq!(issue.rule, "broken-repl-continuation");
        assert_eq!((issue.line, issue.column), (1, 1));
    }

    #[test]
    fn test_invalid_entry_renders_placeholder() {
        let reader = reader();
        let allowlist = Allowlist::parse(LIST).unwrap();
        let report = Builder::new(&reader).build(&allowlist).unwrap();

        let body = &report.pages[0].body;
        assert!(body.contains("Documentation omitted - 1 structural issue(s)"));
        assert!(!body.contains(">>> transcript"));
    }

    #[test]
    fn test_check_runs_without_rendering() {
        let reader = reader();
        let allowlist = Allowlist::parse(LIST).unwrap();
        let check = Builder::new(&reader).check(&allowlist).unwrap();

        assert_eq!(check.entries, 3);
        assert_eq!(check.invalid, 1);
        assert!(!check.is_clean());
    }

    #[test]
    fn test_clean_surface_reports_clean() {
        let reader = MockSourceReader::new()
            .with_doc("pkg", "Package docs.")
            .with_symbol("pkg.create", signature(), "Create.")
            .with_symbol("pkg.broken", signature(), "Nothing broken here.");
        let allowlist = Allowlist::parse(LIST).unwrap();
        let check = Builder::new(&reader).check(&allowlist).unwrap();

        assert!(check.is_clean());
        assert_eq!(check.invalid, 0);
    }

    #[test]
    fn test_missing_symbols_reported() {
        let reader = MockSourceReader::new().with_doc("pkg", "Package docs.");
        let allowlist = Allowlist::parse(LIST).unwrap();
        let check = Builder::new(&reader).check(&allowlist).unwrap();

        assert_eq!(check.missing.len(), 2);
        assert_eq!(check.missing[0].entry, "pkg.create");
        assert!(!check.is_clean());
    }

    #[test]
    fn test_duplicate_name_aborts_before_pages() {
        let xml = r#"<opml><body>
            <outline text="module|pkg">
              <outline text="func|pkg.f"/>
              <outline text="func|pkg.f"/>
            </outline>
        </body></opml>"#;
        let reader = MockSourceReader::new()
            .with_doc("pkg", "")
            .with_doc("pkg.f", "");
        let allowlist = Allowlist::parse(xml).unwrap();

        let err = Builder::new(&reader).build(&allowlist).unwrap_err();
        assert!(matches!(
            err,
            BuildError::Registry(RegistryError::DuplicateEntry(_))
        ));
    }

    #[test]
    fn test_build_is_deterministic() {
        let allowlist = Allowlist::parse(LIST).unwrap();
        let build = || {
            let reader = reader();
            let report = Builder::new(&reader).build(&allowlist).unwrap();
            (
                report.pages,
                report.navigation.to_string(),
                report.check.issues,
            )
        };

        assert_eq!(build(), build());
    }
}
