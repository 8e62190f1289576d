//! The extraction pass.
//!
//! Walks the allow-list against a [`SourceReader`], building the registry
//! in a single pass. Symbols that fail to resolve are collected as
//! [`MissingEntry`] records and reported at the end of the run; a duplicate
//! qualified name aborts immediately.

use crate::allowlist::Allowlist;
use crate::entry::ApiEntry;
use crate::registry::{Registry, RegistryError};
use crate::source::SourceReader;

/// An allow-listed symbol that could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingEntry {
    pub qualified_name: String,
    /// The reader's failure message.
    pub reason: String,
}

/// Result of the extraction pass.
#[derive(Debug)]
pub struct ExtractOutcome {
    pub registry: Registry,
    /// Symbols excluded from output, in allow-list order.
    pub missing: Vec<MissingEntry>,
}

/// Walks an allow-list against a source reader.
pub struct Extractor<'a> {
    reader: &'a dyn SourceReader,
}

impl<'a> Extractor<'a> {
    #[must_use]
    pub fn new(reader: &'a dyn SourceReader) -> Self {
        Self { reader }
    }

    /// Resolve every allow-listed symbol and build the registry.
    ///
    /// Resolution failures never short-circuit: every failing symbol is
    /// recorded and extraction continues, so one broken declaration cannot
    /// hide the rest of the report.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateEntry`] when two allow-list rows
    /// resolve to the same qualified name.
    pub fn extract(&self, allowlist: &Allowlist) -> Result<ExtractOutcome, RegistryError> {
        let mut registry = Registry::new();
        let mut missing = Vec::new();

        for group in &allowlist.groups {
            for symbol in &group.symbols {
                match self.reader.resolve(symbol) {
                    Ok(resolved) => {
                        registry.insert(ApiEntry::new(
                            &symbol.qualified_name,
                            symbol.kind,
                            &group.title,
                            resolved.signature,
                            resolved.doc,
                        ))?;
                    }
                    Err(err) => {
                        tracing::warn!(
                            symbol = %symbol.qualified_name,
                            error = %err,
                            "failed to resolve allow-listed symbol"
                        );
                        missing.push(MissingEntry {
                            qualified_name: symbol.qualified_name.clone(),
                            reason: err.to_string(),
                        });
                    }
                }
            }
        }

        Ok(ExtractOutcome { registry, missing })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::allowlist::Allowlist;
    use crate::entry::{EntryKind, Param, Signature};
    use crate::mock::MockSourceReader;

    const LIST: &str = r#"<opml><body>
        <outline text="module|pkg">
          <outline text="func|pkg.create"/>
          <outline text="func|pkg.drop"/>
        </outline>
    </body></opml>"#;

    fn signature() -> Signature {
        Signature {
            params: vec![Param::new("name")],
            return_type: Some("Table".to_owned()),
        }
    }

    #[test]
    fn test_extract_builds_registry_in_order() {
        let reader = MockSourceReader::new()
            .with_doc("pkg", "Package docs.")
            .with_symbol("pkg.create", signature(), "Create.")
            .with_symbol("pkg.drop", signature(), "Drop.");
        let allowlist = Allowlist::parse(LIST).unwrap();

        let outcome = Extractor::new(&reader).extract(&allowlist).unwrap();

        assert!(outcome.missing.is_empty());
        let names: Vec<&str> = outcome
            .registry
            .iter()
            .map(|e| e.qualified_name.as_str())
            .collect();
        assert_eq!(names, vec!["pkg", "pkg.create", "pkg.drop"]);
        assert_eq!(outcome.registry.get("pkg").unwrap().kind, EntryKind::Module);
    }

    #[test]
    fn test_category_is_group_title() {
        let reader = MockSourceReader::new()
            .with_doc("pkg", "")
            .with_symbol("pkg.create", signature(), "")
            .with_symbol("pkg.drop", signature(), "");
        let allowlist = Allowlist::parse(LIST).unwrap();

        let outcome = Extractor::new(&reader).extract(&allowlist).unwrap();
        assert!(outcome.registry.iter().all(|e| e.category == "pkg"));
    }

    #[test]
    fn test_missing_symbols_collected_not_short_circuited() {
        let reader = MockSourceReader::new().with_symbol("pkg.drop", signature(), "Drop.");
        let allowlist = Allowlist::parse(LIST).unwrap();

        let outcome = Extractor::new(&reader).extract(&allowlist).unwrap();

        assert_eq!(outcome.registry.len(), 1);
        assert_eq!(outcome.missing.len(), 2);
        assert_eq!(outcome.missing[0].qualified_name, "pkg");
        assert_eq!(outcome.missing[1].qualified_name, "pkg.create");
        assert!(outcome.missing[1].reason.contains("not found"));
    }

    #[test]
    fn test_duplicate_name_aborts() {
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

        let err = Extractor::new(&reader).extract(&allowlist).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateEntry("pkg.f".to_owned()));
    }
}
