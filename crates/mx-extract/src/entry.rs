//! The extracted entry model.
//!
//! [`ApiEntry`] is created by the extractor and immutable afterwards except
//! for its validation status, which the validation pass sets exactly once.
//! The signature model is deliberately closed: a fixed set of fields
//! populated directly from the declaration text, with no reflection or
//! schema inference anywhere.

use serde::Serialize;

/// What kind of symbol an entry documents.
///
/// Mirrors the item kinds the allow-list distinguishes. `Udf` covers
/// decorator-wrapped callables that document like functions but live
/// outside their defining module's namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntryKind {
    Module,
    Class,
    Function,
    Method,
    Property,
    Udf,
}

impl EntryKind {
    /// Parse the allow-list's kind tag.
    #[must_use]
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "module" => Some(Self::Module),
            "class" => Some(Self::Class),
            "func" | "function" => Some(Self::Function),
            "method" => Some(Self::Method),
            "property" => Some(Self::Property),
            "udf" => Some(Self::Udf),
            _ => None,
        }
    }

    /// True for kinds that carry a call signature.
    #[must_use]
    pub fn is_callable(self) -> bool {
        matches!(self, Self::Function | Self::Method | Self::Udf)
    }
}

/// Variadic marker on a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Variadic {
    #[default]
    None,
    /// `*args`
    Args,
    /// `**kwargs`
    KwArgs,
}

/// One declared parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Param {
    pub name: String,
    /// Type annotation text, verbatim from the declaration.
    pub ty: Option<String>,
    /// Default value text, verbatim from the declaration.
    pub default: Option<String>,
    /// False when a default (or variadic marker) makes the parameter
    /// optional at the call site.
    pub required: bool,
    pub variadic: Variadic,
}

impl Param {
    /// A plain required parameter with no annotation.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: None,
            default: None,
            required: true,
            variadic: Variadic::None,
        }
    }
}

/// An ordered call signature.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Signature {
    pub params: Vec<Param>,
    /// Return annotation text, verbatim.
    pub return_type: Option<String>,
}

/// Validation status of an entry's docstring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ValidationStatus {
    #[default]
    Unchecked,
    Valid,
    Invalid,
}

/// One extracted public symbol with its raw documentation text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiEntry {
    /// Unique key across the registry.
    pub qualified_name: String,
    pub kind: EntryKind,
    /// Grouping label; entries with the same category share a page.
    pub category: String,
    pub signature: Option<Signature>,
    /// Raw docstring text, verbatim, fenced examples included.
    pub doc: String,
    status: ValidationStatus,
}

impl ApiEntry {
    /// Create an entry in the `Unchecked` state.
    #[must_use]
    pub fn new(
        qualified_name: impl Into<String>,
        kind: EntryKind,
        category: impl Into<String>,
        signature: Option<Signature>,
        doc: impl Into<String>,
    ) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            kind,
            category: category.into(),
            signature,
            doc: doc.into(),
            status: ValidationStatus::Unchecked,
        }
    }

    #[must_use]
    pub fn status(&self) -> ValidationStatus {
        self.status
    }

    /// Record the validation verdict. Called exactly once per entry.
    pub fn resolve_status(&mut self, status: ValidationStatus) {
        debug_assert_eq!(
            self.status,
            ValidationStatus::Unchecked,
            "validation status set twice for `{}`",
            self.qualified_name
        );
        self.status = status;
    }

    /// Short display name: the last segment of the qualified path.
    #[must_use]
    pub fn name(&self) -> &str {
        self.qualified_name
            .rsplit('.')
            .next()
            .unwrap_or(&self.qualified_name)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_entry_kind_parse() {
        assert_eq!(EntryKind::parse("module"), Some(EntryKind::Module));
        assert_eq!(EntryKind::parse("class"), Some(EntryKind::Class));
        assert_eq!(EntryKind::parse("func"), Some(EntryKind::Function));
        assert_eq!(EntryKind::parse("method"), Some(EntryKind::Method));
        assert_eq!(EntryKind::parse("property"), Some(EntryKind::Property));
        assert_eq!(EntryKind::parse("udf"), Some(EntryKind::Udf));
        assert_eq!(EntryKind::parse("widget"), None);
    }

    #[test]
    fn test_callable_kinds() {
        assert!(EntryKind::Function.is_callable());
        assert!(EntryKind::Method.is_callable());
        assert!(EntryKind::Udf.is_callable());
        assert!(!EntryKind::Module.is_callable());
        assert!(!EntryKind::Class.is_callable());
        assert!(!EntryKind::Property.is_callable());
    }

    #[test]
    fn test_new_entry_is_unchecked() {
        let entry = ApiEntry::new("pkg.f", EntryKind::Function, "pkg", None, "doc");
        assert_eq!(entry.status(), ValidationStatus::Unchecked);
    }

    #[test]
    fn test_resolve_status_once() {
        let mut entry = ApiEntry::new("pkg.f", EntryKind::Function, "pkg", None, "doc");
        entry.resolve_status(ValidationStatus::Valid);
        assert_eq!(entry.status(), ValidationStatus::Valid);
    }

    #[test]
    #[should_panic(expected = "validation status set twice")]
    fn test_resolve_status_twice_panics() {
        let mut entry = ApiEntry::new("pkg.f", EntryKind::Function, "pkg", None, "doc");
        entry.resolve_status(ValidationStatus::Valid);
        entry.resolve_status(ValidationStatus::Invalid);
    }

    #[test]
    fn test_short_name() {
        let entry = ApiEntry::new("pkg.Table.insert", EntryKind::Method, "pkg", None, "");
        assert_eq!(entry.name(), "insert");

        let top = ApiEntry::new("pkg", EntryKind::Module, "pkg", None, "");
        assert_eq!(top.name(), "pkg");
    }
}
