//! Filesystem-backed reader for Python source trees.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use regex::Regex;

use mx_extract::{AllowedSymbol, EntryKind, ResolvedSymbol, SourceError, SourceReader, Variadic};

use crate::parse;

/// Resolves allow-listed symbols against a tree of `.py` files.
///
/// Resolution is static: `pkg.mod.symbol` maps to `pkg/mod.py` or
/// `pkg/mod/__init__.py` under the root, and the declaration is located by
/// scanning that file's text. Re-exports are invisible to this reader; an
/// allow-list row must name the defining module.
///
/// File contents are cached per reader, so resolving many symbols from the
/// same module reads it once. The reader is `Send + Sync` and safe to share
/// across a parallel extraction pass.
pub struct PySourceReader {
    root: PathBuf,
    cache: Mutex<HashMap<PathBuf, Arc<str>>>,
}

impl PySourceReader {
    /// Create a reader rooted at the directory containing the top-level
    /// package.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Map a dotted module path to its file, if one exists.
    fn module_file(&self, parts: &[&str]) -> Option<PathBuf> {
        if parts.is_empty() {
            return None;
        }
        let rel: PathBuf = parts.iter().collect();
        let direct = self.root.join(&rel).with_extension("py");
        if direct.is_file() {
            return Some(direct);
        }
        let init = self.root.join(&rel).join("__init__.py");
        init.is_file().then_some(init)
    }

    fn read(&self, path: &Path) -> Result<Arc<str>, SourceError> {
        let mut cache = self
            .cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(text) = cache.get(path) {
            return Ok(Arc::clone(text));
        }
        let text: Arc<str> = std::fs::read_to_string(path)?.into();
        cache.insert(path.to_owned(), Arc::clone(&text));
        Ok(text)
    }

    fn resolve_module(&self, symbol: &AllowedSymbol, parts: &[&str]) -> Result<ResolvedSymbol, SourceError> {
        let file = self
            .module_file(parts)
            .ok_or_else(|| SourceError::MissingEntry(symbol.qualified_name.clone()))?;
        let text = self.read(&file)?;

        Ok(ResolvedSymbol {
            signature: None,
            doc: parse::module_docstring(&text).unwrap_or_default(),
        })
    }

    fn resolve_class(&self, symbol: &AllowedSymbol, parts: &[&str]) -> Result<ResolvedSymbol, SourceError> {
        let (module, name) = split_last(parts)
            .ok_or_else(|| SourceError::MissingEntry(symbol.qualified_name.clone()))?;
        let file = self
            .module_file(module)
            .ok_or_else(|| SourceError::MissingEntry(symbol.qualified_name.clone()))?;
        let text = self.read(&file)?;

        let header = find_class(&text, name)
            .ok_or_else(|| SourceError::MissingEntry(symbol.qualified_name.clone()))?;
        let (_, header_end) = parse::header_colon(&text, header.name_end).ok_or_else(|| {
            SourceError::Unparsable {
                name: symbol.qualified_name.clone(),
                reason: "class header has no terminating colon".to_owned(),
            }
        })?;

        Ok(ResolvedSymbol {
            signature: None,
            doc: parse::extract_docstring(&text, header_end).unwrap_or_default(),
        })
    }

    fn resolve_function(&self, symbol: &AllowedSymbol, parts: &[&str]) -> Result<ResolvedSymbol, SourceError> {
        let (module, name) = split_last(parts)
            .ok_or_else(|| SourceError::MissingEntry(symbol.qualified_name.clone()))?;
        let file = self
            .module_file(module)
            .ok_or_else(|| SourceError::MissingEntry(symbol.qualified_name.clone()))?;
        let text = self.read(&file)?;

        resolve_def(symbol, &text, 0..text.len(), name, false)
    }

    fn resolve_member(&self, symbol: &AllowedSymbol, parts: &[&str]) -> Result<ResolvedSymbol, SourceError> {
        let (rest, name) = split_last(parts)
            .ok_or_else(|| SourceError::MissingEntry(symbol.qualified_name.clone()))?;
        let (module, class_name) = split_last(rest)
            .ok_or_else(|| SourceError::MissingEntry(symbol.qualified_name.clone()))?;
        let file = self
            .module_file(module)
            .ok_or_else(|| SourceError::MissingEntry(symbol.qualified_name.clone()))?;
        let text = self.read(&file)?;

        let class = find_class(&text, class_name)
            .ok_or_else(|| SourceError::MissingEntry(symbol.qualified_name.clone()))?;
        let block = class_block(&text, class.line_start);

        resolve_def(symbol, &text, block, name, true)
    }
}

/// Locate a `def` within `range` and extract signature plus docstring.
fn resolve_def(
    symbol: &AllowedSymbol,
    text: &str,
    range: std::ops::Range<usize>,
    name: &str,
    nested: bool,
) -> Result<ResolvedSymbol, SourceError> {
    let open = find_def(&text[range.clone()], name, nested)
        .map(|o| range.start + o)
        .ok_or_else(|| SourceError::MissingEntry(symbol.qualified_name.clone()))?;

    let (mut signature, header_end) =
        parse::parse_signature(text, open).ok_or_else(|| SourceError::Unparsable {
            name: symbol.qualified_name.clone(),
            reason: "declaration header has no terminating colon".to_owned(),
        })?;

    // Bound receivers are implementation detail, not API surface.
    if nested
        && signature
            .params
            .first()
            .is_some_and(|p| p.variadic == Variadic::None && (p.name == "self" || p.name == "cls"))
    {
        signature.params.remove(0);
    }

    let signature = (symbol.kind != EntryKind::Property).then_some(signature);

    Ok(ResolvedSymbol {
        signature,
        doc: parse::extract_docstring(text, header_end).unwrap_or_default(),
    })
}

impl SourceReader for PySourceReader {
    fn resolve(&self, symbol: &AllowedSymbol) -> Result<ResolvedSymbol, SourceError> {
        let parts: Vec<&str> = symbol.qualified_name.split('.').collect();
        let resolved = match symbol.kind {
            EntryKind::Module => self.resolve_module(symbol, &parts),
            EntryKind::Class => self.resolve_class(symbol, &parts),
            EntryKind::Function | EntryKind::Udf => self.resolve_function(symbol, &parts),
            EntryKind::Method | EntryKind::Property => self.resolve_member(symbol, &parts),
        };
        if let Err(err) = &resolved {
            tracing::debug!(symbol = %symbol.qualified_name, error = %err, "resolution failed");
        }
        resolved
    }
}

/// A located class header.
struct ClassHeader {
    /// Offset of the start of the `class` line.
    line_start: usize,
    /// Offset just past the class name.
    name_end: usize,
}

fn split_last<'a>(parts: &'a [&'a str]) -> Option<(&'a [&'a str], &'a str)> {
    let (last, rest) = parts.split_last()?;
    (!rest.is_empty()).then_some((rest, *last))
}

fn find_class(text: &str, name: &str) -> Option<ClassHeader> {
    let pattern = format!(r"(?m)^class[ \t]+{}\b", regex::escape(name));
    let re = Regex::new(&pattern).ok()?;
    let m = re.find(text)?;
    Some(ClassHeader {
        line_start: m.start(),
        name_end: m.end(),
    })
}

/// The extent of a class body: from the header line to the next line that
/// starts in column zero with real content.
fn class_block(text: &str, line_start: usize) -> std::ops::Range<usize> {
    let header_line_end = text[line_start..]
        .find('\n')
        .map_or(text.len(), |i| line_start + i + 1);

    let re = match Regex::new(r"(?m)^\S") {
        Ok(re) => re,
        Err(_) => return line_start..text.len(),
    };
    let end = re
        .find_at(text, header_line_end)
        .map_or(text.len(), |m| m.start());
    line_start..end
}

/// Find the offset of the open paren of `def name(` within `text`.
///
/// `nested` requires indentation (a class member); otherwise the `def`
/// must start in column zero.
fn find_def(text: &str, name: &str, nested: bool) -> Option<usize> {
    let indent = if nested { r"[ \t]+" } else { "" };
    let pattern = format!(
        r"(?m)^{indent}(?:async[ \t]+)?def[ \t]+{}[ \t]*\(",
        regex::escape(name)
    );
    let re = Regex::new(&pattern).ok()?;
    Some(re.find(text)?.end() - 1)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use mx_extract::{AllowedSymbol, EntryKind, SourceError, SourceReader};

    use super::*;

    const MODULE: &str = r#""""Films package.

Core table operations.
"""

__all__ = ['create_table', 'Table']


def create_table(name: str, *, num_rows: int = 0) -> 'Table':
    """Create a new table.

    Example:

    ```python
    t = create_table('films')
    ```
    """
    return Table(name)


def _private_helper():
    """Never documented."""


class Table:
    """A handle to a stored table."""

    def insert(self, rows: list, print_stats: bool = False) -> int:
        """Insert rows into the table."""
        return len(rows)

    @property
    def name(self) -> str:
        """The table's name."""
        return self._name


def tail(n: int = 10):
    return n
"#;

    fn tree() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        let pkg = dir.path().join("pkg");
        fs::create_dir_all(pkg.join("functions")).unwrap();
        fs::write(pkg.join("__init__.py"), MODULE).unwrap();
        fs::write(
            pkg.join("functions").join("string.py"),
            "\"\"\"String functions.\"\"\"\n\ndef lower(s: str) -> str:\n    \"\"\"Lowercase.\"\"\"\n    return s.lower()\n",
        )
        .unwrap();
        dir
    }

    fn symbol(kind: EntryKind, name: &str) -> AllowedSymbol {
        AllowedSymbol {
            kind,
            qualified_name: name.to_owned(),
        }
    }

    fn reader(dir: &Path) -> PySourceReader {
        PySourceReader::new(dir)
    }

    #[test]
    fn test_resolve_module_docstring() {
        let dir = tree();
        let resolved = reader(dir.path())
            .resolve(&symbol(EntryKind::Module, "pkg"))
            .unwrap();

        assert!(resolved.signature.is_none());
        assert_eq!(resolved.doc, "Films package.\n\nCore table operations.");
    }

    #[test]
    fn test_resolve_submodule_file() {
        let dir = tree();
        let resolved = reader(dir.path())
            .resolve(&symbol(EntryKind::Module, "pkg.functions.string"))
            .unwrap();
        assert_eq!(resolved.doc, "String functions.");
    }

    #[test]
    fn test_resolve_function_signature_and_doc() {
        let dir = tree();
        let resolved = reader(dir.path())
            .resolve(&symbol(EntryKind::Function, "pkg.create_table"))
            .unwrap();

        let sig = resolved.signature.unwrap();
        assert_eq!(sig.params.len(), 2);
        assert_eq!(sig.params[0].name, "name");
        assert_eq!(sig.params[1].name, "num_rows");
        assert_eq!(sig.params[1].default.as_deref(), Some("0"));
        assert_eq!(sig.return_type.as_deref(), Some("'Table'"));
        assert!(resolved.doc.starts_with("Create a new table."));
        assert!(resolved.doc.contains("```python"));
    }

    #[test]
    fn test_resolve_function_in_submodule() {
        let dir = tree();
        let resolved = reader(dir.path())
            .resolve(&symbol(EntryKind::Udf, "pkg.functions.string.lower"))
            .unwrap();
        assert_eq!(resolved.doc, "Lowercase.");
    }

    #[test]
    fn test_resolve_class_doc() {
        let dir = tree();
        let resolved = reader(dir.path())
            .resolve(&symbol(EntryKind::Class, "pkg.Table"))
            .unwrap();

        assert!(resolved.signature.is_none());
        assert_eq!(resolved.doc, "A handle to a stored table.");
    }

    #[test]
    fn test_resolve_method_drops_receiver() {
        let dir = tree();
        let resolved = reader(dir.path())
            .resolve(&symbol(EntryKind::Method, "pkg.Table.insert"))
            .unwrap();

        let sig = resolved.signature.unwrap();
        let names: Vec<&str> = sig.params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["rows", "print_stats"]);
        assert_eq!(resolved.doc, "Insert rows into the table.");
    }

    #[test]
    fn test_resolve_property_has_no_signature() {
        let dir = tree();
        let resolved = reader(dir.path())
            .resolve(&symbol(EntryKind::Property, "pkg.Table.name"))
            .unwrap();

        assert!(resolved.signature.is_none());
        assert_eq!(resolved.doc, "The table's name.");
    }

    #[test]
    fn test_function_without_docstring() {
        let dir = tree();
        let resolved = reader(dir.path())
            .resolve(&symbol(EntryKind::Function, "pkg.tail"))
            .unwrap();
        assert_eq!(resolved.doc, "");
    }

    #[test]
    fn test_missing_symbol() {
        let dir = tree();
        let err = reader(dir.path())
            .resolve(&symbol(EntryKind::Function, "pkg.does_not_exist"))
            .unwrap_err();
        assert!(matches!(err, SourceError::MissingEntry(name) if name == "pkg.does_not_exist"));
    }

    #[test]
    fn test_missing_module() {
        let dir = tree();
        let err = reader(dir.path())
            .resolve(&symbol(EntryKind::Module, "nope"))
            .unwrap_err();
        assert!(matches!(err, SourceError::MissingEntry(_)));
    }

    #[test]
    fn test_method_outside_class_not_found() {
        // `tail` is a module-level function; resolving it as a method of
        // Table must fail rather than match the top-level def.
        let dir = tree();
        let err = reader(dir.path())
            .resolve(&symbol(EntryKind::Method, "pkg.Table.tail"))
            .unwrap_err();
        assert!(matches!(err, SourceError::MissingEntry(_)));
    }

    #[test]
    fn test_class_block_bounds() {
        let start = MODULE.find("class Table").unwrap();
        let block = class_block(MODULE, start);
        let body = &MODULE[block];

        assert!(body.contains("def insert"));
        assert!(!body.contains("def tail"));
    }

    #[test]
    fn test_find_def_requires_column_zero_when_top_level() {
        assert!(find_def(MODULE, "insert", false).is_none());
        assert!(find_def(MODULE, "insert", true).is_some());
    }
}
