//! OPML allow-list parsing.
//!
//! The allow-list is an OPML document whose `outline` elements carry a
//! `text` attribute of the form `kind|qualified.path`. Top-level outlines
//! open a navigation group (normally a module); nested outlines add the
//! group's symbols in document order, which is the order pages and sections
//! are emitted in. Malformed outlines are skipped with a warning rather
//! than failing the run; the allow-list is hand-maintained and a single bad
//! row should not hide the rest of the report.

use std::io::BufRead;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::entry::EntryKind;

/// Error parsing an allow-list document.
#[derive(Debug, thiserror::Error)]
pub enum AllowlistError {
    #[error("failed to read allow-list: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML parsing failed: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("allow-list declares no symbols")]
    Empty,
}

/// One allow-listed symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedSymbol {
    pub kind: EntryKind,
    pub qualified_name: String,
}

/// A navigation group: a top-level outline and everything nested under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowGroup {
    /// Group label, the top-level outline's qualified path.
    pub title: String,
    /// Symbols in document order, the top-level symbol first.
    pub symbols: Vec<AllowedSymbol>,
}

/// The parsed allow-list, in author-declared order.
///
/// This is the sole truth for "public": symbols present in source but not
/// listed here are never documented.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Allowlist {
    pub groups: Vec<AllowGroup>,
}

impl Allowlist {
    /// Load and parse an allow-list file.
    pub fn load(path: &Path) -> Result<Self, AllowlistError> {
        let xml = std::fs::read_to_string(path)?;
        Self::parse(&xml)
    }

    /// Parse an OPML allow-list document.
    ///
    /// # Errors
    ///
    /// Returns [`AllowlistError::Xml`] on malformed XML and
    /// [`AllowlistError::Empty`] when no symbol survives parsing.
    pub fn parse(xml: &str) -> Result<Self, AllowlistError> {
        let mut reader = Reader::from_str(xml);
        let mut groups: Vec<AllowGroup> = Vec::new();
        let mut depth = 0usize;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) if e.name().as_ref() == b"outline" => {
                    handle_outline(&reader, &e, depth, &mut groups);
                    depth += 1;
                }
                Event::Empty(e) if e.name().as_ref() == b"outline" => {
                    handle_outline(&reader, &e, depth, &mut groups);
                }
                Event::End(e) if e.name().as_ref() == b"outline" => {
                    depth = depth.saturating_sub(1);
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if groups.iter().all(|g| g.symbols.is_empty()) {
            return Err(AllowlistError::Empty);
        }
        Ok(Self { groups })
    }

    /// Total number of allow-listed symbols.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.iter().map(|g| g.symbols.len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn handle_outline<R: BufRead>(
    reader: &Reader<R>,
    e: &BytesStart,
    depth: usize,
    groups: &mut Vec<AllowGroup>,
) {
    let Some(text) = text_attr(reader, e) else {
        tracing::warn!("outline without a text attribute, skipping");
        return;
    };

    let Some((tag, path)) = text.split_once('|') else {
        tracing::warn!(text = %text, "outline text has no `kind|path` separator, skipping");
        return;
    };

    let Some(kind) = EntryKind::parse(tag) else {
        tracing::warn!(kind = %tag, path = %path, "unknown symbol kind, skipping");
        return;
    };

    let symbol = AllowedSymbol {
        kind,
        qualified_name: path.to_owned(),
    };

    if depth == 0 || groups.is_empty() {
        groups.push(AllowGroup {
            title: path.to_owned(),
            symbols: vec![symbol],
        });
    } else if let Some(group) = groups.last_mut() {
        group.symbols.push(symbol);
    }
}

fn text_attr<R: BufRead>(reader: &Reader<R>, e: &BytesStart) -> Option<String> {
    for attr in e.attributes().flatten() {
        let key = reader.decoder().decode(attr.key.as_ref()).map_or_else(
            |_| String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
            std::borrow::Cow::into_owned,
        );
        if key == "text" {
            let value = attr.unescape_value().map_or_else(
                |_| String::from_utf8_lossy(&attr.value).into_owned(),
                std::borrow::Cow::into_owned,
            );
            return Some(value);
        }
    }
    None
}
