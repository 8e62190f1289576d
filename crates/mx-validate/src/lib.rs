//! Structural docstring validation for the MX documentation compiler.
//!
//! Docstrings are published through a strict MDX renderer that fails in
//! non-obvious ways on a handful of structural hazards: code fences glued to
//! the end of a signature line, fences that never close, unclosed void
//! elements, REPL transcripts outside fences. Each hazard is unconditionally
//! invalid in the target renderer, so every rule here is blocking and there
//! is no warning tier to tune.
//!
//! [`validate`] runs the full closed rule set over one docstring and returns
//! every issue found. Rules are independent byte-stream scans, not a grammar
//! parse; the only stateful piece is the fence scanner that tracks which
//! byte ranges are inside fenced code blocks.
//!
//! # Example
//!
//! ```
//! use mx_validate::{RuleKind, validate};
//!
//! let issues = validate("pkg.example", "example(\n  x=1\n)```");
//! assert_eq!(issues.len(), 1);
//! assert_eq!(issues[0].rule, RuleKind::FenceAttachedToDelimiter);
//! ```

mod fence;
mod rules;

use serde::Serialize;

pub use fence::FenceMap;

/// The closed set of structural rules.
///
/// Every rule is blocking: an entry with any issue is invalid. The variants
/// mirror the failure modes of the target renderer, each deterministic and
/// free of tuning thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum RuleKind {
    /// A line ends with `)`, `}` or `]` directly followed by a fence marker.
    FenceAttachedToDelimiter,
    /// A fence was opened but never closed before end of text.
    UnbalancedFence,
    /// A closing fence line directly followed by an opening fence line.
    AdjacentDoubleFence,
    /// An odd number of lone backticks outside fenced blocks, or an escaped
    /// backtick glued to an unescaped one.
    UnpairedInlineDelimiter,
    /// A void element (`<img>`-class) opened without `/>` or a close tag.
    NonSelfClosingTag,
    /// Escaped brackets where a `[text][ref]` reference link was intended.
    EscapedLinkBracket,
    /// A `>>>` prompt line outside any fenced code block.
    BrokenReplContinuation,
}

impl RuleKind {
    /// Stable machine-readable name, used in issue dumps.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FenceAttachedToDelimiter => "fence-attached-to-delimiter",
            Self::UnbalancedFence => "unbalanced-fence",
            Self::AdjacentDoubleFence => "adjacent-double-fence",
            Self::UnpairedInlineDelimiter => "unpaired-inline-delimiter",
            Self::NonSelfClosingTag => "non-self-closing-tag",
            Self::EscapedLinkBracket => "escaped-link-bracket",
            Self::BrokenReplContinuation => "broken-repl-continuation",
        }
    }
}

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One structural issue found in a docstring.
///
/// Created only by [`validate`]; immutable afterwards. `start..end` is the
/// byte range of the offending text within the raw docstring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// Qualified name of the entry the docstring belongs to.
    pub entry: String,
    /// Which rule fired.
    pub rule: RuleKind,
    /// Byte offset of the start of the offending range.
    pub start: usize,
    /// Byte offset one past the end of the offending range.
    pub end: usize,
    /// Human-readable description.
    pub message: String,
}

/// Run every rule over one docstring and collect all issues.
///
/// All applicable rules run over the full text; nothing short-circuits on
/// the first match. The result is ordered by byte offset, then by rule, so
/// identical input always produces an identical issue list.
#[must_use]
pub fn validate(entry: &str, text: &str) -> Vec<ValidationIssue> {
    let map = FenceMap::scan(text);
    let mut issues = rules::scan_all(entry, text, &map);
    issues.sort_by(|a, b| (a.start, a.rule).cmp(&(b.start, b.rule)));
    issues
}

/// Translate a byte offset into a 1-based (line, column) pair.
///
/// Columns count bytes within the line, which is what editors and the issue
/// report expect for the ASCII-dominated docstrings this tool handles.
#[must_use]
pub fn line_col(text: &str, offset: usize) -> (usize, usize) {
    let clamped = offset.min(text.len());
    let before = &text[..clamped];
    let line = before.bytes().filter(|&b| b == b'\n').count() + 1;
    let column = clamped - before.rfind('\n').map_or(0, |i| i + 1) + 1;
    (line, column)
}
