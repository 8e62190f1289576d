//! The source reader boundary.
//!
//! The core never walks a source tree itself; a [`SourceReader`] backend
//! resolves one allow-listed symbol at a time. Backends live in their own
//! crates (the Python filesystem reader) or behind the `mock` feature for
//! tests.

use crate::allowlist::AllowedSymbol;
use crate::entry::Signature;

/// A resolved declaration: signature (for callables) plus raw docstring.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolvedSymbol {
    pub signature: Option<Signature>,
    /// Docstring text, verbatim, empty when the declaration has none.
    pub doc: String,
}

/// Error resolving one symbol.
///
/// Resolution failures are recoverable at pipeline level: the extractor
/// collects them per entry and the run continues.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The allow-listed symbol has no matching declaration.
    #[error("symbol `{0}` not found in the source tree")]
    MissingEntry(String),

    /// The declaration was found but its signature text is malformed.
    #[error("could not parse the declaration of `{name}`: {reason}")]
    Unparsable { name: String, reason: String },

    #[error("I/O error reading source: {0}")]
    Io(#[from] std::io::Error),
}

/// Resolves allow-listed symbols to their declarations.
pub trait SourceReader: Send + Sync {
    /// Look up one symbol.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::MissingEntry`] when the symbol has no
    /// declaration, or another [`SourceError`] when the declaration cannot
    /// be read.
    fn resolve(&self, symbol: &AllowedSymbol) -> Result<ResolvedSymbol, SourceError>;
}
