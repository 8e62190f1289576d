//! In-memory source reader for tests.

use std::collections::HashMap;

use crate::allowlist::AllowedSymbol;
use crate::entry::Signature;
use crate::source::{ResolvedSymbol, SourceError, SourceReader};

/// Builder-style mock backend mapping qualified names to declarations.
#[derive(Debug, Default)]
pub struct MockSourceReader {
    symbols: HashMap<String, ResolvedSymbol>,
}

impl MockSourceReader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a symbol with a docstring and no signature.
    #[must_use]
    pub fn with_doc(mut self, name: &str, doc: &str) -> Self {
        self.symbols.insert(
            name.to_owned(),
            ResolvedSymbol {
                signature: None,
                doc: doc.to_owned(),
            },
        );
        self
    }

    /// Register a callable symbol with a signature and docstring.
    #[must_use]
    pub fn with_symbol(mut self, name: &str, signature: Signature, doc: &str) -> Self {
        self.symbols.insert(
            name.to_owned(),
            ResolvedSymbol {
                signature: Some(signature),
                doc: doc.to_owned(),
            },
        );
        self
    }
}

impl SourceReader for MockSourceReader {
    fn resolve(&self, symbol: &AllowedSymbol) -> Result<ResolvedSymbol, SourceError> {
        self.symbols
            .get(&symbol.qualified_name)
            .cloned()
            .ok_or_else(|| SourceError::MissingEntry(symbol.qualified_name.clone()))
    }
}
