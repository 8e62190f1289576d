//! Public API surface extraction for the MX documentation compiler.
//!
//! The public surface of a documented package is declared, not inferred: an
//! OPML allow-list names every symbol that gets a documentation page, and
//! source-level visibility is never consulted. This crate provides:
//!
//! - [`Allowlist`]: the parsed allow-list, in author-declared order
//! - [`SourceReader`]: the boundary trait a source backend implements to
//!   resolve one allow-listed symbol to its signature and raw docstring
//! - [`Extractor`]: walks the allow-list against a reader, collecting
//!   missing symbols instead of short-circuiting
//! - [`Registry`]: the append-only, deduplicated collection of extracted
//!   entries built once per run
//!
//! A duplicate qualified name is a build-configuration defect and aborts
//! extraction immediately; a missing symbol is a content defect and is
//! reported at the end of the run.

mod allowlist;
mod entry;
mod extractor;
#[cfg(feature = "mock")]
mod mock;
mod registry;
mod source;

pub use allowlist::{Allowlist, AllowlistError, AllowGroup, AllowedSymbol};
pub use entry::{ApiEntry, EntryKind, Param, Signature, ValidationStatus, Variadic};
pub use extractor::{ExtractOutcome, Extractor, MissingEntry};
#[cfg(feature = "mock")]
pub use mock::MockSourceReader;
pub use registry::{Registry, RegistryError};
pub use source::{ResolvedSymbol, SourceError, SourceReader};
