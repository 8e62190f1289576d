//! Navigation manifest and version path rewriting.
//!
//! The renderer's page set becomes a docs.json-shaped navigation document:
//! one tab, one `latest` dropdown, one group per page. Page paths carry the
//! fixed [`PATH_TOKEN`] placeholder so that a single build can be published
//! under any number of version- or PR-scoped prefixes: the
//! [`VersionPathRewriter`] walks the serialized document and prepends the
//! concrete prefix to every placeholder occurrence.
//!
//! Rewriting is idempotent (an occurrence already carrying the prefix is
//! left alone) and total (a document with no occurrence at all is a build
//! defect and fails loudly).

mod navigation;
mod rewrite;

pub use navigation::{Dropdown, NavGroup, Navigation, VersionManifest};
pub use rewrite::{RewriteError, VersionPathRewriter};

/// The placeholder path segment baked into generated navigation.
pub const PATH_TOKEN: &str = "sdk/latest/";
