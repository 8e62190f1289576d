//! MDX page rendering for the MX documentation compiler.
//!
//! A pure map from the validated registry to one [`Page`] per category, in
//! the order categories were declared. Within a page, entries render in
//! declaration order: heading, optional source link, fenced signature
//! block, then the raw validated docstring. Entries that failed validation
//! render a placeholder stub instead of their text, so the exact bytes
//! that would corrupt the renderer never reach the output.
//!
//! Rendering is deterministic: identical registry and issue input produces
//! byte-identical pages, which is what makes diff-based regression testing
//! of generated docs possible.

mod page;
mod signature;
mod summary;

pub use page::{Page, Renderer, RendererConfig};
pub use signature::format_signature;
