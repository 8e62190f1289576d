//! Pipeline orchestration for the MX documentation compiler.
//!
//! One batch invocation: extract the allow-listed surface, build the
//! registry (duplicate names abort before anything renders), validate
//! every docstring in parallel, render the page set, and assemble the
//! navigation document. Recoverable problems (validation issues, missing
//! symbols) are aggregated into the [`BuildReport`] and surfaced at the
//! end of the run; fatal defects stop the run where they are detected.
//!
//! [`write_tree`] lays the artifacts out on disk:
//!
//! ```text
//! <out>/sdk/latest/<slug>.mdx   one file per page
//! <out>/docs.json               navigation document
//! <out>/issues.json             machine-readable issue report
//! ```
//!
//! Publishing the tree anywhere is a collaborator's job; nothing here
//! touches the network.

mod builder;
mod writer;

pub use builder::{BuildError, BuildReport, Builder, CheckReport, IssueRecord, MissingRecord};
pub use writer::write_tree;
