//! Python source tree reader for the MX documentation compiler.
//!
//! Implements the [`SourceReader`](mx_extract::SourceReader) boundary for a
//! tree of Python files, statically: declarations are located by scanning
//! the module file a qualified name maps to, never by importing code.
//! `pkg.mod.symbol` resolves against `pkg/mod.py` or `pkg/mod/__init__.py`;
//! class members resolve within the class's indentation block.
//!
//! The reader extracts three things per symbol: the parenthesized signature
//! text (split into the closed parameter model with nesting- and
//! string-aware comma handling), the `->` return annotation, and the
//! docstring immediately following the declaration, dedented the way
//! Python's `inspect.cleandoc` does.

mod parse;
mod reader;

pub use reader::PySourceReader;
