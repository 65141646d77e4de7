//! Safe, lifetime-aware bindings over the native tree-sitter parsing and
//! query engine.
//!
//! The engine hands out raw handles for parsers, trees, queries and query
//! cursors; this crate wraps each in an owning type that frees the handle
//! exactly once, and exposes tree positions as [`SyntaxTreeNode`] views that
//! borrow their [`SyntaxTree`] so they cannot outlive it. Navigation that has
//! no target (the parent of the root, an out-of-range child index) returns
//! `None` instead of a poisoned value.
//!
//! Grammars are process-wide: once obtained through [`Grammar::new`] or
//! [`Grammar::from_raw`] a handle stays valid forever and can be shared by
//! any number of parsers and queries.

mod grammar;
mod parser;
mod query;
mod query_cursor;
mod syntax_tree;
mod syntax_tree_node;

pub use grammar::{
    Grammar, GrammarData, GrammarLoadError, IncompatibleGrammarError, LANGUAGE_VERSION,
    MIN_COMPATIBLE_LANGUAGE_VERSION,
};
pub use parser::{InvalidRangesError, ParseError, Parser};
pub use query::{Query, QueryError, QueryErrorKind};
pub use query_cursor::{InactiveQueryCursor, QueryCapture, QueryCursor, QueryMatch};
pub use syntax_tree::{InputEdit, SyntaxTree};
pub use syntax_tree_node::SyntaxTreeNode;

/// A (row, column) position in source text. Ordering is row-major.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Point {
    pub row: u32,
    pub col: u32,
}

/// A contiguous span of source text, in both byte and point coordinates.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Range {
    pub start_point: Point,
    pub end_point: Point,
    pub start_byte: u32,
    pub end_byte: u32,
}
