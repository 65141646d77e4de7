use std::fmt;
use std::ptr::NonNull;
use std::{slice, str};

use crate::grammar::Grammar;

pub(crate) enum QueryData {}

/// A compiled set of S-expression patterns.
///
/// A query is bound to the [`Grammar`] it was compiled against and can only
/// run on trees parsed with that grammar. The pattern source is retained for
/// the life of the query. References to a query can be shared freely; the
/// engine only ever reads the compiled handle.
#[derive(Debug)]
pub struct Query {
    pub(crate) raw: NonNull<QueryData>,
    num_captures: u32,
    text: Box<str>,
}

unsafe impl Send for Query {}
unsafe impl Sync for Query {}

impl Query {
    /// Compile `source` against `grammar`.
    ///
    /// A malformed pattern never aborts: it is reported as a [`QueryError`]
    /// carrying the byte offset of the problem and its [`QueryErrorKind`], so
    /// callers can surface positioned diagnostics.
    pub fn new(grammar: Grammar, source: &str) -> Result<Query, QueryError> {
        assert!(
            source.len() <= i32::MAX as usize,
            "query sources must be smaller than 2 GiB"
        );
        let bytes = source.as_bytes();
        let mut error_offset = 0u32;
        let mut error_kind = RawQueryError::None;
        let raw = unsafe {
            ts_query_new(
                grammar,
                bytes.as_ptr(),
                bytes.len() as u32,
                &mut error_offset,
                &mut error_kind,
            )
        };
        let Some(raw) = raw else {
            return Err(QueryError::new(source, error_offset as usize, error_kind));
        };
        let num_captures = unsafe { ts_query_capture_count(raw) };
        Ok(Query {
            raw,
            num_captures,
            text: source.into(),
        })
    }

    /// The pattern source this query was compiled from.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The number of alternative patterns in the query.
    pub fn pattern_count(&self) -> usize {
        unsafe { ts_query_pattern_count(self.raw) as usize }
    }

    /// The byte offset where pattern `pattern_index` starts in
    /// [`Query::text`].
    pub fn start_byte_for_pattern(&self, pattern_index: usize) -> usize {
        assert!(
            pattern_index < self.pattern_count(),
            "pattern index {pattern_index} out of range"
        );
        unsafe { ts_query_start_byte_for_pattern(self.raw, pattern_index as u32) as usize }
    }

    /// The number of capture names declared across all patterns.
    pub fn capture_count(&self) -> u32 {
        self.num_captures
    }

    /// The name of capture `index`, as written in the pattern (without the
    /// `@`).
    pub fn capture_name(&self, index: u32) -> &str {
        // the C api does not bounds check
        assert!(index < self.num_captures, "invalid capture index {index}");
        unsafe {
            let mut length = 0;
            let ptr = ts_query_capture_name_for_id(self.raw, index, &mut length);
            let name = slice::from_raw_parts(ptr, length as usize);
            // safety: capture names are substrings of the utf-8 source and
            // the engine slices them at codepoint boundaries
            str::from_utf8_unchecked(name)
        }
    }

    /// All capture names, in declaration order.
    pub fn capture_names(&self) -> impl ExactSizeIterator<Item = &str> {
        (0..self.num_captures).map(|index| self.capture_name(index))
    }

    /// Find the index of the capture named `name`, if any pattern declares
    /// it.
    pub fn capture_index(&self, name: &str) -> Option<u32> {
        (0..self.num_captures).find(|&index| self.capture_name(index) == name)
    }
}

impl Drop for Query {
    fn drop(&mut self) {
        unsafe { ts_query_delete(self.raw) }
    }
}

/// Why pattern compilation failed, and where.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} error in query at row {row}, column {column} (offset {offset})")]
pub struct QueryError {
    /// Byte offset of the problem within the pattern source.
    pub offset: usize,
    /// Zero-based row the offset falls on.
    pub row: usize,
    /// Zero-based column (in codepoints) within that row.
    pub column: usize,
    pub kind: QueryErrorKind,
}

impl QueryError {
    fn new(source: &str, offset: usize, raw: RawQueryError) -> QueryError {
        let offset = offset.min(source.len());
        let (row, line) = source[..offset]
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .enumerate()
            .last()
            .unwrap_or((0, ""));
        let kind = match raw {
            RawQueryError::Syntax => QueryErrorKind::Syntax,
            RawQueryError::NodeType => QueryErrorKind::NodeType,
            RawQueryError::Field => QueryErrorKind::Field,
            RawQueryError::Capture => QueryErrorKind::Capture,
            RawQueryError::Structure => QueryErrorKind::Structure,
            RawQueryError::None => {
                unreachable!("the engine returned a null query without setting an error")
            }
            RawQueryError::Language => {
                unreachable!("grammar compatibility is checked when the grammar is obtained")
            }
        };
        QueryError {
            offset,
            row,
            column: line.chars().count(),
            kind,
        }
    }
}

/// The closed set of reasons pattern compilation can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryErrorKind {
    /// The pattern is not a well-formed S-expression.
    Syntax,
    /// The pattern names a node type the grammar does not define.
    NodeType,
    /// The pattern names a field the grammar does not define.
    Field,
    /// A predicate references a capture no pattern declares.
    Capture,
    /// The pattern's structure can never match.
    Structure,
}

impl fmt::Display for QueryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QueryErrorKind::Syntax => "syntax",
            QueryErrorKind::NodeType => "node type",
            QueryErrorKind::Field => "field",
            QueryErrorKind::Capture => "capture",
            QueryErrorKind::Structure => "structure",
        };
        f.write_str(name)
    }
}

#[repr(C)]
enum RawQueryError {
    None = 0,
    Syntax = 1,
    NodeType = 2,
    Field = 3,
    Capture = 4,
    Structure = 5,
    Language = 6,
}

extern "C" {
    /// Compile one or more S-expression patterns against a grammar. On
    /// failure returns null and writes the byte offset and kind of the error
    /// through the out parameters.
    fn ts_query_new(
        grammar: Grammar,
        source: *const u8,
        source_len: u32,
        error_offset: &mut u32,
        error_type: &mut RawQueryError,
    ) -> Option<NonNull<QueryData>>;
    /// Delete a query, freeing all of the memory that it used.
    fn ts_query_delete(query: NonNull<QueryData>);
    /// Get the number of patterns in the query.
    fn ts_query_pattern_count(query: NonNull<QueryData>) -> u32;
    /// Get the number of captures in the query.
    fn ts_query_capture_count(query: NonNull<QueryData>) -> u32;
    /// Get the byte offset where the given pattern starts in the query's
    /// source.
    fn ts_query_start_byte_for_pattern(query: NonNull<QueryData>, pattern_index: u32) -> u32;
    /// Get the name and length of one of the query's captures.
    fn ts_query_capture_name_for_id(
        query: NonNull<QueryData>,
        index: u32,
        length: &mut u32,
    ) -> *const u8;
}
