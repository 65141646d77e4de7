use std::ptr::NonNull;

use crate::grammar::{Grammar, IncompatibleGrammarError};
use crate::syntax_tree::{SyntaxTree, SyntaxTreeData};
use crate::Range;

// opaque data
enum ParserData {}

/// A stateful handle on one native parsing session.
///
/// A parser is bound to at most one [`Grammar`] at a time and produces
/// [`SyntaxTree`]s. Parsing is blocking and CPU-bound; one instance must not
/// be driven from several threads at once (the `&mut self` receivers enforce
/// this), but distinct parsers are independent.
pub struct Parser {
    ptr: NonNull<ParserData>,
}

impl Parser {
    /// Create a new parser with no grammar assigned.
    #[must_use]
    pub fn new() -> Parser {
        Parser {
            ptr: unsafe { ts_parser_new() },
        }
    }

    /// Bind `grammar` for subsequent parses.
    ///
    /// Rebinding is allowed at any time and only affects parses issued after
    /// the call; trees produced earlier keep their original grammar.
    pub fn set_grammar(&mut self, grammar: Grammar) -> Result<(), IncompatibleGrammarError> {
        let success = unsafe { ts_parser_set_language(self.ptr, grammar) };
        if success {
            Ok(())
        } else {
            Err(IncompatibleGrammarError {
                version: grammar.version(),
            })
        }
    }

    /// The grammar currently assigned, if any.
    pub fn grammar(&self) -> Option<Grammar> {
        unsafe { ts_parser_language(self.ptr) }
    }

    /// Restrict parsing to `ranges` of the input, which must be sorted and
    /// non-overlapping. An empty slice restores whole-document parsing.
    pub fn set_included_ranges(&mut self, ranges: &[Range]) -> Result<(), InvalidRangesError> {
        let success = unsafe {
            ts_parser_set_included_ranges(self.ptr, ranges.as_ptr(), ranges.len() as u32)
        };
        if success {
            Ok(())
        } else {
            Err(InvalidRangesError)
        }
    }

    /// Parse `text` into a new [`SyntaxTree`].
    ///
    /// When `old_tree` is given and was kept in sync with the text through
    /// [`SyntaxTree::edit`], subtrees outside the edited ranges are reused
    /// instead of reparsed. Parsing with no grammar assigned is rejected.
    pub fn parse(
        &mut self,
        text: impl AsRef<[u8]>,
        old_tree: Option<&SyntaxTree>,
    ) -> Result<SyntaxTree, ParseError> {
        let text = text.as_ref();
        assert!(
            text.len() <= u32::MAX as usize,
            "the engine addresses input with 32-bit offsets"
        );
        if self.grammar().is_none() {
            return Err(ParseError::NoGrammar);
        }
        let raw = unsafe {
            ts_parser_parse_string(
                self.ptr,
                old_tree.map(|tree| tree.as_raw()),
                text.as_ptr(),
                text.len() as u32,
            )
        };
        match raw {
            Some(raw) => Ok(unsafe { SyntaxTree::from_raw(raw) }),
            None => Err(ParseError::NoTree),
        }
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

unsafe impl Send for Parser {}
unsafe impl Sync for Parser {}

impl Drop for Parser {
    fn drop(&mut self) {
        unsafe { ts_parser_delete(self.ptr) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// No grammar has been assigned to this parser yet.
    #[error("cannot parse before a grammar is assigned")]
    NoGrammar,
    /// The engine failed to produce a tree.
    #[error("the engine did not return a syntax tree")]
    NoTree,
}

/// The ranges passed to [`Parser::set_included_ranges`] overlap or are not
/// sorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("included ranges overlap or are not sorted")]
pub struct InvalidRangesError;

extern "C" {
    /// Create a new parser.
    fn ts_parser_new() -> NonNull<ParserData>;
    /// Delete the parser, freeing all of the memory that it used.
    fn ts_parser_delete(parser: NonNull<ParserData>);
    /// Assign a grammar to the parser. Returns false on an ABI version
    /// mismatch, in which case the previous assignment is kept.
    fn ts_parser_set_language(parser: NonNull<ParserData>, grammar: Grammar) -> bool;
    /// The grammar currently assigned to the parser, null if none.
    fn ts_parser_language(parser: NonNull<ParserData>) -> Option<Grammar>;
    /// Restrict parsing to an array of ranges. The ranges are copied; they
    /// must be sorted and non-overlapping or the call fails and returns
    /// false.
    fn ts_parser_set_included_ranges(
        parser: NonNull<ParserData>,
        ranges: *const Range,
        count: u32,
    ) -> bool;
    /// Parse a UTF-8 string of a known length, reusing unchanged subtrees of
    /// `old_tree` when one is supplied. Returns null if no grammar is
    /// assigned.
    fn ts_parser_parse_string(
        parser: NonNull<ParserData>,
        old_tree: Option<NonNull<SyntaxTreeData>>,
        string: *const u8,
        length: u32,
    ) -> Option<NonNull<SyntaxTreeData>>;
}
