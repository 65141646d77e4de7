use core::slice;
use std::cell::UnsafeCell;
use std::marker::PhantomData;
use std::mem::{replace, ManuallyDrop};
use std::ops::Range;
use std::ptr::{self, NonNull};

use crate::query::{Query, QueryData};
use crate::syntax_tree_node::{SyntaxTreeNode, SyntaxTreeNodeRaw};
use crate::SyntaxTree;

enum QueryCursorData {}

thread_local! {
    static CURSOR_CACHE: UnsafeCell<Vec<InactiveQueryCursor>> = UnsafeCell::new(Vec::with_capacity(8));
}

/// SAFETY: must not call itself recursively
unsafe fn with_cache<T>(f: impl FnOnce(&mut Vec<InactiveQueryCursor>) -> T) -> T {
    CURSOR_CACHE.with(|cache| f(&mut *cache.get()))
}

/// A query iterator bound to one [`Query`] and one subtree, produced by
/// [`InactiveQueryCursor::execute`].
///
/// Matches arrive in document order of their start position. Once the cursor
/// is exhausted, [`QueryCursor::next_match`] keeps returning `None`.
pub struct QueryCursor<'a, 'tree> {
    query: &'a Query,
    ptr: *mut QueryCursorData,
    tree: PhantomData<&'tree SyntaxTree>,
}

impl<'tree> QueryCursor<'_, 'tree> {
    /// Advance to the next match.
    ///
    /// The returned match borrows this cursor: its captures point into the
    /// cursor's internal buffer and stay valid until the next call.
    pub fn next_match(&mut self) -> Option<QueryMatch<'_, 'tree>> {
        let mut query_match = TSQueryMatch {
            id: 0,
            pattern_index: 0,
            capture_count: 0,
            captures: ptr::null(),
        };
        let success = unsafe { ts_query_cursor_next_match(self.ptr, &mut query_match) };
        if !success {
            return None;
        }
        Some(QueryMatch {
            id: query_match.id,
            pattern_index: query_match.pattern_index,
            captures: unsafe { captures_slice(&query_match) },
        })
    }

    /// The query this cursor is executing.
    pub fn query(&self) -> &Query {
        self.query
    }

    /// Restrict iteration to matches starting within `range`.
    pub fn set_byte_range(&mut self, range: Range<usize>) {
        unsafe {
            ts_query_cursor_set_byte_range(self.ptr, range.start as u32, range.end as u32);
        }
    }

    /// Unbind the cursor so the underlying iterator can run another query.
    pub fn reuse(mut self) -> InactiveQueryCursor {
        let ptr = replace(&mut self.ptr, ptr::null_mut());
        InactiveQueryCursor {
            ptr: unsafe { NonNull::new_unchecked(ptr) },
        }
    }
}

impl Drop for QueryCursor<'_, '_> {
    fn drop(&mut self) {
        // reuse() moves the pointer out; the guard keeps the handle from
        // being released twice
        if let Some(ptr) = NonNull::new(self.ptr) {
            unsafe { with_cache(|cache| cache.push(InactiveQueryCursor { ptr })) }
        }
    }
}

/// A reusable native query iterator not currently bound to a query.
///
/// Allocating these is comparatively expensive, so dropped cursors are parked
/// in a thread-local cache and handed back out by
/// [`InactiveQueryCursor::new`].
pub struct InactiveQueryCursor {
    ptr: NonNull<QueryCursorData>,
}

impl InactiveQueryCursor {
    #[must_use]
    pub fn new() -> Self {
        unsafe {
            with_cache(|cache| {
                cache.pop().unwrap_or_else(|| InactiveQueryCursor {
                    ptr: NonNull::new_unchecked(ts_query_cursor_new()),
                })
            })
        }
    }

    /// The maximum number of in-progress matches for this cursor.
    #[must_use]
    pub fn match_limit(&self) -> u32 {
        unsafe { ts_query_cursor_match_limit(self.ptr.as_ptr()) }
    }

    /// Set the maximum number of in-progress matches. The limit must be
    /// `> 0` and `<= 65536`.
    pub fn set_match_limit(&mut self, limit: u32) {
        unsafe {
            ts_query_cursor_set_match_limit(self.ptr.as_ptr(), limit);
        }
    }

    /// Check if, on its last execution, this cursor exceeded its match limit
    /// and silently dropped the earliest-starting matches.
    #[must_use]
    pub fn did_exceed_match_limit(&self) -> bool {
        unsafe { ts_query_cursor_did_exceed_match_limit(self.ptr.as_ptr()) }
    }

    /// Restrict the next execution to matches starting within `range`.
    pub fn set_byte_range(&mut self, range: Range<usize>) {
        unsafe {
            ts_query_cursor_set_byte_range(self.ptr.as_ptr(), range.start as u32, range.end as u32);
        }
    }

    /// Start running `query` over the subtree rooted at `node`, discarding
    /// any state left over from a previous run.
    pub fn execute<'a, 'tree>(
        self,
        query: &'a Query,
        node: &SyntaxTreeNode<'tree>,
    ) -> QueryCursor<'a, 'tree> {
        let ptr = self.into_raw().as_ptr();
        unsafe { ts_query_cursor_exec(ptr, query.raw.as_ref(), node.as_raw()) };
        QueryCursor {
            query,
            ptr,
            tree: PhantomData,
        }
    }

    fn into_raw(self) -> NonNull<QueryCursorData> {
        // keep Drop from releasing the handle we are handing over
        ManuallyDrop::new(self).ptr
    }
}

impl Default for InactiveQueryCursor {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InactiveQueryCursor {
    fn drop(&mut self) {
        unsafe { ts_query_cursor_delete(self.ptr.as_ptr()) }
    }
}

/// One match of a query pattern.
pub struct QueryMatch<'cursor, 'tree> {
    id: u32,
    pattern_index: u16,
    captures: &'cursor [QueryCapture<'tree>],
}

impl<'tree> QueryMatch<'_, 'tree> {
    /// The engine's identifier for this match.
    #[must_use]
    pub const fn id(&self) -> u32 {
        self.id
    }

    /// Which of the query's alternative patterns matched.
    #[must_use]
    pub fn pattern_index(&self) -> usize {
        self.pattern_index as usize
    }

    /// The captures of this match, in native capture order.
    pub fn captures(&self) -> &[QueryCapture<'tree>] {
        self.captures
    }

    /// The nodes bound to the capture with index `index` (see
    /// [`Query::capture_name`]).
    pub fn nodes_for_capture_index(
        &self,
        index: u32,
    ) -> impl Iterator<Item = &SyntaxTreeNode<'tree>> {
        self.captures
            .iter()
            .filter(move |capture| capture.index == index)
            .map(|capture| &capture.node)
    }
}

/// One capture within a match: a node plus the index of the capture name it
/// satisfies within the pattern.
#[repr(C)]
#[derive(Debug, Clone)]
pub struct QueryCapture<'tree> {
    pub node: SyntaxTreeNode<'tree>,
    pub index: u32,
}

/// Reinterpret the engine's contiguous capture buffer as a slice.
///
/// This is the only place capture records are read out of native memory: the
/// element stride is `size_of::<QueryCapture>`, and the layout tests below
/// pin that to the engine's record layout. The slice stays valid until the
/// cursor that produced `raw` advances or dies, which the `'cursor` borrow
/// on [`QueryMatch`] enforces.
unsafe fn captures_slice<'cursor, 'tree>(raw: &TSQueryMatch) -> &'cursor [QueryCapture<'tree>] {
    if raw.captures.is_null() {
        return &[];
    }
    slice::from_raw_parts(raw.captures.cast(), raw.capture_count as usize)
}

#[repr(C)]
#[derive(Debug)]
struct TSQueryCapture {
    node: SyntaxTreeNodeRaw,
    index: u32,
}

#[repr(C)]
#[derive(Debug)]
struct TSQueryMatch {
    id: u32,
    pattern_index: u16,
    capture_count: u16,
    captures: *const TSQueryCapture,
}

extern "C" {
    /// Create a new cursor for executing a given query.
    fn ts_query_cursor_new() -> *mut QueryCursorData;
    /// Delete a query cursor, freeing all of the memory that it used.
    fn ts_query_cursor_delete(self_: *mut QueryCursorData);
    /// Start running a given query on a given node, resetting any previous
    /// iteration state.
    fn ts_query_cursor_exec(self_: *mut QueryCursorData, query: &QueryData, node: SyntaxTreeNodeRaw);
    /// Advance to the next match of the currently running query. If there is
    /// a match, write it to `match_` and return true; otherwise return
    /// false, forever.
    fn ts_query_cursor_next_match(self_: *mut QueryCursorData, match_: &mut TSQueryMatch) -> bool;
    fn ts_query_cursor_did_exceed_match_limit(self_: *const QueryCursorData) -> bool;
    fn ts_query_cursor_match_limit(self_: *const QueryCursorData) -> u32;
    fn ts_query_cursor_set_match_limit(self_: *mut QueryCursorData, limit: u32);
    /// Set the range of bytes in which the query will be executed.
    fn ts_query_cursor_set_byte_range(self_: *mut QueryCursorData, start_byte: u32, end_byte: u32);
}
