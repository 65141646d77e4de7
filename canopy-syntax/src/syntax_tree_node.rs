use std::ffi::{c_void, CStr};
use std::marker::PhantomData;
use std::ops::Range;
use std::os::raw::c_char;
use std::ptr::NonNull;
use std::str;

use crate::grammar::Grammar;
use crate::syntax_tree::SyntaxTree;
use crate::Point;

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub(crate) struct SyntaxTreeNodeRaw {
    context: [u32; 4],
    id: *const c_void,
    tree: *const c_void,
}

/// A non-owning view of one node in a [`SyntaxTree`].
///
/// The view is an opaque coordinate (not a raw address) plus a borrow of the
/// owning tree, so a node can never outlive the tree it came from. Copying a
/// node is free; nothing here ever mutates the tree.
///
/// Navigation with no target — the parent of the root, a child index at or
/// past the count, the sibling of a last child — returns `None`.
#[derive(Debug, Clone)]
#[repr(C)]
pub struct SyntaxTreeNode<'tree> {
    context: [u32; 4],
    id: NonNull<c_void>,
    tree: NonNull<c_void>,
    _phantom: PhantomData<&'tree SyntaxTree>,
}

impl<'tree> SyntaxTreeNode<'tree> {
    #[inline]
    pub(crate) unsafe fn from_raw(raw: SyntaxTreeNodeRaw) -> Option<Self> {
        // the engine marks the null node with a null id
        Some(SyntaxTreeNode {
            context: raw.context,
            id: NonNull::new(raw.id as *mut _)?,
            tree: unsafe { NonNull::new_unchecked(raw.tree as *mut _) },
            _phantom: PhantomData,
        })
    }

    #[inline]
    pub(crate) fn as_raw(&self) -> SyntaxTreeNodeRaw {
        SyntaxTreeNodeRaw {
            context: self.context,
            id: self.id.as_ptr(),
            tree: self.tree.as_ptr(),
        }
    }

    /// This node's type name, as written in the grammar.
    #[inline]
    pub fn kind(&self) -> &'static str {
        unsafe {
            let kind = CStr::from_ptr(ts_node_type(self.as_raw()));
            // safety: node type names are static ASCII strings baked into the
            // grammar, and grammars are never unloaded
            str::from_utf8_unchecked(kind.to_bytes())
        }
    }

    /// This node's type as a numerical id.
    #[inline]
    pub fn kind_id(&self) -> u16 {
        unsafe { ts_node_symbol(self.as_raw()) }
    }

    /// The [`Grammar`] that was used to parse this node's syntax tree.
    #[inline]
    pub fn grammar(&self) -> Grammar {
        unsafe { ts_node_language(self.as_raw()) }
    }

    /// Check if this node is *named*.
    ///
    /// Named nodes correspond to named rules in the grammar; *anonymous*
    /// nodes correspond to string literals (punctuation, keywords).
    #[inline]
    pub fn is_named(&self) -> bool {
        unsafe { ts_node_is_named(self.as_raw()) }
    }

    /// Check if this node was inserted by the parser to recover from a
    /// syntax error.
    #[inline]
    pub fn is_missing(&self) -> bool {
        unsafe { ts_node_is_missing(self.as_raw()) }
    }

    /// The byte offset where this node starts.
    #[inline]
    pub fn start_byte(&self) -> usize {
        unsafe { ts_node_start_byte(self.as_raw()) as usize }
    }

    /// The byte offset where this node ends.
    #[inline]
    pub fn end_byte(&self) -> usize {
        unsafe { ts_node_end_byte(self.as_raw()) as usize }
    }

    /// The byte range of source code this node spans.
    #[inline]
    pub fn byte_range(&self) -> Range<usize> {
        self.start_byte()..self.end_byte()
    }

    /// The (row, column) position where this node starts.
    #[inline]
    pub fn start_point(&self) -> Point {
        unsafe { ts_node_start_point(self.as_raw()) }
    }

    /// The (row, column) position where this node ends.
    #[inline]
    pub fn end_point(&self) -> Point {
        unsafe { ts_node_end_point(self.as_raw()) }
    }

    /// This node's child at `i`, counting all children, named or not.
    #[inline]
    pub fn child(&self, i: usize) -> Option<SyntaxTreeNode<'tree>> {
        unsafe { SyntaxTreeNode::from_raw(ts_node_child(self.as_raw(), i as u32)) }
    }

    /// This node's number of children.
    #[inline]
    pub fn child_count(&self) -> usize {
        unsafe { ts_node_child_count(self.as_raw()) as usize }
    }

    /// This node's *named* child at `i`. See [`SyntaxTreeNode::is_named`].
    #[inline]
    pub fn named_child(&self, i: usize) -> Option<SyntaxTreeNode<'tree>> {
        unsafe { SyntaxTreeNode::from_raw(ts_node_named_child(self.as_raw(), i as u32)) }
    }

    /// This node's number of *named* children.
    #[inline]
    pub fn named_child_count(&self) -> usize {
        unsafe { ts_node_named_child_count(self.as_raw()) as usize }
    }

    #[inline]
    unsafe fn map(
        &self,
        f: unsafe extern "C" fn(SyntaxTreeNodeRaw) -> SyntaxTreeNodeRaw,
    ) -> Option<SyntaxTreeNode<'tree>> {
        SyntaxTreeNode::from_raw(f(self.as_raw()))
    }

    /// This node's immediate parent.
    #[inline]
    pub fn parent(&self) -> Option<Self> {
        unsafe { self.map(ts_node_parent) }
    }

    /// This node's next sibling.
    #[inline]
    pub fn next_sibling(&self) -> Option<Self> {
        unsafe { self.map(ts_node_next_sibling) }
    }

    /// This node's previous sibling.
    #[inline]
    pub fn prev_sibling(&self) -> Option<Self> {
        unsafe { self.map(ts_node_prev_sibling) }
    }

    /// This node's next *named* sibling.
    #[inline]
    pub fn next_named_sibling(&self) -> Option<Self> {
        unsafe { self.map(ts_node_next_named_sibling) }
    }

    /// This node's previous *named* sibling.
    #[inline]
    pub fn prev_named_sibling(&self) -> Option<Self> {
        unsafe { self.map(ts_node_prev_named_sibling) }
    }

    /// The smallest node within this node that spans the given byte range.
    #[inline]
    pub fn descendant_for_byte_range(&self, start: usize, end: usize) -> Option<Self> {
        unsafe {
            Self::from_raw(ts_node_descendant_for_byte_range(
                self.as_raw(),
                start as u32,
                end as u32,
            ))
        }
    }

    /// The smallest *named* node within this node that spans the given byte
    /// range.
    #[inline]
    pub fn named_descendant_for_byte_range(&self, start: usize, end: usize) -> Option<Self> {
        unsafe {
            Self::from_raw(ts_node_named_descendant_for_byte_range(
                self.as_raw(),
                start as u32,
                end as u32,
            ))
        }
    }

    /// Render this subtree as its debug S-expression form.
    pub fn to_sexp(&self) -> String {
        unsafe {
            let raw = ts_node_string(self.as_raw());
            let sexp = CStr::from_ptr(raw).to_string_lossy().into_owned();
            // the engine malloc's the buffer and hands it over
            libc::free(raw as *mut libc::c_void);
            sexp
        }
    }
}

unsafe impl Send for SyntaxTreeNode<'_> {}
unsafe impl Sync for SyntaxTreeNode<'_> {}

extern "C" {
    /// Get the node's type as a null-terminated string.
    fn ts_node_type(node: SyntaxTreeNodeRaw) -> *const c_char;
    /// Get the node's type as a numerical id.
    fn ts_node_symbol(node: SyntaxTreeNodeRaw) -> u16;
    /// Get the node's language.
    fn ts_node_language(node: SyntaxTreeNodeRaw) -> Grammar;
    /// Check if the node corresponds to a named rule in the grammar.
    fn ts_node_is_named(node: SyntaxTreeNodeRaw) -> bool;
    /// Check if the node was inserted by the parser for error recovery.
    fn ts_node_is_missing(node: SyntaxTreeNodeRaw) -> bool;
    /// Get the node's immediate parent.
    fn ts_node_parent(node: SyntaxTreeNodeRaw) -> SyntaxTreeNodeRaw;
    /// Get the node's child at the given index.
    fn ts_node_child(node: SyntaxTreeNodeRaw, child_index: u32) -> SyntaxTreeNodeRaw;
    /// Get the node's number of children.
    fn ts_node_child_count(node: SyntaxTreeNodeRaw) -> u32;
    /// Get the node's named child at the given index.
    fn ts_node_named_child(node: SyntaxTreeNodeRaw, child_index: u32) -> SyntaxTreeNodeRaw;
    /// Get the node's number of named children.
    fn ts_node_named_child_count(node: SyntaxTreeNodeRaw) -> u32;
    /// Get the node's next sibling.
    fn ts_node_next_sibling(node: SyntaxTreeNodeRaw) -> SyntaxTreeNodeRaw;
    fn ts_node_prev_sibling(node: SyntaxTreeNodeRaw) -> SyntaxTreeNodeRaw;
    /// Get the node's next named sibling.
    fn ts_node_next_named_sibling(node: SyntaxTreeNodeRaw) -> SyntaxTreeNodeRaw;
    fn ts_node_prev_named_sibling(node: SyntaxTreeNodeRaw) -> SyntaxTreeNodeRaw;
    /// Get the node's start byte.
    fn ts_node_start_byte(node: SyntaxTreeNodeRaw) -> u32;
    /// Get the node's end byte.
    fn ts_node_end_byte(node: SyntaxTreeNodeRaw) -> u32;
    /// Get the node's start position.
    fn ts_node_start_point(node: SyntaxTreeNodeRaw) -> Point;
    /// Get the node's end position.
    fn ts_node_end_point(node: SyntaxTreeNodeRaw) -> Point;
    /// Get the smallest node within this node that spans the given byte
    /// range.
    fn ts_node_descendant_for_byte_range(
        node: SyntaxTreeNodeRaw,
        start: u32,
        end: u32,
    ) -> SyntaxTreeNodeRaw;
    /// Get the smallest named node within this node that spans the given
    /// byte range.
    fn ts_node_named_descendant_for_byte_range(
        node: SyntaxTreeNodeRaw,
        start: u32,
        end: u32,
    ) -> SyntaxTreeNodeRaw;
    /// Render the subtree rooted at the node as a malloc'ed S-expression
    /// string owned by the caller.
    fn ts_node_string(node: SyntaxTreeNodeRaw) -> *mut c_char;
}
