use std::fmt;
use std::ptr::NonNull;

use crate::syntax_tree_node::{SyntaxTreeNode, SyntaxTreeNodeRaw};
use crate::Point;

// opaque pointers
pub(crate) enum SyntaxTreeData {}

/// An owned syntax tree.
///
/// The tree is the sole owner of everything reachable from it: every
/// [`SyntaxTreeNode`] derived from it borrows the tree and cannot outlive it.
/// The native handle is released exactly once, when the tree is dropped.
pub struct SyntaxTree {
    ptr: NonNull<SyntaxTreeData>,
}

impl SyntaxTree {
    pub(crate) unsafe fn from_raw(raw: NonNull<SyntaxTreeData>) -> SyntaxTree {
        SyntaxTree { ptr: raw }
    }

    pub(crate) fn as_raw(&self) -> NonNull<SyntaxTreeData> {
        self.ptr
    }

    /// The top-level node spanning the whole input.
    pub fn root_node(&self) -> SyntaxTreeNode<'_> {
        // the root is never null on a tree the engine handed out
        unsafe { SyntaxTreeNode::from_raw(ts_tree_root_node(self.ptr)).unwrap() }
    }

    /// Record that the text between `start_byte` and `old_end_byte` was
    /// replaced by new text ending at `new_end_byte`, shifting the tree's
    /// byte and point bookkeeping accordingly.
    ///
    /// Must be called before the next [`Parser::parse`](crate::Parser::parse)
    /// that passes this tree as `old_tree`, or the reuse of unchanged
    /// subtrees is unsound.
    pub fn edit(&mut self, edit: &InputEdit) {
        unsafe { ts_tree_edit(self.ptr, edit) }
    }
}

impl fmt::Debug for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "SyntaxTree({})", self.root_node().to_sexp())
    }
}

impl Drop for SyntaxTree {
    fn drop(&mut self) {
        unsafe { ts_tree_delete(self.ptr) }
    }
}

impl Clone for SyntaxTree {
    /// Shallow, cheap copy. The engine requires a copy per thread when one
    /// tree is consumed from several threads at once.
    fn clone(&self) -> Self {
        unsafe {
            SyntaxTree {
                ptr: ts_tree_copy(self.ptr),
            }
        }
    }
}

unsafe impl Send for SyntaxTree {}
unsafe impl Sync for SyntaxTree {}

/// One text mutation, described in both byte offsets and (row, column)
/// points. Handed verbatim to the engine by [`SyntaxTree::edit`].
#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct InputEdit {
    pub start_byte: u32,
    pub old_end_byte: u32,
    pub new_end_byte: u32,
    pub start_point: Point,
    pub old_end_point: Point,
    pub new_end_point: Point,
}

extern "C" {
    /// Create a shallow copy of the syntax tree.
    fn ts_tree_copy(self_: NonNull<SyntaxTreeData>) -> NonNull<SyntaxTreeData>;
    /// Delete the syntax tree, freeing all of the memory that it used.
    fn ts_tree_delete(self_: NonNull<SyntaxTreeData>);
    /// Get the root node of the syntax tree.
    fn ts_tree_root_node(self_: NonNull<SyntaxTreeData>) -> SyntaxTreeNodeRaw;
    /// Edit the syntax tree to keep it in sync with source code that has
    /// been edited. The edit must be described both in bytes and in
    /// row/column coordinates.
    fn ts_tree_edit(self_: NonNull<SyntaxTreeData>, edit: &InputEdit);
}
