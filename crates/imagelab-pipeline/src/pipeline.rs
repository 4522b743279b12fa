//! The ordered block sequence and its constrained reorder.
//!
//! [`Pipeline`] is append-only: blocks are added at the tail and moved
//! in place by [`Pipeline::arrange`], never removed. Execution order is
//! exactly sequence order.
//!
//! # Arrangement
//!
//! `arrange(parent, child)` makes the first `child` block immediately
//! follow the first `parent` block. The child is taken out of the
//! sequence and reinserted one past the parent's position *after* the
//! removal, so moving a child that sat before its parent does not leave
//! a gap:
//!
//! ```text
//! [read, C, A, B]  arrange(A, C)  ->  [read, A, C, B]
//! ```
//!
//! Every other block keeps its relative order. Only one pair moves per
//! call and nothing detects contradictory requests: alternating
//! `arrange(A, B)` and `arrange(B, A)` keeps swapping the two.

use crate::operation::OperationKind;
use crate::operator::Block;

/// What a call to [`Pipeline::arrange`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arrangement {
    /// The child moved from index `from` to index `to`.
    Moved { from: usize, to: usize },
    /// The child already immediately followed the parent.
    AlreadyOrdered,
    /// The parent or the child kind is not in the pipeline.
    NotFound,
    /// Parent and child resolve to the same block.
    SameBlock,
}

/// An ordered sequence of pipeline blocks.
pub struct Pipeline<I> {
    blocks: Vec<Block<I>>,
}

impl<I> Default for Pipeline<I> {
    fn default() -> Self {
        Self { blocks: Vec::new() }
    }
}

impl<I> Pipeline<I> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Append a block at the tail.
    pub fn push(&mut self, block: Block<I>) {
        self.blocks.push(block);
    }

    /// The first block, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Block<I>> {
        self.blocks.first()
    }

    /// Index of the first block of `kind`.
    #[must_use]
    pub fn position(&self, kind: OperationKind) -> Option<usize> {
        self.blocks.iter().position(|block| block.kind() == kind)
    }

    /// The first block of `kind`.
    #[must_use]
    pub fn find(&self, kind: OperationKind) -> Option<&Block<I>> {
        self.blocks.iter().find(|block| block.kind() == kind)
    }

    /// The first block of `kind`, mutably.
    pub fn find_mut(&mut self, kind: OperationKind) -> Option<&mut Block<I>> {
        self.blocks.iter_mut().find(|block| block.kind() == kind)
    }

    /// Blocks in execution order.
    pub fn iter(&self) -> std::slice::Iter<'_, Block<I>> {
        self.blocks.iter()
    }

    /// Block kinds in execution order.
    #[must_use]
    pub fn kinds(&self) -> Vec<OperationKind> {
        self.blocks.iter().map(Block::kind).collect()
    }

    /// Move the first `child` block to directly after the first `parent`
    /// block.
    ///
    /// See the [module documentation](self#arrangement) for the exact
    /// reinsertion rule.
    pub fn arrange(&mut self, parent: OperationKind, child: OperationKind) -> Arrangement {
        let (Some(parent_index), Some(child_index)) = (self.position(parent), self.position(child))
        else {
            return Arrangement::NotFound;
        };
        if parent_index == child_index {
            return Arrangement::SameBlock;
        }
        if parent_index + 1 == child_index {
            return Arrangement::AlreadyOrdered;
        }

        let to = move_after(&mut self.blocks, child_index, parent_index);
        Arrangement::Moved {
            from: child_index,
            to,
        }
    }
}

impl<'a, I> IntoIterator for &'a Pipeline<I> {
    type Item = &'a Block<I>;
    type IntoIter = std::slice::Iter<'a, Block<I>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Remove `items[from]` and reinsert it directly after the element that
/// sat at `anchor` before the removal. Returns the new index.
///
/// `from` and `anchor` must be distinct, in-bounds indices.
fn move_after<T>(items: &mut Vec<T>, from: usize, anchor: usize) -> usize {
    let item = items.remove(from);
    // Removing an element in front of the anchor shifts it left by one.
    let anchor_after_removal = if from < anchor { anchor - 1 } else { anchor };
    let to = anchor_after_removal + 1;
    items.insert(to, item);
    to
}
