//! Utilities to traverse the KDTree structure.

use std::marker::PhantomData;

use crate::kdtree::constants::ROOT;
use crate::kdtree::{KDNode, KDTreeIndex};
use crate::r#type::IndexableNum;

/// A node in the KDTree.
#[derive(Debug, Clone)]
pub struct Node<'a, N: IndexableNum, T: KDTreeIndex<N>> {
    /// The tree that this node is a reference onto
    tree: &'a T,

    /// Index into the tree's node arena
    index: u32,

    depth: usize,

    phantom: PhantomData<N>,
}

impl<'a, N: IndexableNum, T: KDTreeIndex<N>> Node<'a, N, T> {
    pub(crate) fn from_root(tree: &'a T) -> Option<Self> {
        if tree.is_empty() {
            return None;
        }
        Some(Self {
            tree,
            index: ROOT,
            depth: 0,
            phantom: PhantomData,
        })
    }

    #[inline]
    fn node(&self) -> KDNode {
        self.tree.nodes()[self.index as usize]
    }

    fn child(&self, index: Option<u32>) -> Option<Node<'a, N, T>> {
        index.map(|index| Self {
            tree: self.tree,
            index,
            depth: self.depth + 1,
            phantom: PhantomData,
        })
    }

    /// The insertion index of the point stored in this node.
    pub fn id(&self) -> u32 {
        self.node().id()
    }

    /// The axis that the children of this node are split over. Always `depth % num_dims`.
    pub fn axis(&self) -> usize {
        self.node().axis()
    }

    /// The depth of this node, 0 for the root.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The coordinates of the point stored in this node.
    pub fn location(&self) -> &'a [N] {
        let num_dims = self.tree.num_dims();
        let start = self.id() as usize * num_dims;
        &self.tree.coords()[start..start + num_dims]
    }

    /// The child holding points less than or equal to this node on [`Node::axis`].
    pub fn left_child(&self) -> Option<Node<'a, N, T>> {
        self.child(self.node().left())
    }

    /// The child holding points greater than or equal to this node on [`Node::axis`].
    pub fn right_child(&self) -> Option<Node<'a, N, T>> {
        self.child(self.node().right())
    }

    /// Returns `true` if this is a leaf node without children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        let node = self.node();
        node.left().is_none() && node.right().is_none()
    }

    /// Returns `true` if this is an intermediate node with children.
    #[inline]
    pub fn is_parent(&self) -> bool {
        !self.is_leaf()
    }
}
