use crate::error::Result;
use crate::kdtree::constants::NO_CHILD;
use crate::kdtree::KDTreeBuilder;
use crate::r#type::IndexableNum;

/// A single node of a KDTree, stored in the tree's flat node arena.
///
/// Child links are indices into the same arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KDNode {
    pub(crate) id: u32,
    pub(crate) axis: u32,
    pub(crate) left: u32,
    pub(crate) right: u32,
}

impl KDNode {
    pub(crate) fn new(id: u32, axis: usize) -> Self {
        Self {
            id,
            axis: axis as u32,
            left: NO_CHILD,
            right: NO_CHILD,
        }
    }

    /// The insertion index of the point stored in this node.
    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    /// The axis this node splits its children over.
    #[inline]
    pub fn axis(&self) -> usize {
        self.axis as usize
    }

    /// Arena index of the left child, whose points are `<=` this node on [`KDNode::axis`].
    #[inline]
    pub fn left(&self) -> Option<u32> {
        (self.left != NO_CHILD).then_some(self.left)
    }

    /// Arena index of the right child, whose points are `>=` this node on [`KDNode::axis`].
    #[inline]
    pub fn right(&self) -> Option<u32> {
        (self.right != NO_CHILD).then_some(self.right)
    }
}

/// An owned, immutable KDTree.
///
/// Usually this will be created via [`KDTree::build`] or a
/// [`KDTreeBuilder`][crate::kdtree::KDTreeBuilder]. Queries are provided by the
/// [`KDTreeIndex`][crate::kdtree::KDTreeIndex] trait.
#[derive(Debug, Clone, PartialEq)]
pub struct KDTree<N: IndexableNum> {
    pub(crate) nodes: Vec<KDNode>,
    pub(crate) coords: Vec<N>,
    pub(crate) num_dims: usize,
}

impl<N: IndexableNum> KDTree<N> {
    /// Build a tree over `points`, each of which must have `num_dims` coordinates.
    ///
    /// ```
    /// use kd_index::kdtree::{KDTree, KDTreeIndex};
    ///
    /// let tree = KDTree::build(2, &[[7., 1.], [6., 4.], [5., 2.]]).unwrap();
    /// assert_eq!(tree.num_items(), 3);
    /// assert_eq!(tree.nearest_neighbor(&[6., 3.]).unwrap(), Some(1));
    /// ```
    pub fn build<P: AsRef<[N]>>(num_dims: usize, points: &[P]) -> Result<Self> {
        let mut builder = KDTreeBuilder::with_capacity(num_dims, points.len())?;
        for point in points {
            builder.add(point.as_ref())?;
        }
        builder.finish()
    }

    /// A borrowed view on this tree.
    pub fn as_ref(&self) -> KDTreeRef<'_, N> {
        KDTreeRef {
            nodes: &self.nodes,
            coords: &self.coords,
            num_dims: self.num_dims,
        }
    }

    /// Consume the tree, returning the interleaved coordinates in insertion order.
    pub fn into_inner(self) -> Vec<N> {
        self.coords
    }
}

/// A reference onto a [`KDTree`].
///
/// This is `Copy`, so it can be handed to many threads at once.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KDTreeRef<'a, N: IndexableNum> {
    pub(crate) nodes: &'a [KDNode],
    pub(crate) coords: &'a [N],
    pub(crate) num_dims: usize,
}
