use std::slice::ChunksExact;

use geo_traits::CoordTrait;
use tinyvec::TinyVec;

use crate::distance::{sq_axis_dist, squared_distance};
use crate::error::{KDIndexError, Result};
use crate::kdtree::builder::check_point;
use crate::kdtree::candidates::Candidates;
use crate::kdtree::constants::{NO_CHILD, ROOT};
use crate::kdtree::{KDNode, KDTree, KDTreeRef, Node};
use crate::r#type::IndexableNum;

/// Traversal stack of arena indices. Only spills to the heap for very deep or skewed trees.
type Stack = TinyVec<[u32; 64]>;

/// A trait for searching and accessing data out of a KDTree.
pub trait KDTreeIndex<N: IndexableNum>: Sized {
    /// The node arena of this tree. When non-empty, the root is the first node.
    fn nodes(&self) -> &[KDNode];

    /// The interleaved coordinates of all points, in insertion order.
    fn coords(&self) -> &[N];

    /// The number of coordinates of every point in this tree.
    fn num_dims(&self) -> usize;

    /// The number of items in this KDTree
    fn num_items(&self) -> usize {
        self.nodes().len()
    }

    /// Returns `true` if this tree holds no points.
    fn is_empty(&self) -> bool {
        self.nodes().is_empty()
    }

    /// All points of this tree in insertion order, so that the `i`th point has id `i`.
    fn points(&self) -> ChunksExact<'_, N> {
        self.coords().chunks_exact(self.num_dims())
    }

    /// The point with the given id.
    fn point(&self, id: u32) -> Option<&[N]> {
        let num_dims = self.num_dims();
        let start = id as usize * num_dims;
        self.coords().get(start..start + num_dims)
    }

    /// Search the index for the `num` points closest to `query`.
    ///
    /// Returns ids ordered by ascending squared Euclidean distance. Points at equal distance are
    /// ordered by ascending id. If `num` is larger than the tree, every id is returned.
    ///
    /// `num` must be at least 1 and `query` must have [`KDTreeIndex::num_dims`] finite coordinates.
    ///
    /// ```
    /// use kd_index::kdtree::{KDTree, KDTreeIndex};
    ///
    /// let tree = KDTree::build(2, &[[7., 1.], [6., 4.], [5., 2.]]).unwrap();
    /// assert_eq!(tree.neighbors(&[4., 4.], 2).unwrap(), vec![1, 2]);
    /// ```
    fn neighbors(&self, query: &[N], num: usize) -> Result<Vec<u32>> {
        if num == 0 {
            return Err(KDIndexError::InvalidNeighborCount);
        }
        let num_dims = self.num_dims();
        check_point(query, num_dims)?;

        let nodes = self.nodes();
        if nodes.is_empty() {
            return Ok(vec![]);
        }
        let coords = self.coords();

        let mut candidates = Candidates::new(num.min(nodes.len()));
        let mut stack = Stack::new();
        let mut visited = 0;

        // crawl down the tree towards the query
        descend(nodes, coords, num_dims, query, ROOT, &mut stack);

        while let Some(index) = stack.pop() {
            let node = nodes[index as usize];
            let location = point_at(coords, num_dims, node.id);
            candidates.offer(squared_distance(query, location), node.id);
            visited += 1;

            // The far side can only hold a closer point if the splitting plane is within bound
            let axis = node.axis as usize;
            if candidates.admits(sq_axis_dist(query, location, axis)) {
                let far = if query[axis] < location[axis] {
                    node.right
                } else {
                    node.left
                };
                descend(nodes, coords, num_dims, query, far, &mut stack);
            }
        }

        log::trace!(
            "Visited {} of {} nodes for {} neighbors",
            visited,
            nodes.len(),
            candidates.len()
        );
        Ok(candidates.into_sorted_ids())
    }

    /// Search the index for the single point closest to `query`.
    ///
    /// Returns `None` for an empty tree.
    fn nearest_neighbor(&self, query: &[N]) -> Result<Option<u32>> {
        Ok(self.neighbors(query, 1)?.first().copied())
    }

    /// Search the index for the `num` points closest to the given coordinate.
    fn neighbors_coord(&self, coord: &impl CoordTrait<T = N>, num: usize) -> Result<Vec<u32>> {
        let query: TinyVec<[N; 4]> = (0..coord.dim().size())
            .map(|axis| coord.nth_or_panic(axis))
            .collect();
        self.neighbors(&query, num)
    }

    /// Search many queries in parallel, each as [`KDTreeIndex::neighbors`].
    #[cfg(feature = "rayon")]
    fn neighbors_batch<Q: AsRef<[N]> + Sync>(
        &self,
        queries: &[Q],
        num: usize,
    ) -> Result<Vec<Vec<u32>>>
    where
        Self: Sync,
    {
        use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

        queries
            .par_iter()
            .map(|query| self.neighbors(query.as_ref(), num))
            .collect()
    }

    /// Search the index for items within a given radius.
    ///
    /// - query: query point
    /// - radius: radius, compared inclusively
    ///
    /// Returns ids of found items, sorted ascending.
    fn within(&self, query: &[N], radius: N) -> Result<Vec<u32>> {
        let num_dims = self.num_dims();
        check_point(query, num_dims)?;
        if !radius.is_finite() {
            return Err(KDIndexError::General(format!(
                "Radius must be finite, got {:?}.",
                radius
            )));
        }

        let nodes = self.nodes();
        let coords = self.coords();
        let mut result: Vec<u32> = vec![];
        if nodes.is_empty() || radius < N::zero() {
            return Ok(result);
        }

        let r2 = radius * radius;
        let mut stack = Stack::new();
        stack.push(ROOT);

        while let Some(index) = stack.pop() {
            let node = nodes[index as usize];
            let location = point_at(coords, num_dims, node.id);
            if squared_distance(query, location) <= r2 {
                result.push(node.id);
            }

            // queue search in halves that intersect the query
            let axis = node.axis as usize;
            if node.left != NO_CHILD && query[axis] - radius <= location[axis] {
                stack.push(node.left);
            }
            if node.right != NO_CHILD && query[axis] + radius >= location[axis] {
                stack.push(node.right);
            }
        }

        result.sort_unstable();
        Ok(result)
    }

    /// Search the index for items within a given bounding box.
    ///
    /// - min: lower corner of the box
    /// - max: upper corner of the box
    ///
    /// Both corners are inclusive. Returns ids of found items, sorted ascending.
    fn range(&self, min: &[N], max: &[N]) -> Result<Vec<u32>> {
        let num_dims = self.num_dims();
        check_point(min, num_dims)?;
        check_point(max, num_dims)?;

        let nodes = self.nodes();
        let coords = self.coords();
        let mut result: Vec<u32> = vec![];
        if nodes.is_empty() {
            return Ok(result);
        }

        let mut stack = Stack::new();
        stack.push(ROOT);

        while let Some(index) = stack.pop() {
            let node = nodes[index as usize];
            let location = point_at(coords, num_dims, node.id);
            let inside = location
                .iter()
                .zip(min.iter().zip(max))
                .all(|(value, (lower, upper))| value >= lower && value <= upper);
            if inside {
                result.push(node.id);
            }

            let axis = node.axis as usize;
            if node.left != NO_CHILD && min[axis] <= location[axis] {
                stack.push(node.left);
            }
            if node.right != NO_CHILD && max[axis] >= location[axis] {
                stack.push(node.right);
            }
        }

        result.sort_unstable();
        Ok(result)
    }

    /// Access the root node of the KDTree for manual traversal.
    ///
    /// Returns `None` for an empty tree.
    fn root(&self) -> Option<Node<'_, N, Self>> {
        Node::from_root(self)
    }
}

impl<N: IndexableNum> KDTreeIndex<N> for KDTree<N> {
    fn nodes(&self) -> &[KDNode] {
        &self.nodes
    }

    fn coords(&self) -> &[N] {
        &self.coords
    }

    fn num_dims(&self) -> usize {
        self.num_dims
    }
}

impl<N: IndexableNum> KDTreeIndex<N> for KDTreeRef<'_, N> {
    fn nodes(&self) -> &[KDNode] {
        self.nodes
    }

    fn coords(&self) -> &[N] {
        self.coords
    }

    fn num_dims(&self) -> usize {
        self.num_dims
    }
}

#[inline]
fn point_at<N: IndexableNum>(coords: &[N], num_dims: usize, id: u32) -> &[N] {
    let start = id as usize * num_dims;
    &coords[start..start + num_dims]
}

/// Walk from `start` towards the leaf containing `query`, pushing every visited node.
///
/// Goes left when the query is strictly less than the node on its axis, otherwise right.
#[inline]
fn descend<N: IndexableNum>(
    nodes: &[KDNode],
    coords: &[N],
    num_dims: usize,
    query: &[N],
    start: u32,
    stack: &mut Stack,
) {
    let mut current = start;
    while current != NO_CHILD {
        stack.push(current);

        let node = nodes[current as usize];
        let axis = node.axis as usize;
        current = if query[axis] < coords[node.id as usize * num_dims + axis] {
            node.left
        } else {
            node.right
        };
    }
}
