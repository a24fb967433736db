use std::cmp::Ordering;

use geo_traits::CoordTrait;
use tinyvec::TinyVec;

use crate::error::{KDIndexError, Result};
use crate::kdtree::index::KDNode;
use crate::kdtree::KDTree;
use crate::r#type::IndexableNum;

/// A builder to create a [`KDTree`].
///
/// Points are added one by one (or in bulk) and the tree is constructed in a single pass by
/// [`KDTreeBuilder::finish`]. Each point's id is the order in which it was added, starting at 0.
#[derive(Debug, Clone)]
pub struct KDTreeBuilder<N: IndexableNum> {
    /// Interleaved coordinates in insertion order
    coords: Vec<N>,
    num_dims: usize,
    num_items: Option<usize>,
}

impl<N: IndexableNum> KDTreeBuilder<N> {
    /// Create a new builder for points with `num_dims` coordinates each.
    pub fn new(num_dims: usize) -> Result<Self> {
        if num_dims == 0 {
            return Err(KDIndexError::ZeroDimensions);
        }

        Ok(Self {
            coords: vec![],
            num_dims,
            num_items: None,
        })
    }

    /// Create a new builder that expects exactly `num_items` points.
    ///
    /// [`KDTreeBuilder::finish`] fails if a different number of points was added.
    pub fn with_capacity(num_dims: usize, num_items: usize) -> Result<Self> {
        let mut builder = Self::new(num_dims)?;
        if num_items > u32::MAX as usize {
            return Err(KDIndexError::TooManyItems(num_items));
        }
        let len = num_items
            .checked_mul(num_dims)
            .ok_or(KDIndexError::TooManyItems(num_items))?;

        builder.coords.reserve_exact(len);
        builder.num_items = Some(num_items);
        Ok(builder)
    }

    /// The number of coordinates of every point in this builder.
    pub fn num_dims(&self) -> usize {
        self.num_dims
    }

    /// The number of points added so far.
    pub fn num_items(&self) -> usize {
        self.coords.len() / self.num_dims
    }

    /// Add a point to the index, returning its id.
    pub fn add(&mut self, point: &[N]) -> Result<u32> {
        self.check_point(point)?;
        let id = self.next_id(1)?;
        self.coords.extend_from_slice(point);
        Ok(id)
    }

    /// Add a coordinate to the index, returning its id.
    ///
    /// The coordinate's dimension (2 for `XY`, 3 for `XYZ` or `XYM`, 4 for `XYZM`) must equal the
    /// builder's dimensionality.
    pub fn add_coord(&mut self, coord: &impl CoordTrait<T = N>) -> Result<u32> {
        let dims = coord.dim().size();
        if dims != self.num_dims {
            return Err(KDIndexError::DimensionMismatch {
                expected: self.num_dims,
                actual: dims,
            });
        }
        let point: TinyVec<[N; 4]> = (0..dims).map(|axis| coord.nth_or_panic(axis)).collect();
        self.add(&point)
    }

    /// Add many points at once from a flat `x0, y0, ..., x1, y1, ...` buffer.
    ///
    /// Either every point is added or, on error, none are.
    pub fn add_interleaved(&mut self, coords: &[N]) -> Result<()> {
        if coords.len() % self.num_dims != 0 {
            return Err(KDIndexError::General(format!(
                "Interleaved buffer of length {} is not a multiple of {} dimensions.",
                coords.len(),
                self.num_dims
            )));
        }
        for point in coords.chunks_exact(self.num_dims) {
            self.check_point(point)?;
        }
        self.next_id(coords.len() / self.num_dims)?;
        self.coords.extend_from_slice(coords);
        Ok(())
    }

    /// Consume this builder, constructing a KDTree ready for queries.
    pub fn finish(self) -> Result<KDTree<N>> {
        let num_items = self.num_items();
        if let Some(expected) = self.num_items {
            if expected != num_items {
                return Err(KDIndexError::ItemCountMismatch {
                    expected,
                    actual: num_items,
                });
            }
        }

        let (nodes, depth) = build_nodes(&self.coords, self.num_dims);
        log::debug!(
            "Built KDTree over {} items with {} dimensions and depth {}",
            num_items,
            self.num_dims,
            depth
        );

        Ok(KDTree {
            nodes,
            coords: self.coords,
            num_dims: self.num_dims,
        })
    }

    fn check_point(&self, point: &[N]) -> Result<()> {
        check_point(point, self.num_dims)
    }

    /// Reserve `count` ids, returning the first one.
    fn next_id(&self, count: usize) -> Result<u32> {
        let current = self.num_items();
        let total = current + count;
        if total > u32::MAX as usize {
            return Err(KDIndexError::TooManyItems(total));
        }
        Ok(current as u32)
    }
}

/// Validate that a point has `num_dims` finite coordinates.
pub(crate) fn check_point<N: IndexableNum>(point: &[N], num_dims: usize) -> Result<()> {
    if point.len() != num_dims {
        return Err(KDIndexError::DimensionMismatch {
            expected: num_dims,
            actual: point.len(),
        });
    }
    match point.iter().position(|value| !value.is_finite()) {
        Some(axis) => Err(KDIndexError::InvalidCoordinate { axis }),
        None => Ok(()),
    }
}

/// A pending subtree: a range of the working id buffer and where its median gets attached.
#[derive(Debug, Clone, Copy)]
struct WorkItem {
    start: usize,
    end: usize,
    slot: Slot,
    depth: usize,
}

#[derive(Debug, Clone, Copy)]
enum Slot {
    Root,
    Left(u32),
    Right(u32),
}

/// Build the node arena with an explicit worklist, so deep trees can't overflow the stack.
///
/// Returns the nodes, root first, and the depth of the tree.
fn build_nodes<N: IndexableNum>(coords: &[N], num_dims: usize) -> (Vec<KDNode>, usize) {
    let num_items = coords.len() / num_dims;
    let mut ids: Vec<u32> = (0..num_items as u32).collect();
    let mut nodes: Vec<KDNode> = Vec::with_capacity(num_items);
    let mut max_depth = 0;

    let mut work = vec![];
    if num_items > 0 {
        work.push(WorkItem {
            start: 0,
            end: num_items,
            slot: Slot::Root,
            depth: 0,
        });
    }

    while let Some(item) = work.pop() {
        let axis = item.depth % num_dims;
        max_depth = max_depth.max(item.depth + 1);

        // Ties are broken by id so the tree shape only depends on the input
        ids[item.start..item.end].sort_unstable_by(|&a, &b| {
            let a_value = coords[a as usize * num_dims + axis];
            let b_value = coords[b as usize * num_dims + axis];
            a_value
                .partial_cmp(&b_value)
                .unwrap_or(Ordering::Equal)
                .then(a.cmp(&b))
        });

        let median = item.start + (item.end - item.start) / 2;
        let index = nodes.len() as u32;
        nodes.push(KDNode::new(ids[median], axis));

        match item.slot {
            Slot::Root => {}
            Slot::Left(parent) => nodes[parent as usize].left = index,
            Slot::Right(parent) => nodes[parent as usize].right = index,
        }

        if item.start < median {
            work.push(WorkItem {
                start: item.start,
                end: median,
                slot: Slot::Left(index),
                depth: item.depth + 1,
            });
        }
        if median + 1 < item.end {
            work.push(WorkItem {
                start: median + 1,
                end: item.end,
                slot: Slot::Right(index),
                depth: item.depth + 1,
            });
        }
    }

    (nodes, max_depth)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rejects_zero_dimensions() {
        assert_eq!(
            KDTreeBuilder::<f64>::new(0).unwrap_err(),
            KDIndexError::ZeroDimensions
        );
        assert_eq!(
            KDTreeBuilder::<f64>::with_capacity(0, 10).unwrap_err(),
            KDIndexError::ZeroDimensions
        );
    }

    #[test]
    fn rejected_points_are_not_recorded() {
        let mut builder = KDTreeBuilder::new(2).unwrap();
        assert_eq!(builder.add(&[1., 2.]).unwrap(), 0);
        assert_eq!(
            builder.add(&[1., 2., 3.]).unwrap_err(),
            KDIndexError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        );
        assert_eq!(
            builder.add(&[1., f64::NAN]).unwrap_err(),
            KDIndexError::InvalidCoordinate { axis: 1 }
        );
        assert_eq!(builder.num_items(), 1);
        assert_eq!(builder.add(&[3., 4.]).unwrap(), 1);
    }

    #[test]
    fn interleaved_is_all_or_nothing() {
        let mut builder = KDTreeBuilder::new(2).unwrap();
        builder.add_interleaved(&[0., 0., 1., 1.]).unwrap();
        assert_eq!(builder.num_items(), 2);

        assert!(matches!(
            builder.add_interleaved(&[2., 2., 3.]),
            Err(KDIndexError::General(_))
        ));
        assert_eq!(
            builder
                .add_interleaved(&[2., 2., f64::INFINITY, 3.])
                .unwrap_err(),
            KDIndexError::InvalidCoordinate { axis: 0 }
        );
        assert_eq!(builder.num_items(), 2);
    }

    #[test]
    fn add_coord() {
        let mut builder = KDTreeBuilder::new(2).unwrap();
        assert_eq!(builder.add_coord(&(1., 2.)).unwrap(), 0);
        assert_eq!(builder.add_coord(&(3., 4.)).unwrap(), 1);
        let tree = builder.finish().unwrap();
        assert_eq!(tree.into_inner(), vec![1., 2., 3., 4.]);

        let mut builder = KDTreeBuilder::new(3).unwrap();
        assert_eq!(
            builder.add_coord(&(1., 2.)).unwrap_err(),
            KDIndexError::DimensionMismatch {
                expected: 3,
                actual: 2
            }
        );
    }

    #[test]
    fn finish_checks_expected_count() {
        let mut builder = KDTreeBuilder::with_capacity(2, 3).unwrap();
        builder.add(&[0., 0.]).unwrap();
        builder.add(&[1., 1.]).unwrap();
        assert_eq!(
            builder.finish().unwrap_err(),
            KDIndexError::ItemCountMismatch {
                expected: 3,
                actual: 2
            }
        );
    }

    #[test]
    fn with_capacity_limits_ids() {
        let too_many = u32::MAX as usize + 1;
        assert_eq!(
            KDTreeBuilder::<f32>::with_capacity(1, too_many).unwrap_err(),
            KDIndexError::TooManyItems(too_many)
        );
    }

    #[test]
    fn median_split_layout() {
        // Sorted on x: (5,2) id 2, (6,4) id 1, (7,1) id 0; median is id 1
        let coords = [7., 1., 6., 4., 5., 2.];
        let (nodes, depth) = build_nodes(&coords, 2);

        assert_eq!(depth, 2);
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[0].id(), 1);
        assert_eq!(nodes[0].axis(), 0);

        let left = nodes[nodes[0].left().unwrap() as usize];
        let right = nodes[nodes[0].right().unwrap() as usize];
        assert_eq!((left.id(), left.axis()), (2, 1));
        assert_eq!((right.id(), right.axis()), (0, 1));
        assert!(left.left().is_none() && left.right().is_none());
        assert!(right.left().is_none() && right.right().is_none());
    }

    #[test]
    fn ties_are_split_by_id() {
        // All x are equal, so the root on axis 0 is the median by id
        let coords = [8., 0., 8., 5., 8., 9.];
        let (nodes, _) = build_nodes(&coords, 2);
        assert_eq!(nodes[0].id(), 1);
        assert_eq!(nodes[nodes[0].left().unwrap() as usize].id(), 0);
        assert_eq!(nodes[nodes[0].right().unwrap() as usize].id(), 2);
    }

    #[test]
    fn empty_input() {
        let (nodes, depth) = build_nodes::<f64>(&[], 3);
        assert!(nodes.is_empty());
        assert_eq!(depth, 0);
    }
}
