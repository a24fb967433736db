//! Squared Euclidean distances.
//!
//! Every comparison in this crate is made between squared distances, which are order-equivalent to
//! true distances and avoid a square root.

use crate::r#type::IndexableNum;

/// Squared Euclidean distance between two points of the same dimensionality.
///
/// ```
/// use kd_index::squared_distance;
///
/// assert_eq!(squared_distance(&[1., 2.], &[4., 6.]), 25.);
/// ```
#[inline]
pub fn squared_distance<N: IndexableNum>(a: &[N], b: &[N]) -> N {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).fold(N::zero(), |sum, (&a, &b)| {
        let d = a - b;
        sum + d * d
    })
}

/// Squared distance from a point to the axis-aligned hyperplane through `plane` on `axis`.
#[inline]
pub(crate) fn sq_axis_dist<N: IndexableNum>(point: &[N], plane: &[N], axis: usize) -> N {
    let d = point[axis] - plane[axis];
    d * d
}
