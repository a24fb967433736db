//! An implementation of an immutable k-dimensional K-D Tree with exact nearest-neighbor search.

#![warn(missing_docs)]

mod builder;
mod candidates;
pub(crate) mod constants;
mod index;
mod r#trait;
mod traversal;

pub use builder::KDTreeBuilder;
pub use index::{KDNode, KDTree, KDTreeRef};
pub use r#trait::KDTreeIndex;
pub use traversal::Node;
