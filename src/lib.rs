#![doc = include_str!("../README.md")]

mod distance;
mod error;
pub mod kdtree;
mod r#type;

pub use distance::squared_distance;
pub use error::KDIndexError;
pub use r#type::IndexableNum;

#[cfg(test)]
pub(crate) mod test;
