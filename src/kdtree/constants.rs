/// Sentinel for a missing child link in the node arena.
pub(crate) const NO_CHILD: u32 = u32::MAX;

/// Arena index of the root node. The builder always emits the root first.
pub(crate) const ROOT: u32 = 0;
