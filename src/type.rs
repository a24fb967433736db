use std::fmt::Debug;

use num_traits::{Num, NumCast, ToPrimitive};

/// A trait for types that can be used for indexed coordinates.
///
/// This trait is sealed and cannot be implemented for external types. Only floating point types
/// are supported: squared distances are computed in the coordinate type itself, where integers
/// would overflow for moderately sized coordinates.
pub trait IndexableNum:
    private::Sealed
    + Num
    + NumCast
    + ToPrimitive
    + PartialOrd
    + Copy
    + Default
    + Debug
    + Send
    + Sync
{
    /// Returns `true` unless this value is a floating point NaN or infinity.
    #[inline]
    fn is_finite(self) -> bool {
        self.to_f64().is_some_and(f64::is_finite)
    }
}

impl IndexableNum for f32 {}

impl IndexableNum for f64 {}

// https://rust-lang.github.io/api-guidelines/future-proofing.html#sealed-traits-protect-against-downstream-implementations-c-sealed
mod private {
    pub trait Sealed {}

    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

#[cfg(test)]
mod test {
    use super::IndexableNum;

    #[test]
    fn detects_non_finite() {
        assert!(!IndexableNum::is_finite(f64::NAN));
        assert!(!IndexableNum::is_finite(f32::NAN));
        assert!(!IndexableNum::is_finite(f64::NEG_INFINITY));
        assert!(IndexableNum::is_finite(1.5f64));
        assert!(IndexableNum::is_finite(f32::MAX));
        assert!(IndexableNum::is_finite(-7f32));
    }
}
