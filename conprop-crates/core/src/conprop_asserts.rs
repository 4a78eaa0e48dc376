//! Leveled assertions. Which levels are active is decided at compile time: release builds only
//! check [`CONPROP_ASSERT_SIMPLE`] assertions, while tests and builds with the `debug-checks`
//! feature check everything up to [`CONPROP_ASSERT_EXTREME`].
//!
//! A failing assertion signals a programming defect (for example a state that is driven outside
//! of its lifecycle, or bookkeeping that disagrees with the constraint it was created from); it is
//! never used for conditions the search loop is expected to recover from.

#[cfg(all(not(test), not(feature = "debug-checks")))]
pub const CONPROP_ASSERT_LEVEL_DEFINITION: u8 = CONPROP_ASSERT_SIMPLE;

#[cfg(any(test, feature = "debug-checks"))]
pub const CONPROP_ASSERT_LEVEL_DEFINITION: u8 = CONPROP_ASSERT_EXTREME;

/// Cheap checks, always enabled.
pub const CONPROP_ASSERT_SIMPLE: u8 = 1;
/// Checks that cost at most a constant factor on top of the checked operation.
pub const CONPROP_ASSERT_MODERATE: u8 = 2;
/// Checks that recompute state from scratch.
pub const CONPROP_ASSERT_ADVANCED: u8 = 3;
pub const CONPROP_ASSERT_EXTREME: u8 = 4;

#[macro_export]
#[doc(hidden)]
macro_rules! conprop_assert_simple {
    ($($arg:tt)*) => {
        if $crate::conprop_asserts::CONPROP_ASSERT_LEVEL_DEFINITION
            >= $crate::conprop_asserts::CONPROP_ASSERT_SIMPLE
        {
            assert!($($arg)*);
        }
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! conprop_assert_eq_simple {
    ($($arg:tt)*) => {
        if $crate::conprop_asserts::CONPROP_ASSERT_LEVEL_DEFINITION
            >= $crate::conprop_asserts::CONPROP_ASSERT_SIMPLE
        {
            assert_eq!($($arg)*);
        }
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! conprop_assert_moderate {
    ($($arg:tt)*) => {
        if $crate::conprop_asserts::CONPROP_ASSERT_LEVEL_DEFINITION
            >= $crate::conprop_asserts::CONPROP_ASSERT_MODERATE
        {
            assert!($($arg)*);
        }
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! conprop_assert_eq_moderate {
    ($($arg:tt)*) => {
        if $crate::conprop_asserts::CONPROP_ASSERT_LEVEL_DEFINITION
            >= $crate::conprop_asserts::CONPROP_ASSERT_MODERATE
        {
            assert_eq!($($arg)*);
        }
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! conprop_assert_advanced {
    ($($arg:tt)*) => {
        if $crate::conprop_asserts::CONPROP_ASSERT_LEVEL_DEFINITION
            >= $crate::conprop_asserts::CONPROP_ASSERT_ADVANCED
        {
            assert!($($arg)*);
        }
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! conprop_assert_extreme {
    ($($arg:tt)*) => {
        if $crate::conprop_asserts::CONPROP_ASSERT_LEVEL_DEFINITION
            >= $crate::conprop_asserts::CONPROP_ASSERT_EXTREME
        {
            assert!($($arg)*);
        }
    };
}
