use thiserror::Error;

#[cfg(doc)]
use crate::constraints::Model;
#[cfg(doc)]
use crate::math::MAX_VALUE;
#[cfg(doc)]
use crate::math::MIN_VALUE;

/// Errors which can occur while building a constraint definition.
///
/// None of these are recoverable by the search loop; they are reported to whoever is setting up
/// the [`Model`].
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConstructionError {
    /// The number of bytes needed to store the header together with the elements does not fit in
    /// the address space.
    #[error("Storing {elements} elements in a single block overflows the allocation size")]
    SizeOverflow { elements: usize },
    /// The allocator could not provide the requested block.
    #[error("Failed to allocate {bytes} bytes for the constraint storage")]
    AllocationFailure { bytes: usize },
    /// A coefficient, constant or implied sum lies outside of [`MIN_VALUE`, `MAX_VALUE`].
    #[error("The value {value} is outside of the admissible value range")]
    ValueOutOfRange { value: i64 },
}
