//! Integer arithmetic helpers.
mod checked;
pub(crate) mod num_ext;

pub use checked::*;
