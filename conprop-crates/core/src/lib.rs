pub(crate) mod basic_types;
pub(crate) mod conprop_asserts;

pub mod constraints;
pub mod containers;
pub mod engine;
pub mod math;
pub mod predicates;
pub mod propagation;
pub mod statistics;
pub mod variables;

pub use convert_case;

pub use crate::basic_types::ConstructionError;
pub use crate::basic_types::Inconsistency;
pub use crate::basic_types::PropagationStatus;
pub use crate::basic_types::PropagatorConflict;
