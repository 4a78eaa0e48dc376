mod construction_error;
mod propagation_status;
mod trail;

pub use construction_error::ConstructionError;
pub use propagation_status::Inconsistency;
pub use propagation_status::PropagationStatus;
pub use propagation_status::PropagatorConflict;
pub(crate) use trail::Trail;
