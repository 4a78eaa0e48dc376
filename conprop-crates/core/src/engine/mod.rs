//! Drives the constraint states of one search thread.
//!
//! A [`StateStore`] holds one [`ConstraintState`](crate::propagation::ConstraintState) per
//! constraint, routes domain events to them and runs them to a fixed point. Threads which
//! cooperate on an optimisation problem exchange their incumbents through a
//! [`SharedObjective`].
mod objective;
mod propagator_queue;
mod state_store;
#[cfg(test)]
pub(crate) mod test_solver;

pub use objective::SharedObjective;
pub(crate) use propagator_queue::PropagatorQueue;
pub use state_store::StateId;
pub use state_store::StateStore;
