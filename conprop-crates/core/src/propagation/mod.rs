//! The per-thread side of a constraint: [`ConstraintState`] and the interfaces through which it
//! talks to the search loop.
//!
//! A state never owns the domains. It reads them through a [`PropagationContext`], proposes
//! tightenings through a [`PropagationContextMut`], and tells the search loop which events it is
//! interested in through [`Watchers`] when it is attached.
mod context;
mod distinct_state;
mod domains;
mod linear;
mod minimize_state;
mod options;
mod search;
mod state;
mod sum_state;
mod trailed;
mod watches;

pub use context::PropagationContext;
pub use context::PropagationContextMut;
pub use distinct_state::DistinctState;
pub use domains::DomainStore;
pub use domains::EmptyDomain;
pub use domains::ReadDomains;
pub use domains::Tightening;
pub use minimize_state::MinimizeState;
pub use options::PropagationOptions;
pub use options::ReasonRefinement;
pub use search::LiteralValue;
pub use search::SearchLoop;
pub use state::ConstraintState;
pub(crate) use state::StateStatistics;
pub use state::StateStatus;
pub use sum_state::SumState;
pub(crate) use trailed::TrailedInteger;
pub(crate) use trailed::TrailedValues;
pub use watches::DomainEvent;
pub use watches::DomainEvents;
pub use watches::EnqueueDecision;
pub use watches::LocalId;
pub use watches::Priority;
pub use watches::Watchers;
