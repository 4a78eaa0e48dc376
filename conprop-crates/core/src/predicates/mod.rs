//! Atomic constraints over the variables and literals of the search loop, and conjunctions of
//! them which serve as reasons.
mod predicate;
mod predicate_constructor;
mod propositional_conjunction;

pub use predicate::Predicate;
pub use predicate::PredicateType;
pub use predicate_constructor::PredicateConstructor;
pub use propositional_conjunction::PropositionalConjunction;
