use crate::variables::Literal;

/// The truth value of a literal in the current assignment of the search loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralValue {
    Unset,
    True,
    False,
}

/// What the constraint states need to know about the search loop that drives them.
pub trait SearchLoop {
    fn literal_value(&self, literal: Literal) -> LiteralValue;

    /// The current decision level; the root is level 0.
    fn decision_level(&self) -> usize;

    /// The objective value of the best solution found so far, if any. Minimize states only
    /// propagate once an incumbent exists.
    fn objective_bound(&self) -> Option<i64>;
}
