use crate::predicates::Predicate;
use crate::predicates::PropositionalConjunction;
use crate::variables::IntVar;
use crate::variables::Value;

/// Read access to the current domains of the integer variables.
pub trait ReadDomains {
    fn lower_bound(&self, var: IntVar) -> Value;

    fn upper_bound(&self, var: IntVar) -> Value;

    /// Whether `value` is still admissible for `var`. Stores which only track bounds can rely on
    /// the default implementation.
    fn contains(&self, var: IntVar, value: Value) -> bool {
        self.lower_bound(var) <= value && value <= self.upper_bound(var)
    }

    fn is_fixed(&self, var: IntVar) -> bool {
        self.lower_bound(var) == self.upper_bound(var)
    }
}

/// The domain store of the search loop: it owns the domains and applies the tightenings proposed
/// by the constraint states.
pub trait DomainStore: ReadDomains {
    /// Applies `predicate` with `reason` as its justification.
    ///
    /// The predicate is either an integer predicate or a literal, in which case the literal is
    /// assigned true. Returns whether the store changed, or [`EmptyDomain`] if the predicate
    /// contradicts the current domain; in the latter case the store keeps the reason so that it
    /// can explain the failure.
    fn post(
        &mut self,
        predicate: Predicate,
        reason: PropositionalConjunction,
    ) -> Result<Tightening, EmptyDomain>;
}

/// The feedback of the domain store on a posted predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tightening {
    /// The domain changed.
    Applied,
    /// The domain already satisfied the predicate.
    AlreadyEntailed,
}

/// A posted predicate emptied a domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyDomain;
