use crate::predicates::PropositionalConjunction;
use crate::propagation::EmptyDomain;

/// The result of invoking a constraint state. The propagation can either succeed or identify a
/// conflict. The necessary conditions for the conflict must be captured in the error variant,
/// i.e. a propositional conjunction.
pub type PropagationStatus = Result<(), Inconsistency>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inconsistency {
    /// A tightening posted to the domain store emptied a domain. The reason was handed to the
    /// store together with the tightening.
    EmptyDomain,
    Conflict(PropagatorConflict),
}

impl From<EmptyDomain> for Inconsistency {
    fn from(_: EmptyDomain) -> Self {
        Inconsistency::EmptyDomain
    }
}

impl From<PropagatorConflict> for Inconsistency {
    fn from(conflict: PropagatorConflict) -> Self {
        Inconsistency::Conflict(conflict)
    }
}

/// A conflict stated by a constraint state. A state that identifies a conflict that is _not_ an
/// empty domain, describes that conflict with this type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropagatorConflict {
    /// The conjunction that describes the infeasible partial assignment.
    pub conjunction: PropositionalConjunction,
}
