/// Options which influence how the constraint states propagate.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PropagationOptions {
    pub reason_refinement: ReasonRefinement,
}

/// Determines how the bound predicates in a linear reason are chosen.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum ReasonRefinement {
    /// Every term contributes its current bound.
    #[default]
    Plain,
    /// The slack between the derived bound and the current bounds is spent on weakening the
    /// predicates of the reason, in element order.
    Weakened,
}

impl std::fmt::Display for ReasonRefinement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReasonRefinement::Plain => write!(f, "plain"),
            ReasonRefinement::Weakened => write!(f, "weakened"),
        }
    }
}
