use std::fmt::Display;
use std::fmt::Formatter;

use log::debug;
use log::warn;

use super::sort_by_magnitude;
use super::SumConstraint;
use crate::basic_types::ConstructionError;
use crate::containers::InlineSliceArc;
use crate::math::checked_sub;
use crate::variables::CoVar;
use crate::variables::Literal;
use crate::variables::Value;
use crate::variables::TRUE_LIT;

#[derive(Debug, Clone, Copy)]
pub(crate) struct MinimizeHeader {
    adjust: Value,
}

/// The objective `Σ c·x + adjust`, which is to be minimized.
///
/// An objective is always active, so its literal is [`TRUE_LIT`].
#[derive(Debug, Clone)]
pub struct MinimizeConstraint {
    block: InlineSliceArc<MinimizeHeader, CoVar>,
}

impl MinimizeConstraint {
    /// Creates the objective, optionally ordering the elements by descending absolute
    /// coefficient.
    pub fn create(
        adjust: Value,
        elements: &[CoVar],
        sort: bool,
    ) -> Result<MinimizeConstraint, ConstructionError> {
        if elements.iter().any(|&(coefficient, _)| coefficient == 0) {
            warn!("objective created with a zero coefficient");
        }

        let mut block = InlineSliceArc::new(MinimizeHeader { adjust }, elements)?;
        if sort {
            if let Some(elements) = block.get_mut_slice() {
                sort_by_magnitude(elements);
            }
        }

        debug!(
            "created objective over {} elements with adjustment {adjust} (sorted: {sort})",
            elements.len()
        );
        Ok(MinimizeConstraint { block })
    }

    pub fn literal(&self) -> Literal {
        TRUE_LIT
    }

    pub fn adjust(&self) -> Value {
        self.block.header().adjust
    }

    pub fn as_slice(&self) -> &[CoVar] {
        self.block.as_slice()
    }

    /// A new objective with the same elements and a different adjustment.
    ///
    /// Handles to `self` stay valid; states created from them keep using the old adjustment.
    pub fn with_adjust(&self, adjust: Value) -> Result<MinimizeConstraint, ConstructionError> {
        Ok(MinimizeConstraint {
            block: InlineSliceArc::new(MinimizeHeader { adjust }, self.as_slice())?,
        })
    }

    /// The hard constraint `Σ c·x + adjust <= cost`.
    pub fn bounded_by(&self, cost: Value) -> Result<SumConstraint, ConstructionError> {
        let rhs = checked_sub(cost, self.adjust())?;
        SumConstraint::create(TRUE_LIT, rhs, self.as_slice(), false)
    }
}

super::impl_element_access!(MinimizeConstraint);

impl Display for MinimizeConstraint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "minimize ")?;
        super::write_linear(f, self.as_slice())?;
        write!(f, " + {}", self.adjust())
    }
}
