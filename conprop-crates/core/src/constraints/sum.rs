use std::fmt::Display;
use std::fmt::Formatter;

use log::debug;
use log::warn;

use super::sort_by_magnitude;
use crate::basic_types::ConstructionError;
use crate::containers::InlineSliceArc;
use crate::variables::CoVar;
use crate::variables::Literal;
use crate::variables::Value;

#[derive(Debug, Clone, Copy)]
pub(crate) struct SumHeader {
    literal: Literal,
    rhs: Value,
}

/// The constraint `literal -> Σ c·x <= rhs`.
///
/// The literal, the right-hand side and the elements live in one shared block; cloning the
/// handle is cheap and never copies the elements.
#[derive(Debug, Clone)]
pub struct SumConstraint {
    block: InlineSliceArc<SumHeader, CoVar>,
}

impl SumConstraint {
    /// Creates the constraint, optionally ordering the elements by descending absolute
    /// coefficient.
    ///
    /// Fails if the block holding `elements` cannot be sized or allocated. An empty sequence of
    /// elements is allowed; its sum is 0.
    pub fn create(
        literal: Literal,
        rhs: Value,
        elements: &[CoVar],
        sort: bool,
    ) -> Result<SumConstraint, ConstructionError> {
        if elements.iter().any(|&(coefficient, _)| coefficient == 0) {
            warn!("sum constraint created with a zero coefficient");
        }

        let mut block = InlineSliceArc::new(SumHeader { literal, rhs }, elements)?;
        if sort {
            if let Some(elements) = block.get_mut_slice() {
                sort_by_magnitude(elements);
            }
        }

        debug!(
            "created sum over {} elements with rhs {rhs} (sorted: {sort})",
            elements.len()
        );
        Ok(SumConstraint { block })
    }

    pub fn literal(&self) -> Literal {
        self.block.header().literal
    }

    pub fn rhs(&self) -> Value {
        self.block.header().rhs
    }

    /// Whether both handles refer to the same block.
    pub fn ptr_eq(&self, other: &SumConstraint) -> bool {
        InlineSliceArc::ptr_eq(&self.block, &other.block)
    }

    pub fn as_slice(&self) -> &[CoVar] {
        self.block.as_slice()
    }
}

super::impl_element_access!(SumConstraint);

impl Display for SumConstraint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if !self.literal().is_true_literal() {
            write!(f, "{} -> ", self.literal())?;
        }
        super::write_linear(f, self.as_slice())?;
        write!(f, " <= {}", self.rhs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variables::IntVar;
    use crate::variables::TRUE_LIT;

    #[test]
    fn elements_keep_their_order_without_sorting() {
        let x = IntVar::new(0);
        let y = IntVar::new(1);
        let z = IntVar::new(2);

        let sum = SumConstraint::create(TRUE_LIT, 5, &[(1, x), (-4, y), (2, z)], false).unwrap();

        assert_eq!(3, sum.len());
        assert_eq!(&[(1, x), (-4, y), (2, z)], sum.as_slice());
        assert_eq!((-4, y), sum[1]);
        assert_eq!(5, sum.rhs());
        assert_eq!(TRUE_LIT, sum.literal());
    }

    #[test]
    fn sorting_orders_by_descending_magnitude() {
        let x = IntVar::new(0);
        let y = IntVar::new(1);
        let z = IntVar::new(2);

        let sum = SumConstraint::create(TRUE_LIT, 5, &[(1, x), (-4, y), (2, z)], true).unwrap();

        assert_eq!(&[(-4, y), (2, z), (1, x)], sum.as_slice());
    }

    #[test]
    fn clones_share_the_elements() {
        let x = IntVar::new(0);
        let sum = SumConstraint::create(Literal::new(4), 1, &[(1, x)], false).unwrap();
        let copy = sum.clone();

        assert!(sum.ptr_eq(&copy));
        assert_eq!(Literal::new(4), copy.literal());
    }

    #[test]
    fn empty_sum_is_allowed() {
        let sum = SumConstraint::create(TRUE_LIT, 0, &[], true).unwrap();

        assert!(sum.is_empty());
        assert_eq!(0, sum.iter().count());
    }

    #[test]
    fn display_shows_the_inequality() {
        let x = IntVar::new(0);
        let y = IntVar::new(1);
        let sum = SumConstraint::create(Literal::new(2), 3, &[(2, x), (-1, y)], false).unwrap();

        assert_eq!("l2 -> 2*x0 + -1*x1 <= 3", sum.to_string());
    }
}
