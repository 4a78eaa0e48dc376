use log::trace;

use crate::basic_types::ConstructionError;
use crate::containers::HashMap;
use crate::math::check_valid_value;
use crate::math::checked_add;
use crate::math::checked_sub;
use crate::math::checked_sum_add;
use crate::math::checked_sum_mul;
use crate::math::MAX_VALUE;
use crate::math::MIN_VALUE;
use crate::variables::CoVarVec;
use crate::variables::IntVar;
use crate::variables::Value;

/// A linear expression `Σ c·x + constant` as written by the user: an element without a variable
/// is a constant.
pub type RawTerm = (Value, Option<IntVar>);

/// The normal form of a linear expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimplifiedTerms {
    /// Every variable occurs at most once and no coefficient is zero. Variables keep the
    /// position of their first occurrence.
    pub elements: CoVarVec,
    /// The sum of the constant elements.
    pub constant: Value,
}

/// Brings `Σ c·x + constant` into normal form.
///
/// Repeated variables are merged by adding their coefficients, constants are summed up, and
/// elements with a zero coefficient are dropped. Fails if a coefficient or the constant leaves
/// the admissible value range, or if the expression can exceed `i64` for variables in
/// [`MIN_VALUE`, `MAX_VALUE`].
pub fn simplify(
    terms: impl IntoIterator<Item = RawTerm>,
) -> Result<SimplifiedTerms, ConstructionError> {
    let mut elements = CoVarVec::new();
    let mut positions: HashMap<IntVar, usize> = HashMap::default();
    let mut constant: Value = 0;

    for (coefficient, var) in terms {
        if coefficient == 0 {
            continue;
        }

        match var {
            None => constant = checked_add(constant, coefficient)?,
            Some(var) => match positions.get(&var) {
                Some(&position) => {
                    elements[position].0 = checked_add(elements[position].0, coefficient)?;
                }
                None => {
                    let _ = positions.insert(var, elements.len());
                    elements.push((coefficient, var));
                }
            },
        }
    }

    elements.retain(|&(coefficient, _)| coefficient != 0);

    let constant = check_valid_value(constant as i64)?;
    let mut minimum = constant as i64;
    let mut maximum = constant as i64;
    for &(coefficient, _) in &elements {
        let _ = check_valid_value(coefficient as i64)?;

        let (low, high) = if coefficient > 0 {
            (MIN_VALUE, MAX_VALUE)
        } else {
            (MAX_VALUE, MIN_VALUE)
        };
        minimum = checked_sum_add(minimum, checked_sum_mul(coefficient as i64, low as i64)?)?;
        maximum = checked_sum_add(maximum, checked_sum_mul(coefficient as i64, high as i64)?)?;
    }

    trace!(
        "simplified to {} elements, constant {constant}, range [{minimum}, {maximum}]",
        elements.len()
    );
    Ok(SimplifiedTerms { elements, constant })
}

/// Moves the constant of `terms` to the right-hand side of `terms <= rhs`.
pub(crate) fn fold_into_rhs(rhs: Value, constant: Value) -> Result<Value, ConstructionError> {
    check_valid_value(checked_sub(rhs, constant)? as i64)
}
