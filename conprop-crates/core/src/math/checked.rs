//! Overflow-checked arithmetic used while normalising constraints.
//!
//! Propagation itself never overflows since it works on `i128` accumulators; these helpers guard
//! the values that end up stored in a constraint definition.
use crate::basic_types::ConstructionError;
use crate::variables::Value;

/// The smallest value a variable or a stored constant may take.
pub const MIN_VALUE: Value = -MAX_VALUE;
/// The largest value a variable or a stored constant may take.
pub const MAX_VALUE: Value = (1 << 30) - 1;

/// Returns `value` as a [`Value`] if it lies in [`MIN_VALUE`, `MAX_VALUE`].
pub fn check_valid_value(value: i64) -> Result<Value, ConstructionError> {
    if (MIN_VALUE as i64..=MAX_VALUE as i64).contains(&value) {
        Ok(value as Value)
    } else {
        Err(ConstructionError::ValueOutOfRange { value })
    }
}

pub fn checked_add(lhs: Value, rhs: Value) -> Result<Value, ConstructionError> {
    lhs.checked_add(rhs)
        .ok_or(ConstructionError::ValueOutOfRange {
            value: lhs as i64 + rhs as i64,
        })
}

pub fn checked_sub(lhs: Value, rhs: Value) -> Result<Value, ConstructionError> {
    lhs.checked_sub(rhs)
        .ok_or(ConstructionError::ValueOutOfRange {
            value: lhs as i64 - rhs as i64,
        })
}

pub fn checked_mul(lhs: Value, rhs: Value) -> Result<Value, ConstructionError> {
    lhs.checked_mul(rhs)
        .ok_or(ConstructionError::ValueOutOfRange {
            value: lhs as i64 * rhs as i64,
        })
}

pub fn checked_neg(value: Value) -> Result<Value, ConstructionError> {
    value
        .checked_neg()
        .ok_or(ConstructionError::ValueOutOfRange {
            value: -(value as i64),
        })
}

/// Adds two sums of products, reporting the saturated result on overflow.
pub(crate) fn checked_sum_add(lhs: i64, rhs: i64) -> Result<i64, ConstructionError> {
    lhs.checked_add(rhs)
        .ok_or(ConstructionError::ValueOutOfRange {
            value: lhs.saturating_add(rhs),
        })
}

pub(crate) fn checked_sum_mul(lhs: i64, rhs: i64) -> Result<i64, ConstructionError> {
    lhs.checked_mul(rhs)
        .ok_or(ConstructionError::ValueOutOfRange {
            value: lhs.saturating_mul(rhs),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admissible_range_is_symmetric() {
        assert_eq!(Ok(MAX_VALUE), check_valid_value(MAX_VALUE as i64));
        assert_eq!(Ok(MIN_VALUE), check_valid_value(MIN_VALUE as i64));
        assert!(check_valid_value(MAX_VALUE as i64 + 1).is_err());
        assert!(check_valid_value(MIN_VALUE as i64 - 1).is_err());
    }

    #[test]
    fn overflow_is_reported_with_the_exact_value() {
        assert_eq!(
            Err(ConstructionError::ValueOutOfRange {
                value: i32::MAX as i64 + 1
            }),
            checked_add(i32::MAX, 1)
        );
        assert_eq!(
            Err(ConstructionError::ValueOutOfRange {
                value: i32::MIN as i64 - 1
            }),
            checked_sub(i32::MIN, 1)
        );
        assert_eq!(
            Err(ConstructionError::ValueOutOfRange {
                value: -(i32::MIN as i64)
            }),
            checked_neg(i32::MIN)
        );
        assert_eq!(Ok(-12), checked_mul(3, -4));
    }

    #[test]
    fn sums_saturate_in_the_error() {
        assert_eq!(
            Err(ConstructionError::ValueOutOfRange { value: i64::MAX }),
            checked_sum_add(i64::MAX, 1)
        );
        assert_eq!(
            Err(ConstructionError::ValueOutOfRange { value: i64::MIN }),
            checked_sum_mul(i64::MAX, -2)
        );
    }
}
