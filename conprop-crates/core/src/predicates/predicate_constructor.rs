use super::predicate::Predicate;
use super::predicate::PredicateType;
use crate::variables::IntVar;
use crate::variables::Value;

/// A trait which defines methods for creating a [`Predicate`].
pub trait PredicateConstructor {
    /// The value used to represent a bound.
    type Value;

    /// Creates a lower-bound predicate (e.g. `[x >= v]`).
    fn lower_bound_predicate(&self, bound: Self::Value) -> Predicate;

    /// Creates an upper-bound predicate (e.g. `[x <= v]`).
    fn upper_bound_predicate(&self, bound: Self::Value) -> Predicate;

    /// Creates an equality predicate (e.g. `[x == v]`).
    fn equality_predicate(&self, bound: Self::Value) -> Predicate;

    /// Creates a disequality predicate (e.g. `[x != v]`).
    fn disequality_predicate(&self, bound: Self::Value) -> Predicate;
}

impl PredicateConstructor for IntVar {
    type Value = Value;

    fn lower_bound_predicate(&self, bound: Self::Value) -> Predicate {
        Predicate::new(*self, PredicateType::LowerBound, bound)
    }

    fn upper_bound_predicate(&self, bound: Self::Value) -> Predicate {
        Predicate::new(*self, PredicateType::UpperBound, bound)
    }

    fn equality_predicate(&self, bound: Self::Value) -> Predicate {
        Predicate::new(*self, PredicateType::Equal, bound)
    }

    fn disequality_predicate(&self, bound: Self::Value) -> Predicate {
        Predicate::new(*self, PredicateType::NotEqual, bound)
    }
}

/// A macro which allows for the creation of a [`Predicate`].
///
/// # Example
/// ```rust
/// # use conprop_core::predicate;
/// # use conprop_core::variables::IntVar;
/// let x = IntVar::new(0);
///
/// let lower_bound_predicate = predicate!(x >= 5);
/// assert_eq!(lower_bound_predicate.get_domain(), Some(x));
/// assert_eq!(lower_bound_predicate.get_right_hand_side(), Some(5));
///
/// let upper_bound_predicate = predicate!(x <= 5);
/// assert!(upper_bound_predicate.is_upper_bound_predicate());
///
/// let equality_predicate = predicate!(x == 5);
/// assert!(equality_predicate.is_equality_predicate());
///
/// let disequality_predicate = predicate!(x != 5);
/// assert!(disequality_predicate.is_not_equal_predicate());
/// ```
#[macro_export]
macro_rules! predicate {
    ($($var:ident).+$([$index:expr])? >= $bound:expr) => {{
        #[allow(unused, reason = "could be imported at call-site")]
        use $crate::predicates::PredicateConstructor;
        $($var).+$([$index])?.lower_bound_predicate($bound)
    }};
    ($($var:ident).+$([$index:expr])? <= $bound:expr) => {{
        #[allow(unused, reason = "could be imported at call-site")]
        use $crate::predicates::PredicateConstructor;
        $($var).+$([$index])?.upper_bound_predicate($bound)
    }};
    ($($var:ident).+$([$index:expr])? == $value:expr) => {{
        #[allow(unused, reason = "could be imported at call-site")]
        use $crate::predicates::PredicateConstructor;
        $($var).+$([$index])?.equality_predicate($value)
    }};
    ($($var:ident).+$([$index:expr])? != $value:expr) => {{
        #[allow(unused, reason = "could be imported at call-site")]
        use $crate::predicates::PredicateConstructor;
        $($var).+$([$index])?.disequality_predicate($value)
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macro_local_identifiers_are_matched() {
        let x = IntVar::new(0);

        assert_eq!(Some(x), predicate![x >= 2].get_domain());
        assert_eq!(Some(x), predicate![x <= 3].get_domain());
        assert_eq!(Some(x), predicate![x == 5].get_domain());
        assert_eq!(Some(x), predicate![x != 5].get_domain());

        assert_eq!(Some(2), predicate![x >= 2].get_right_hand_side());
        assert_eq!(Some(3), predicate![x <= 3].get_right_hand_side());

        assert!(predicate!(x >= 2).is_lower_bound_predicate());
        assert!(!predicate!(x >= 2).is_upper_bound_predicate());
        assert!(predicate!(x <= 3).is_upper_bound_predicate());
        assert!(predicate!(x == 5).is_equality_predicate());
        assert!(predicate!(x != 5).is_not_equal_predicate());
    }

    #[test]
    fn macro_nested_identifiers_are_matched() {
        struct Wrapper {
            x: IntVar,
        }

        let wrapper = Wrapper { x: IntVar::new(1) };

        assert_eq!(Some(wrapper.x), predicate![wrapper.x >= 2].get_domain());
    }

    #[test]
    fn macro_index_expressions_are_matched() {
        let vars = [IntVar::new(4), IntVar::new(5)];

        assert_eq!(Some(vars[1]), predicate![vars[1] <= 2].get_domain());
    }
}
