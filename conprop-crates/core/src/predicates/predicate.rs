use crate::predicate;
use crate::variables::IntVar;
use crate::variables::Literal;
use crate::variables::Value;

/// Representation of a domain operation or a Boolean decision, also known as an atomic
/// constraint.
///
/// To create an integer [`Predicate`], use [`Predicate::new`] or the more concise [`predicate!`]
/// macro. Literals convert into predicates through [`From`].
#[derive(Clone, PartialEq, Eq, Copy, Hash)]
pub enum Predicate {
    Integer {
        variable: IntVar,
        predicate_type: PredicateType,
        value: Value,
    },
    Literal(Literal),
}

#[derive(Debug, Clone, Eq, PartialEq, Copy, Hash)]
pub enum PredicateType {
    LowerBound,
    UpperBound,
    NotEqual,
    Equal,
}

impl Predicate {
    pub fn new(variable: IntVar, predicate_type: PredicateType, value: Value) -> Self {
        Predicate::Integer {
            variable,
            predicate_type,
            value,
        }
    }

    pub fn get_predicate_type(&self) -> Option<PredicateType> {
        match self {
            Predicate::Integer { predicate_type, .. } => Some(*predicate_type),
            Predicate::Literal(_) => None,
        }
    }

    /// Returns the [`IntVar`] of an integer [`Predicate`].
    pub fn get_domain(&self) -> Option<IntVar> {
        match self {
            Predicate::Integer { variable, .. } => Some(*variable),
            Predicate::Literal(_) => None,
        }
    }

    pub fn get_right_hand_side(&self) -> Option<Value> {
        match self {
            Predicate::Integer { value, .. } => Some(*value),
            Predicate::Literal(_) => None,
        }
    }

    pub fn as_literal(&self) -> Option<Literal> {
        match self {
            Predicate::Literal(literal) => Some(*literal),
            Predicate::Integer { .. } => None,
        }
    }

    pub fn is_lower_bound_predicate(&self) -> bool {
        self.get_predicate_type() == Some(PredicateType::LowerBound)
    }

    pub fn is_upper_bound_predicate(&self) -> bool {
        self.get_predicate_type() == Some(PredicateType::UpperBound)
    }

    pub fn is_equality_predicate(&self) -> bool {
        self.get_predicate_type() == Some(PredicateType::Equal)
    }

    pub fn is_not_equal_predicate(&self) -> bool {
        self.get_predicate_type() == Some(PredicateType::NotEqual)
    }
}

impl From<Literal> for Predicate {
    fn from(literal: Literal) -> Self {
        Predicate::Literal(literal)
    }
}

impl std::ops::Not for Predicate {
    type Output = Predicate;

    fn not(self) -> Self::Output {
        match self {
            Predicate::Integer {
                variable,
                predicate_type,
                value,
            } => match predicate_type {
                PredicateType::LowerBound => predicate!(variable <= value - 1),
                PredicateType::UpperBound => predicate!(variable >= value + 1),
                PredicateType::NotEqual => predicate!(variable == value),
                PredicateType::Equal => predicate!(variable != value),
            },
            Predicate::Literal(literal) => Predicate::Literal(!literal),
        }
    }
}

impl std::fmt::Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Predicate::Integer {
                variable,
                predicate_type,
                value,
            } => match predicate_type {
                PredicateType::LowerBound => write!(f, "[{variable} >= {value}]"),
                PredicateType::UpperBound => write!(f, "[{variable} <= {value}]"),
                PredicateType::NotEqual => write!(f, "[{variable} != {value}]"),
                PredicateType::Equal => write!(f, "[{variable} == {value}]"),
            },
            Predicate::Literal(literal) => write!(f, "[{literal}]"),
        }
    }
}

impl std::fmt::Debug for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self}")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn negation_is_an_involution() {
        let x = IntVar::new(3);

        assert_eq!(predicate!(x <= 4), !predicate!(x >= 5));
        assert_eq!(predicate!(x >= 5), !predicate!(x <= 4));
        assert_eq!(predicate!(x != 2), !predicate!(x == 2));
        assert_eq!(
            Predicate::from(Literal::new(-7)),
            !Predicate::from(Literal::new(7))
        );
    }

    #[test]
    fn display_names_the_variable() {
        let x = IntVar::new(3);

        assert_eq!("[x3 >= 5]", predicate!(x >= 5).to_string());
        assert_eq!("[l2]", Predicate::from(Literal::new(2)).to_string());
    }
}
