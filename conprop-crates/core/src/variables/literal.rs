use std::ops::Not;

use crate::conprop_assert_simple;

/// A Boolean decision of the search loop. The sign encodes the polarity, so `!lit` has the
/// opposite code of `lit`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal {
    code: i32,
}

/// The literal which is true in every assignment; constraints without an activation condition
/// use it as their literal.
pub const TRUE_LIT: Literal = Literal::TRUE;

impl Literal {
    pub const TRUE: Literal = Literal { code: 1 };
    pub const FALSE: Literal = Literal { code: -1 };

    pub fn new(code: i32) -> Literal {
        conprop_assert_simple!(
            code != 0 && code != i32::MIN,
            "{code} does not encode a literal"
        );
        Literal { code }
    }

    pub fn code(self) -> i32 {
        self.code
    }

    pub fn is_positive(self) -> bool {
        self.code > 0
    }

    /// The index of the underlying Boolean variable, independent of the polarity.
    pub fn variable_index(self) -> u32 {
        self.code.unsigned_abs()
    }

    /// Whether this is [`TRUE_LIT`], i.e. the literal of an unconditional constraint.
    pub fn is_true_literal(self) -> bool {
        self == Literal::TRUE
    }
}

impl Not for Literal {
    type Output = Literal;

    fn not(self) -> Self::Output {
        Literal { code: -self.code }
    }
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Literal::TRUE => write!(f, "true"),
            Literal::FALSE => write!(f, "false"),
            _ => write!(f, "l{}", self.code),
        }
    }
}

impl std::fmt::Debug for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self}")
    }
}
