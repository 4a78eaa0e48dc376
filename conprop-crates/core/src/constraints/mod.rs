//! The immutable constraint definitions which are shared by all search threads.
//!
//! A definition is built once, during setup, and then handed to every thread. Each thread calls
//! [`Constraint::create_state`] to obtain its own [`ConstraintState`]; the definition itself is
//! never changed afterwards.
//!
//! # Example
//! ```
//! # use conprop_core::constraints::Constraint;
//! # use conprop_core::constraints::SumConstraint;
//! # use conprop_core::variables::IntVar;
//! # use conprop_core::variables::TRUE_LIT;
//! let x = IntVar::new(0);
//! let y = IntVar::new(1);
//!
//! // 3x + y <= 5
//! let sum = SumConstraint::create(TRUE_LIT, 5, &[(1, y), (3, x)], true).unwrap();
//! assert_eq!((3, x), sum[0]);
//!
//! let constraint = Constraint::from(sum);
//! let handle = constraint.clone();
//! std::thread::spawn(move || {
//!     let _state = handle.create_state();
//! })
//! .join()
//! .unwrap();
//! ```
mod distinct;
mod minimize;
mod model;
mod options;
mod simplify;
mod sum;

use std::fmt::Display;
use std::fmt::Formatter;

pub use distinct::*;
pub use minimize::*;
pub use model::*;
pub use options::*;
pub use simplify::*;
pub use sum::*;

use crate::propagation::ConstraintState;
use crate::propagation::DistinctState;
use crate::propagation::MinimizeState;
use crate::propagation::PropagationOptions;
use crate::propagation::SumState;
use crate::variables::CoVar;
use crate::variables::Literal;

/// A constraint definition: one of the three supported kinds.
///
/// Cloning only copies a handle; all clones refer to the same definition, which is freed once
/// the last handle (held by a model or a state) is dropped.
#[derive(Debug, Clone)]
pub enum Constraint {
    Sum(SumConstraint),
    Minimize(MinimizeConstraint),
    Distinct(DistinctConstraint),
}

impl Constraint {
    /// The activation literal, or [`TRUE_LIT`](crate::variables::TRUE_LIT) if the constraint
    /// always holds.
    pub fn literal(&self) -> Literal {
        match self {
            Constraint::Sum(sum) => sum.literal(),
            Constraint::Minimize(minimize) => minimize.literal(),
            Constraint::Distinct(distinct) => distinct.literal(),
        }
    }

    /// A fresh per-thread state with the default [`PropagationOptions`].
    pub fn create_state(&self) -> ConstraintState {
        self.create_state_with_options(PropagationOptions::default())
    }

    /// A fresh per-thread state. States created by separate calls share nothing mutable.
    pub fn create_state_with_options(&self, options: PropagationOptions) -> ConstraintState {
        match self {
            Constraint::Sum(sum) => ConstraintState::Sum(SumState::new(sum.clone(), options)),
            Constraint::Minimize(minimize) => {
                ConstraintState::Minimize(MinimizeState::new(minimize.clone(), options))
            }
            Constraint::Distinct(distinct) => {
                ConstraintState::Distinct(DistinctState::new(distinct.clone(), options))
            }
        }
    }
}

impl From<SumConstraint> for Constraint {
    fn from(sum: SumConstraint) -> Self {
        Constraint::Sum(sum)
    }
}

impl From<MinimizeConstraint> for Constraint {
    fn from(minimize: MinimizeConstraint) -> Self {
        Constraint::Minimize(minimize)
    }
}

impl From<DistinctConstraint> for Constraint {
    fn from(distinct: DistinctConstraint) -> Self {
        Constraint::Distinct(distinct)
    }
}

impl Display for Constraint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Constraint::Sum(sum) => sum.fmt(f),
            Constraint::Minimize(minimize) => minimize.fmt(f),
            Constraint::Distinct(distinct) => distinct.fmt(f),
        }
    }
}

/// Orders by descending absolute coefficient; the relative order of ties is unspecified.
fn sort_by_magnitude(elements: &mut [CoVar]) {
    elements.sort_unstable_by_key(|&(coefficient, _)| {
        std::cmp::Reverse(coefficient.unsigned_abs())
    });
}

fn write_linear(f: &mut Formatter<'_>, elements: &[CoVar]) -> std::fmt::Result {
    if elements.is_empty() {
        return write!(f, "0");
    }

    for (index, (coefficient, var)) in elements.iter().enumerate() {
        if index > 0 {
            write!(f, " + ")?;
        }
        write!(f, "{coefficient}*{var}")?;
    }
    Ok(())
}

/// The read-only accessors of a handle over a block of [`CoVar`]s; the type provides
/// `as_slice`.
macro_rules! impl_element_access {
    ($name:ident) => {
        impl $name {
            pub fn len(&self) -> usize {
                self.as_slice().len()
            }

            pub fn is_empty(&self) -> bool {
                self.as_slice().is_empty()
            }

            pub fn iter(&self) -> std::slice::Iter<'_, $crate::variables::CoVar> {
                self.as_slice().iter()
            }
        }

        impl std::ops::Index<usize> for $name {
            type Output = $crate::variables::CoVar;

            fn index(&self, index: usize) -> &Self::Output {
                &self.as_slice()[index]
            }
        }

        impl<'a> IntoIterator for &'a $name {
            type Item = &'a $crate::variables::CoVar;
            type IntoIter = std::slice::Iter<'a, $crate::variables::CoVar>;

            fn into_iter(self) -> Self::IntoIter {
                self.iter()
            }
        }
    };
}
use impl_element_access;
