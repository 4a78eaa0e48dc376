use std::ops::Deref;
use std::ops::Index;

use itertools::Itertools;

use super::Predicate;

/// A struct which represents a conjunction of [`Predicate`]s (e.g. it can represent `[x >= 5] /\ [y
/// <= 10]`).
///
/// Every reason and conflict reported by a constraint state is expressed as such a conjunction;
/// the search loop turns it into a clause by negating each predicate.
#[derive(Clone, Default, Eq)]
pub struct PropositionalConjunction {
    predicates_in_conjunction: Vec<Predicate>,
}

impl Deref for PropositionalConjunction {
    type Target = [Predicate];

    fn deref(&self) -> &Self::Target {
        &self.predicates_in_conjunction
    }
}

impl PropositionalConjunction {
    pub fn new(predicates_in_conjunction: Vec<Predicate>) -> Self {
        PropositionalConjunction {
            predicates_in_conjunction,
        }
    }

    pub fn as_slice(&self) -> &[Predicate] {
        self.predicates_in_conjunction.as_slice()
    }

    pub fn push(&mut self, predicate: Predicate) {
        self.predicates_in_conjunction.push(predicate);
    }

    pub fn extend_and_remove_duplicates(
        mut self,
        additional_elements: impl Iterator<Item = Predicate>,
    ) -> PropositionalConjunction {
        self.predicates_in_conjunction = self
            .predicates_in_conjunction
            .into_iter()
            .chain(additional_elements)
            .unique()
            .collect();
        self
    }
}

impl PartialEq for PropositionalConjunction {
    fn eq(&self, other: &Self) -> bool {
        if self.predicates_in_conjunction.len() != other.predicates_in_conjunction.len() {
            return false;
        }

        self.predicates_in_conjunction
            .iter()
            .all(|predicate| other.predicates_in_conjunction.contains(predicate))
    }
}

impl Extend<Predicate> for PropositionalConjunction {
    fn extend<T: IntoIterator<Item = Predicate>>(&mut self, iter: T) {
        self.predicates_in_conjunction.extend(iter);
    }
}

impl IntoIterator for PropositionalConjunction {
    type Item = Predicate;

    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.predicates_in_conjunction.into_iter()
    }
}

impl Index<usize> for PropositionalConjunction {
    type Output = Predicate;

    fn index(&self, index: usize) -> &Self::Output {
        &self.predicates_in_conjunction[index]
    }
}

impl FromIterator<Predicate> for PropositionalConjunction {
    fn from_iter<T: IntoIterator<Item = Predicate>>(iter: T) -> Self {
        let vec = iter.into_iter().collect();
        PropositionalConjunction {
            predicates_in_conjunction: vec,
        }
    }
}

impl From<Vec<Predicate>> for PropositionalConjunction {
    fn from(vec: Vec<Predicate>) -> Self {
        PropositionalConjunction::new(vec)
    }
}

impl From<Predicate> for PropositionalConjunction {
    fn from(predicate: Predicate) -> Self {
        PropositionalConjunction {
            predicates_in_conjunction: vec![predicate],
        }
    }
}

impl std::fmt::Display for PropositionalConjunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.predicates_in_conjunction.is_empty() {
            write!(f, "{{empty}}")
        } else {
            write!(
                f,
                "{}",
                self.predicates_in_conjunction
                    .iter()
                    .map(|p| p.to_string())
                    .collect::<Vec<String>>()
                    .join("; ")
            )
        }
    }
}

impl std::fmt::Debug for PropositionalConjunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self}")
    }
}

/// Creates a [`PropositionalConjunction`] from a list of bracketed predicates.
///
/// # Example
/// ```rust
/// # use conprop_core::conjunction;
/// # use conprop_core::predicate;
/// # use conprop_core::variables::IntVar;
/// let x = IntVar::new(0);
/// let y = IntVar::new(1);
///
/// let conjunction = conjunction!([x >= 1] & [y <= 4]);
/// assert_eq!(2, conjunction.len());
/// assert!(conjunction.contains(&predicate!(y <= 4)));
/// ```
#[macro_export]
macro_rules! conjunction {
    (@to_conjunction $($body:tt)*) => {
        $crate::predicates::PropositionalConjunction::from($($body)*)
    };

    (@munch {$($body:tt)*} -> & [$($pred:tt)+] $($rest:tt)*) => {
        conjunction!(@munch {$crate::predicate![$($pred)+], $($body)*} -> $($rest)*)
    };

    (@munch {$($body:tt)*} -> ) => {
        conjunction!(@to_conjunction vec![$($body)*])
    };

    (@munch {$($body:tt)*} -> $($rest:tt)+) => {
        compile_error!("Incorrect usage of the macro")
    };

    ($($input:tt)+) => {
        conjunction!(@munch {} -> & $($input)*)
    };

    () => {
        conjunction!(@to_conjunction Vec::<$crate::predicates::Predicate>::new())
    };
}
