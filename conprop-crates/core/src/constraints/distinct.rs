use std::fmt::Display;
use std::fmt::Formatter;
use std::ops::Index;
use std::sync::Arc;

use log::debug;
use log::warn;

use crate::variables::CoVar;
use crate::variables::Literal;
use crate::variables::Value;

/// One argument `Σ c·x + constant` of a [`DistinctConstraint`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistinctTerm {
    elements: Box<[CoVar]>,
    constant: Value,
}

impl DistinctTerm {
    pub fn new(elements: impl Into<Box<[CoVar]>>, constant: Value) -> Self {
        DistinctTerm {
            elements: elements.into(),
            constant,
        }
    }

    pub fn elements(&self) -> &[CoVar] {
        &self.elements
    }

    pub fn constant(&self) -> Value {
        self.constant
    }
}

#[derive(Debug)]
struct DistinctInner {
    literal: Literal,
    terms: Box<[DistinctTerm]>,
}

/// The constraint `literal -> all terms take pairwise different values`.
///
/// Terms have different lengths, so they are not flattened into one block; the term list is
/// shared behind an [`Arc`] and is kept in the order it was given.
#[derive(Debug, Clone)]
pub struct DistinctConstraint {
    inner: Arc<DistinctInner>,
}

impl DistinctConstraint {
    pub fn new(literal: Literal, terms: Vec<DistinctTerm>) -> Self {
        if terms.is_empty() {
            warn!("distinct constraint without terms");
        }
        debug!("created distinct over {} terms", terms.len());

        DistinctConstraint {
            inner: Arc::new(DistinctInner {
                literal,
                terms: terms.into_boxed_slice(),
            }),
        }
    }

    pub fn literal(&self) -> Literal {
        self.inner.literal
    }

    pub fn terms(&self) -> &[DistinctTerm] {
        &self.inner.terms
    }

    pub fn len(&self) -> usize {
        self.inner.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.terms.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DistinctTerm> {
        self.inner.terms.iter()
    }

    /// Whether both handles refer to the same term list.
    pub fn ptr_eq(&self, other: &DistinctConstraint) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Index<usize> for DistinctConstraint {
    type Output = DistinctTerm;

    fn index(&self, index: usize) -> &Self::Output {
        &self.inner.terms[index]
    }
}

impl Display for DistinctConstraint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if !self.literal().is_true_literal() {
            write!(f, "{} -> ", self.literal())?;
        }
        write!(f, "distinct(")?;
        for (index, term) in self.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            super::write_linear(f, term.elements())?;
            write!(f, " + {}", term.constant())?;
        }
        write!(f, ")")
    }
}
