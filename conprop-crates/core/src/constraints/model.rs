use std::sync::Arc;

use log::debug;

use super::fold_into_rhs;
use super::simplify;
use super::Constraint;
use super::ConstraintOptions;
use super::DistinctConstraint;
use super::DistinctTerm;
use super::MinimizeConstraint;
use super::RawTerm;
use super::SumConstraint;
use crate::basic_types::ConstructionError;
use crate::variables::Literal;
use crate::variables::Value;

/// The constraint definitions of a problem, collected during setup.
///
/// Every definition added through the model is normalised first. Once the model is complete,
/// [`Model::share`] freezes it so that every search thread can read it.
#[derive(Debug, Default, Clone)]
pub struct Model {
    constraints: Vec<Constraint>,
    objective: Option<MinimizeConstraint>,
    options: ConstraintOptions,
}

impl Model {
    pub fn new(options: ConstraintOptions) -> Self {
        Model {
            constraints: Vec::new(),
            objective: None,
            options,
        }
    }

    /// Adds `literal -> terms <= rhs`.
    ///
    /// The constant part of `terms` moves to the right-hand side, and the coefficients and the
    /// right-hand side are divided by their greatest common divisor.
    pub fn add_sum(
        &mut self,
        literal: Literal,
        terms: impl IntoIterator<Item = RawTerm>,
        rhs: Value,
    ) -> Result<SumConstraint, ConstructionError> {
        let simplified = simplify(terms)?;
        let mut rhs = fold_into_rhs(rhs, simplified.constant)?;
        let mut elements = simplified.elements;

        let divisor = elements
            .iter()
            .fold(rhs, |divisor, &(coefficient, _)| num::integer::gcd(divisor, coefficient));
        if divisor > 1 {
            elements
                .iter_mut()
                .for_each(|(coefficient, _)| *coefficient /= divisor);
            rhs /= divisor;
        }

        let sum = SumConstraint::create(literal, rhs, &elements, self.options.sort_elements)?;
        self.constraints.push(Constraint::Sum(sum.clone()));
        Ok(sum)
    }

    /// Adds `literal -> the terms take pairwise different values`.
    pub fn add_distinct(
        &mut self,
        literal: Literal,
        terms: impl IntoIterator<Item = Vec<RawTerm>>,
    ) -> Result<DistinctConstraint, ConstructionError> {
        let terms = terms
            .into_iter()
            .map(|term| {
                let simplified = simplify(term)?;
                Ok(DistinctTerm::new(simplified.elements, simplified.constant))
            })
            .collect::<Result<Vec<_>, ConstructionError>>()?;

        let distinct = DistinctConstraint::new(literal, terms);
        self.constraints.push(Constraint::Distinct(distinct.clone()));
        Ok(distinct)
    }

    /// Adds `terms + adjust` to the objective.
    ///
    /// Repeated calls accumulate; the objective is rebuilt from the merged terms every time.
    pub fn add_minimize(
        &mut self,
        terms: impl IntoIterator<Item = RawTerm>,
        adjust: Value,
    ) -> Result<(), ConstructionError> {
        let existing = self
            .objective
            .iter()
            .flat_map(|objective| {
                objective
                    .iter()
                    .map(|&(coefficient, var)| (coefficient, Some(var)))
                    .chain(std::iter::once((objective.adjust(), None)))
            })
            .collect::<Vec<_>>();

        let simplified = simplify(
            existing
                .into_iter()
                .chain(terms)
                .chain(std::iter::once((adjust, None))),
        )?;

        let objective = MinimizeConstraint::create(
            simplified.constant,
            &simplified.elements,
            self.options.sort_elements,
        )?;
        debug!("objective now has {} elements", objective.len());
        self.objective = Some(objective);
        Ok(())
    }

    /// Adds an already built definition without normalising it.
    pub fn add_constraint(&mut self, constraint: impl Into<Constraint>) {
        match constraint.into() {
            Constraint::Minimize(objective) => self.objective = Some(objective),
            constraint => self.constraints.push(constraint),
        }
    }

    pub fn has_minimize(&self) -> bool {
        self.objective.is_some()
    }

    pub fn minimize(&self) -> Option<&MinimizeConstraint> {
        self.objective.as_ref()
    }

    /// Removes the objective from the model, e.g. to turn a proven optimum into a hard bound
    /// with [`MinimizeConstraint::bounded_by`].
    pub fn take_minimize(&mut self) -> Option<MinimizeConstraint> {
        self.objective.take()
    }

    /// The definitions other than the objective, in the order they were added.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// All definitions, including the objective.
    pub fn iter(&self) -> impl Iterator<Item = Constraint> + '_ {
        self.constraints
            .iter()
            .cloned()
            .chain(self.objective.iter().cloned().map(Constraint::Minimize))
    }

    pub fn options(&self) -> ConstraintOptions {
        self.options
    }

    /// Freezes the model into a snapshot which every thread can read.
    pub fn share(self) -> Arc<Model> {
        debug!(
            "sharing model with {} constraints (objective: {})",
            self.constraints.len(),
            self.objective.is_some()
        );
        Arc::new(self)
    }
}
