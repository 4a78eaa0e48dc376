//! Bounds propagation of `scale * Σ c·x <= bound`, shared by the sum, minimize and distinct
//! states.
//!
//! All arithmetic happens on `i128`: a product of two [`Value`]s fits in 64 bits, so no sum of
//! such products can overflow.
use itertools::Itertools;
use log::trace;

use super::PropagationContextMut;
use super::ReadDomains;
use super::ReasonRefinement;
use super::Tightening;
use super::TrailedInteger;
use super::TrailedValues;
use crate::basic_types::PropagationStatus;
use crate::basic_types::PropagatorConflict;
use crate::math::num_ext::NumExt;
use crate::predicate;
use crate::predicates::Predicate;
use crate::predicates::PropositionalConjunction;
use crate::propagation::StateStatistics;
use crate::variables::CoVar;
use crate::variables::IntVar;
use crate::variables::Value;

/// The smallest value `c * x` can take given the bounds of `x`.
pub(crate) fn contribution(coefficient: i128, lower_bound: Value, upper_bound: Value) -> i128 {
    if coefficient >= 0 {
        coefficient * lower_bound as i128
    } else {
        coefficient * upper_bound as i128
    }
}

/// The largest value `c * x` can take given the bounds of `x`.
pub(crate) fn maximal_contribution(
    coefficient: i128,
    lower_bound: Value,
    upper_bound: Value,
) -> i128 {
    -contribution(-coefficient, lower_bound, upper_bound)
}

/// A view of `scale * Σ c·x <= bound` over the elements of a constraint.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LinearLeq<'a> {
    pub(crate) elements: &'a [CoVar],
    pub(crate) scale: i128,
    pub(crate) bound: i128,
    /// Predicates which are part of every reason, e.g. the activation literal.
    pub(crate) base_reason: &'a [Predicate],
    pub(crate) refinement: ReasonRefinement,
}

impl LinearLeq<'_> {
    fn coefficient(&self, index: usize) -> i128 {
        self.elements[index].0 as i128 * self.scale
    }

    fn element_contribution(&self, index: usize, context: &impl ReadDomains) -> i128 {
        let var = self.elements[index].1;
        contribution(
            self.coefficient(index),
            context.lower_bound(var),
            context.upper_bound(var),
        )
    }

    pub(crate) fn minimum(&self, context: &impl ReadDomains) -> i128 {
        (0..self.elements.len())
            .map(|index| self.element_contribution(index, context))
            .sum()
    }

    /// The bound predicate of element `index` which supports its contribution, weakened by as
    /// much of `available` as possible.
    fn supporting_predicate(
        &self,
        index: usize,
        available: &mut i128,
        context: &impl ReadDomains,
    ) -> Predicate {
        let coefficient = self.coefficient(index);
        let var: IntVar = self.elements[index].1;

        if coefficient > 0 {
            let lower_bound = context.lower_bound(var);
            let room = lower_bound as i128 - Value::MIN as i128;
            let weakening = (*available / coefficient).min(room);
            *available -= weakening * coefficient;
            predicate!(var >= (lower_bound as i128 - weakening) as Value)
        } else {
            let upper_bound = context.upper_bound(var);
            let room = Value::MAX as i128 - upper_bound as i128;
            let weakening = (*available / -coefficient).min(room);
            *available -= weakening * -coefficient;
            predicate!(var <= (upper_bound as i128 + weakening) as Value)
        }
    }

    /// Explains why the elements other than `skip` sum to at least `required`.
    pub(crate) fn explain(
        &self,
        skip: Option<usize>,
        required: i128,
        context: &impl ReadDomains,
    ) -> PropositionalConjunction {
        let explained = (0..self.elements.len())
            .filter(|&index| Some(index) != skip && self.coefficient(index) != 0)
            .collect::<Vec<_>>();

        let mut available = match self.refinement {
            ReasonRefinement::Plain => 0,
            ReasonRefinement::Weakened => {
                let minimum = explained
                    .iter()
                    .map(|&index| self.element_contribution(index, context))
                    .sum::<i128>();
                (minimum - required).max(0)
            }
        };

        let supporting = explained
            .into_iter()
            .map(|index| self.supporting_predicate(index, &mut available, context))
            .collect::<Vec<_>>();

        self.base_reason
            .iter()
            .copied()
            .chain(supporting)
            .unique()
            .collect()
    }

    /// The conflict for the case where the minimum exceeds the bound.
    pub(crate) fn conflict(&self, context: &impl ReadDomains) -> PropagatorConflict {
        PropagatorConflict {
            conjunction: self.explain(None, self.bound + 1, context),
        }
    }

    /// Tightens the bounds of every element until none changes anymore, or reports the conflict
    /// once the minimum exceeds the bound.
    pub(crate) fn propagate(
        &self,
        context: &mut PropagationContextMut<'_>,
        statistics: &mut StateStatistics,
    ) -> PropagationStatus {
        loop {
            let minimum = self.minimum(&*context);
            if minimum > self.bound {
                return Err(self.conflict(&*context).into());
            }

            let mut changed = false;

            for index in 0..self.elements.len() {
                let coefficient = self.coefficient(index);
                if coefficient == 0 {
                    continue;
                }

                let var = self.elements[index].1;
                let lower_bound = context.lower_bound(var);
                let upper_bound = context.upper_bound(var);
                // The minimum is from the start of the pass; elements sharing a variable may
                // have moved since, which only makes the slack larger.
                let others = minimum - contribution(coefficient, lower_bound, upper_bound);
                let slack = self.bound - others;

                let (predicate, excluded) = if coefficient > 0 {
                    let new_upper_bound = NumExt::div_floor(slack, coefficient);
                    if new_upper_bound >= upper_bound as i128 {
                        continue;
                    }
                    (
                        predicate!(var <= new_upper_bound as Value),
                        new_upper_bound + 1,
                    )
                } else {
                    let new_lower_bound = NumExt::div_ceil(slack, coefficient);
                    if new_lower_bound <= lower_bound as i128 {
                        continue;
                    }
                    (
                        predicate!(var >= new_lower_bound as Value),
                        new_lower_bound - 1,
                    )
                };

                let required = self.bound - coefficient * excluded + 1;
                let reason = self.explain(Some(index), required, &*context);

                if context.post(predicate, reason)? == Tightening::Applied {
                    trace!("linear propagation applied {predicate}");
                    statistics.num_tightenings += 1;
                    changed = true;
                }
            }

            if !changed {
                return Ok(());
            }
        }
    }
}

/// Incremental minimum of `Σ c·x` under the current bounds.
///
/// The per-element contributions are kept in trailed integers; a notification for element `i`
/// only touches its own contribution and the total.
#[derive(Debug, Clone)]
pub(crate) struct LinearBookkeeping {
    values: TrailedValues<i128>,
    contributions: Box<[TrailedInteger]>,
    minimum: TrailedInteger,
    /// The decision level at which the values were computed from scratch.
    initialised_at: usize,
    stale: bool,
}

impl LinearBookkeeping {
    pub(crate) fn new(len: usize) -> Self {
        let mut values = TrailedValues::default();
        let contributions = (0..len).map(|_| values.grow(0)).collect();
        let minimum = values.grow(0);

        LinearBookkeeping {
            values,
            contributions,
            minimum,
            initialised_at: 0,
            stale: true,
        }
    }

    /// Recomputes every contribution if a backtrack went below the level at which they were
    /// computed.
    pub(crate) fn refresh_if_stale(
        &mut self,
        elements: &[CoVar],
        context: &impl ReadDomains,
        level: usize,
    ) {
        if !self.stale {
            return;
        }

        self.values.synchronise(0);
        let mut minimum = 0;
        for (&(coefficient, var), &trailed) in elements.iter().zip(self.contributions.iter()) {
            let value = contribution(
                coefficient as i128,
                context.lower_bound(var),
                context.upper_bound(var),
            );
            self.values.reset(trailed, value);
            minimum += value;
        }
        self.values.reset(self.minimum, minimum);

        self.initialised_at = level;
        self.stale = false;
    }

    /// Updates the contribution of element `index` after its variable changed.
    pub(crate) fn update(
        &mut self,
        index: usize,
        elements: &[CoVar],
        context: &impl ReadDomains,
        level: usize,
    ) {
        if self.stale {
            self.refresh_if_stale(elements, context, level);
            return;
        }

        let (coefficient, var) = elements[index];
        let new_value = contribution(
            coefficient as i128,
            context.lower_bound(var),
            context.upper_bound(var),
        );
        let old_value = self.values.read(self.contributions[index]);
        if new_value == old_value {
            return;
        }

        self.values
            .assign(self.contributions[index], new_value, level);
        self.values
            .add_assign(self.minimum, new_value - old_value, level);
    }

    pub(crate) fn minimum(&self) -> i128 {
        self.values.read(self.minimum)
    }

    pub(crate) fn is_stale(&self) -> bool {
        self.stale
    }

    pub(crate) fn undo(&mut self, level: usize) {
        if level < self.initialised_at {
            self.stale = true;
        } else {
            self.values.synchronise(level);
        }
    }
}
