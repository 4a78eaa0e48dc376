use enumset::enum_set;
use log::trace;

use super::linear::contribution;
use super::linear::maximal_contribution;
use super::linear::LinearLeq;
use super::state::literal_reason;
use super::state::StateBehaviour;
use super::state::StateCore;
use super::DomainEvent;
use super::DomainEvents;
use super::EnqueueDecision;
use super::LiteralValue;
use super::LocalId;
use super::Priority;
use super::PropagationContext;
use super::PropagationContextMut;
use super::PropagationOptions;
use super::ReadDomains;
use super::ReasonRefinement;
use super::Tightening;
use super::TrailedInteger;
use super::TrailedValues;
use super::Watchers;
use crate::basic_types::Inconsistency;
use crate::basic_types::PropagationStatus;
use crate::basic_types::PropagatorConflict;
use crate::constraints::Constraint;
use crate::constraints::DistinctConstraint;
use crate::constraints::DistinctTerm;
use crate::predicate;
use crate::predicates::Predicate;
use crate::predicates::PropositionalConjunction;
use crate::variables::Literal;
use crate::variables::Value;

const WATCHED_EVENTS: DomainEvents = DomainEvents::new(enum_set!(
    DomainEvent::Assign | DomainEvent::LowerBound | DomainEvent::UpperBound
));

/// The range `[lo, hi]` a term can take under the current bounds, and its value once all of its
/// variables are fixed.
#[derive(Debug, Clone, Copy)]
struct TermInterval {
    lo: i128,
    hi: i128,
    fixed: bool,
}

fn interval(term: &DistinctTerm, context: &impl ReadDomains) -> TermInterval {
    let constant = term.constant() as i128;
    let mut interval = TermInterval {
        lo: constant,
        hi: constant,
        fixed: true,
    };

    for &(coefficient, var) in term.elements() {
        if coefficient == 0 {
            continue;
        }
        let lower_bound = context.lower_bound(var);
        let upper_bound = context.upper_bound(var);
        interval.lo += contribution(coefficient as i128, lower_bound, upper_bound);
        interval.hi += maximal_contribution(coefficient as i128, lower_bound, upper_bound);
        interval.fixed &= lower_bound == upper_bound;
    }

    interval
}

/// The assignments which give a fixed term its value.
fn fixing_predicates(term: &DistinctTerm, context: &impl ReadDomains) -> Vec<Predicate> {
    term.elements()
        .iter()
        .filter(|(coefficient, _)| *coefficient != 0)
        .map(|&(_, var)| predicate!(var == context.lower_bound(var)))
        .collect()
}

/// The bounds which give a term its smallest (`minimum == true`) or largest value.
fn supporting_predicates(
    term: &DistinctTerm,
    minimum: bool,
    context: &impl ReadDomains,
) -> Vec<Predicate> {
    term.elements()
        .iter()
        .filter(|(coefficient, _)| *coefficient != 0)
        .map(|&(coefficient, var)| {
            if (coefficient > 0) == minimum {
                predicate!(var >= context.lower_bound(var))
            } else {
                predicate!(var <= context.upper_bound(var))
            }
        })
        .collect()
}

/// The per-thread state of a [`DistinctConstraint`].
///
/// The state counts, per term, how many of its variables are not yet fixed, together with the
/// number of terms which are fixed completely. Propagation only does work once at least one term
/// has a value.
#[derive(Debug, Clone)]
pub struct DistinctState {
    constraint: DistinctConstraint,
    /// For every watched occurrence, the term it belongs to.
    owners: Box<[usize]>,
    values: TrailedValues,
    unfixed: Box<[TrailedInteger]>,
    fixed_terms: TrailedInteger,
    initialised_at: usize,
    stale: bool,
    core: StateCore,
}

impl DistinctState {
    pub(crate) fn new(constraint: DistinctConstraint, options: PropagationOptions) -> Self {
        let owners = constraint
            .terms()
            .iter()
            .enumerate()
            .flat_map(|(index, term)| std::iter::repeat(index).take(term.elements().len()))
            .collect();

        let mut values = TrailedValues::default();
        let unfixed = constraint.terms().iter().map(|_| values.grow(0)).collect();
        let fixed_terms = values.grow(0);

        DistinctState {
            constraint,
            owners,
            values,
            unfixed,
            fixed_terms,
            initialised_at: 0,
            stale: true,
            core: StateCore::new(options),
        }
    }

    fn count_unfixed(term: &DistinctTerm, context: &impl ReadDomains) -> i64 {
        term.elements()
            .iter()
            .filter(|&&(coefficient, var)| coefficient != 0 && !context.is_fixed(var))
            .count() as i64
    }

    fn refresh_if_stale(&mut self, context: PropagationContext<'_>) {
        if !self.stale {
            return;
        }

        self.values.synchronise(0);
        let mut fixed_terms = 0;
        for (term, &trailed) in self.constraint.terms().iter().zip(self.unfixed.iter()) {
            let unfixed = Self::count_unfixed(term, &context);
            self.values.reset(trailed, unfixed);
            if unfixed == 0 {
                fixed_terms += 1;
            }
        }
        self.values.reset(self.fixed_terms, fixed_terms);

        self.initialised_at = context.decision_level();
        self.stale = false;
    }

    /// Recounts the unfixed variables of `term_index`, returning whether the term just became
    /// fixed.
    fn update_term(&mut self, term_index: usize, context: PropagationContext<'_>) -> bool {
        let level = context.decision_level();
        let unfixed = Self::count_unfixed(&self.constraint.terms()[term_index], &context);
        let previous = self.values.read(self.unfixed[term_index]);
        if unfixed == previous {
            return false;
        }

        self.values.assign(self.unfixed[term_index], unfixed, level);
        if unfixed == 0 {
            self.values.add_assign(self.fixed_terms, 1, level);
            true
        } else {
            false
        }
    }

    /// Finds two fixed terms with the same value. The returned conjunction does not contain the
    /// activation literal.
    fn find_clash(&self, context: &impl ReadDomains) -> Option<PropositionalConjunction> {
        let mut fixed = self
            .constraint
            .terms()
            .iter()
            .map(|term| (interval(term, context), term))
            .filter(|(interval, _)| interval.fixed)
            .map(|(interval, term)| (interval.lo, term))
            .collect::<Vec<_>>();
        fixed.sort_by_key(|&(value, _)| value);

        fixed.windows(2).find_map(|pair| {
            let [(first_value, first), (second_value, second)] = pair else {
                return None;
            };
            (first_value == second_value).then(|| {
                PropositionalConjunction::new(fixing_predicates(first, context))
                    .extend_and_remove_duplicates(fixing_predicates(second, context).into_iter())
            })
        })
    }

    /// Keeps `term` away from the value `value` of the fixed term `fixed`.
    fn separate(
        &mut self,
        term: &DistinctTerm,
        fixed: &DistinctTerm,
        value: i128,
        context: &mut PropagationContextMut<'_>,
    ) -> PropagationStatus {
        let current = interval(term, &*context);
        if current.fixed || value < current.lo || value > current.hi {
            return Ok(());
        }

        let mut base_reason = literal_reason(self.literal()).into_vec();
        base_reason.extend(fixing_predicates(fixed, &*context));

        let constant = term.constant() as i128;
        let mut open = term
            .elements()
            .iter()
            .filter(|&&(c, var)| c != 0 && !context.is_fixed(var));
        if let (Some(&(coefficient, var)), None) = (open.next(), open.next()) {
            // With one variable left open the clashing value can be removed directly; the fixed
            // variables fold into the constant.
            let mut folded = constant;
            let mut folding = Vec::new();
            for &(other_coefficient, other) in term.elements() {
                if other_coefficient != 0 && other != var {
                    let other_value = context.lower_bound(other);
                    folded += other_coefficient as i128 * other_value as i128;
                    folding.push(predicate!(other == other_value));
                }
            }

            let coefficient = coefficient as i128;
            if (value - folded) % coefficient != 0 {
                return Ok(());
            }
            let Ok(removed) = Value::try_from((value - folded) / coefficient) else {
                return Ok(());
            };
            if !context.contains(var, removed) {
                return Ok(());
            }

            let predicate = predicate!(var != removed);
            let reason = PropositionalConjunction::new(base_reason)
                .extend_and_remove_duplicates(folding.into_iter());
            if context.post(predicate, reason)? == Tightening::Applied {
                trace!("distinct removed {removed} from {var}");
                self.core.statistics.num_tightenings += 1;
            }
            return Ok(());
        }

        // With several variables open only the bounds can be pushed; the term is at least as large as
        // its minimum, so sitting on the clashing value at either end means moving past it.
        let (scale, bound, at_minimum) = if value == current.lo {
            (-1, -(value + 1 - constant), true)
        } else if value == current.hi {
            (1, value - 1 - constant, false)
        } else {
            return Ok(());
        };
        base_reason.extend(supporting_predicates(term, at_minimum, &*context));

        let linear = LinearLeq {
            elements: term.elements(),
            scale,
            bound,
            base_reason: &base_reason,
            refinement: ReasonRefinement::Plain,
        };
        linear.propagate(context, &mut self.core.statistics)
    }
}

impl StateBehaviour for DistinctState {
    fn name(&self) -> &str {
        "Distinct"
    }

    fn core(&self) -> &StateCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut StateCore {
        &mut self.core
    }

    fn literal(&self) -> Literal {
        self.constraint.literal()
    }

    fn priority(&self) -> Priority {
        Priority::Medium
    }

    fn constraint(&self) -> Constraint {
        Constraint::Distinct(self.constraint.clone())
    }

    fn attach(&mut self, watchers: &mut dyn Watchers, context: PropagationContext<'_>) {
        let occurrences = self
            .constraint
            .terms()
            .iter()
            .flat_map(|term| term.elements().iter());
        for (index, &(coefficient, var)) in occurrences.enumerate() {
            if coefficient != 0 {
                watchers.watch_variable(var, WATCHED_EVENTS, LocalId::from(index as u32));
            }
        }

        if !self.literal().is_true_literal() {
            watchers.watch_literal(self.literal());
        }

        self.refresh_if_stale(context);
    }

    fn notify(
        &mut self,
        local_id: LocalId,
        events: DomainEvents,
        context: PropagationContext<'_>,
    ) -> EnqueueDecision {
        if self.stale {
            self.refresh_if_stale(context);
        }

        let literal_value = context.literal_value(self.literal());

        if events.contains(DomainEvent::Assign) {
            let term_index = self.owners[local_id.unpack() as usize];
            if self.update_term(term_index, context) && literal_value != LiteralValue::False {
                return EnqueueDecision::Enqueue;
            }
        }

        let bounds_changed =
            events.contains(DomainEvent::LowerBound) || events.contains(DomainEvent::UpperBound);
        if bounds_changed
            && literal_value == LiteralValue::True
            && self.values.read(self.fixed_terms) > 0
        {
            EnqueueDecision::Enqueue
        } else {
            EnqueueDecision::Skip
        }
    }

    fn propagate(&mut self, context: &mut PropagationContextMut<'_>) -> PropagationStatus {
        let literal_value = context.literal_value(self.literal());
        if literal_value == LiteralValue::False {
            return Ok(());
        }

        if let Some(clash) = self.find_clash(&*context) {
            if literal_value == LiteralValue::Unset {
                let negated = Predicate::from(!self.literal());
                if context.post(negated, clash)? == Tightening::Applied {
                    trace!("distinct falsified its literal {}", self.literal());
                    self.core.statistics.num_tightenings += 1;
                }
                return Ok(());
            }

            let conjunction = clash.extend_and_remove_duplicates(
                literal_reason(self.literal()).into_vec().into_iter(),
            );
            return Err(Inconsistency::Conflict(PropagatorConflict { conjunction }));
        }

        if literal_value == LiteralValue::Unset {
            return Ok(());
        }

        let constraint = self.constraint.clone();
        let terms = constraint.terms();
        for (fixed_index, fixed) in terms.iter().enumerate() {
            let fixed_interval = interval(fixed, &*context);
            if !fixed_interval.fixed {
                continue;
            }

            for (index, term) in terms.iter().enumerate() {
                if index != fixed_index {
                    self.separate(term, fixed, fixed_interval.lo, context)?;
                }
            }
        }

        Ok(())
    }

    fn undo(&mut self, level: usize) {
        if level < self.initialised_at {
            self.stale = true;
        } else {
            self.values.synchronise(level);
        }
    }

    fn detect_inconsistency(&self, context: PropagationContext<'_>) -> Option<PropagatorConflict> {
        if context.literal_value(self.literal()) == LiteralValue::False {
            return None;
        }

        self.find_clash(&context)
            .map(|conjunction| PropagatorConflict { conjunction })
    }

    fn check(&self, context: PropagationContext<'_>) -> bool {
        context.literal_value(self.literal()) != LiteralValue::True
            || self.find_clash(&context).is_none()
    }
}
