use log::trace;

use super::linear::LinearBookkeeping;
use super::linear::LinearLeq;
use super::state::literal_reason;
use super::state::StateBehaviour;
use super::state::StateCore;
use super::DomainEvents;
use super::EnqueueDecision;
use super::LiteralValue;
use super::LocalId;
use super::Priority;
use super::PropagationContext;
use super::PropagationContextMut;
use super::PropagationOptions;
use super::Tightening;
use super::Watchers;
use crate::basic_types::PropagationStatus;
use crate::basic_types::PropagatorConflict;
use crate::constraints::Constraint;
use crate::constraints::SumConstraint;
use crate::predicates::Predicate;
use crate::variables::Literal;

/// The per-thread state of a [`SumConstraint`] `lit -> Σ c·x <= rhs`.
///
/// The state keeps the minimum of the sum under the current bounds up to date incrementally, so
/// that a notification can decide in constant time whether propagating is worthwhile.
#[derive(Debug, Clone)]
pub struct SumState {
    constraint: SumConstraint,
    bookkeeping: LinearBookkeeping,
    base_reason: Box<[Predicate]>,
    core: StateCore,
}

impl SumState {
    pub(crate) fn new(constraint: SumConstraint, options: PropagationOptions) -> Self {
        SumState {
            bookkeeping: LinearBookkeeping::new(constraint.len()),
            base_reason: literal_reason(constraint.literal()),
            constraint,
            core: StateCore::new(options),
        }
    }

    fn linear<'a>(&'a self, base_reason: &'a [Predicate]) -> LinearLeq<'a> {
        LinearLeq {
            elements: self.constraint.as_slice(),
            scale: 1,
            bound: self.constraint.rhs() as i128,
            base_reason,
            refinement: self.core.options.reason_refinement,
        }
    }
}

impl StateBehaviour for SumState {
    fn name(&self) -> &str {
        "Sum"
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
        Priority::High
    }

    fn constraint(&self) -> Constraint {
        Constraint::Sum(self.constraint.clone())
    }

    fn attach(&mut self, watchers: &mut dyn Watchers, context: PropagationContext<'_>) {
        for (index, &(coefficient, var)) in self.constraint.iter().enumerate() {
            // Only the bound which determines the minimum of the term matters.
            let events = match coefficient {
                0 => continue,
                c if c > 0 => DomainEvents::LOWER_BOUND,
                _ => DomainEvents::UPPER_BOUND,
            };
            watchers.watch_variable(var, events, LocalId::from(index as u32));
        }

        if !self.literal().is_true_literal() {
            watchers.watch_literal(self.literal());
        }

        self.bookkeeping.refresh_if_stale(
            self.constraint.as_slice(),
            &context,
            context.decision_level(),
        );
    }

    fn notify(
        &mut self,
        local_id: LocalId,
        _events: DomainEvents,
        context: PropagationContext<'_>,
    ) -> EnqueueDecision {
        self.bookkeeping.update(
            local_id.unpack() as usize,
            self.constraint.as_slice(),
            &context,
            context.decision_level(),
        );

        match context.literal_value(self.literal()) {
            LiteralValue::True => EnqueueDecision::Enqueue,
            LiteralValue::Unset if self.bookkeeping.minimum() > self.constraint.rhs() as i128 => {
                EnqueueDecision::Enqueue
            }
            LiteralValue::Unset | LiteralValue::False => EnqueueDecision::Skip,
        }
    }

    fn propagate(&mut self, context: &mut PropagationContextMut<'_>) -> PropagationStatus {
        match context.literal_value(self.literal()) {
            LiteralValue::False => Ok(()),
            LiteralValue::Unset => {
                // The constraint cannot be enforced yet, but a violated sum falsifies the literal.
                let linear = self.linear(&[]);
                if linear.minimum(&*context) <= linear.bound {
                    return Ok(());
                }

                let reason = linear.explain(None, linear.bound + 1, &*context);
                let negated = Predicate::from(!self.literal());
                if context.post(negated, reason)? == Tightening::Applied {
                    trace!("sum falsified its literal {}", self.literal());
                    self.core.statistics.num_tightenings += 1;
                }
                Ok(())
            }
            LiteralValue::True => {
                let SumState {
                    constraint,
                    base_reason,
                    core,
                    ..
                } = self;
                let linear = LinearLeq {
                    elements: constraint.as_slice(),
                    scale: 1,
                    bound: constraint.rhs() as i128,
                    base_reason,
                    refinement: core.options.reason_refinement,
                };
                linear.propagate(context, &mut core.statistics)
            }
        }
    }

    fn undo(&mut self, level: usize) {
        self.bookkeeping.undo(level);
    }

    fn detect_inconsistency(&self, context: PropagationContext<'_>) -> Option<PropagatorConflict> {
        if context.literal_value(self.literal()) == LiteralValue::False {
            return None;
        }

        let linear = self.linear(&[]);
        (linear.minimum(&context) > linear.bound).then(|| linear.conflict(&context))
    }

    fn check(&self, context: PropagationContext<'_>) -> bool {
        if context.literal_value(self.literal()) != LiteralValue::True {
            return true;
        }

        let linear = self.linear(&[]);
        linear.minimum(&context) <= linear.bound
    }
}
