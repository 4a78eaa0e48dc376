use super::linear::LinearBookkeeping;
use super::linear::LinearLeq;
use super::state::StateBehaviour;
use super::state::StateCore;
use super::DomainEvents;
use super::EnqueueDecision;
use super::LocalId;
use super::Priority;
use super::PropagationContext;
use super::PropagationContextMut;
use super::PropagationOptions;
use super::Watchers;
use crate::basic_types::PropagationStatus;
use crate::basic_types::PropagatorConflict;
use crate::constraints::Constraint;
use crate::constraints::MinimizeConstraint;
use crate::variables::Literal;
use crate::variables::TRUE_LIT;

/// The per-thread state of the objective `Σ c·x + adjust`.
///
/// Once the search loop has found a solution with cost `k`, the state enforces
/// `Σ c·x + adjust <= k - 1`, so every later solution is strictly better. The minimum of `Σ c·x`
/// is tracked incrementally so that notifications which leave it unchanged do not enqueue.
#[derive(Debug, Clone)]
pub struct MinimizeState {
    constraint: MinimizeConstraint,
    bookkeeping: LinearBookkeeping,
    core: StateCore,
}

impl MinimizeState {
    pub(crate) fn new(constraint: MinimizeConstraint, options: PropagationOptions) -> Self {
        MinimizeState {
            bookkeeping: LinearBookkeeping::new(constraint.len()),
            constraint,
            core: StateCore::new(options),
        }
    }

    /// The bound on `Σ c·x` implied by the best objective value found so far.
    fn bound(&self, context: PropagationContext<'_>) -> Option<i128> {
        context
            .objective_bound()
            .map(|objective| objective as i128 - 1 - self.constraint.adjust() as i128)
    }

    fn linear(&self, bound: i128) -> LinearLeq<'_> {
        LinearLeq {
            elements: self.constraint.as_slice(),
            scale: 1,
            bound,
            base_reason: &[],
            refinement: self.core.options.reason_refinement,
        }
    }
}

impl StateBehaviour for MinimizeState {
    fn name(&self) -> &str {
        "Minimize"
    }

    fn core(&self) -> &StateCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut StateCore {
        &mut self.core
    }

    fn literal(&self) -> Literal {
        TRUE_LIT
    }

    fn priority(&self) -> Priority {
        Priority::Low
    }

    fn constraint(&self) -> Constraint {
        Constraint::Minimize(self.constraint.clone())
    }

    fn attach(&mut self, watchers: &mut dyn Watchers, context: PropagationContext<'_>) {
        for (index, &(coefficient, var)) in self.constraint.iter().enumerate() {
            let events = match coefficient {
                0 => continue,
                c if c > 0 => DomainEvents::LOWER_BOUND,
                _ => DomainEvents::UPPER_BOUND,
            };
            watchers.watch_variable(var, events, LocalId::from(index as u32));
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
        let was_stale = self.bookkeeping.is_stale();
        let previous = self.bookkeeping.minimum();
        self.bookkeeping.update(
            local_id.unpack() as usize,
            self.constraint.as_slice(),
            &context,
            context.decision_level(),
        );

        // Only a moved minimum can shrink the slack against the incumbent.
        let moved = was_stale || self.bookkeeping.minimum() != previous;
        if moved && self.bound(context).is_some() {
            EnqueueDecision::Enqueue
        } else {
            EnqueueDecision::Skip
        }
    }

    fn propagate(&mut self, context: &mut PropagationContextMut<'_>) -> PropagationStatus {
        let Some(bound) = self.bound(context.as_readonly()) else {
            return Ok(());
        };

        let MinimizeState {
            constraint, core, ..
        } = self;
        let linear = LinearLeq {
            elements: constraint.as_slice(),
            scale: 1,
            bound,
            base_reason: &[],
            refinement: core.options.reason_refinement,
        };
        linear.propagate(context, &mut core.statistics)
    }

    fn undo(&mut self, level: usize) {
        self.bookkeeping.undo(level);
    }

    fn detect_inconsistency(&self, context: PropagationContext<'_>) -> Option<PropagatorConflict> {
        let linear = self.linear(self.bound(context)?);
        (linear.minimum(&context) > linear.bound).then(|| linear.conflict(&context))
    }

    fn check(&self, context: PropagationContext<'_>) -> bool {
        let Some(bound) = self.bound(context) else {
            return true;
        };

        let linear = self.linear(bound);
        linear.minimum(&context) <= linear.bound
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::Inconsistency;
    use crate::conjunction;
    use crate::engine::test_solver::TestSolver;
    use crate::predicate;

    #[test]
    fn nothing_happens_without_an_incumbent() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(0, 10);
        let y = solver.new_variable(0, 10);

        let constraint = MinimizeConstraint::create(0, &[(1, x), (2, y)], false).unwrap();
        let mut state = Constraint::from(constraint).create_state();
        solver.attach(&mut state);
        solver.propagate(&mut state).expect("no conflict");

        solver.assert_bounds(x, 0, 10);
        solver.assert_bounds(y, 0, 10);
        assert!(state.check(solver.context()));
        assert_eq!(
            EnqueueDecision::Skip,
            solver.notify(&mut state, LocalId::from(0), DomainEvents::LOWER_BOUND)
        );
    }

    #[test]
    fn solutions_must_improve_on_the_incumbent() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(0, 10);
        let y = solver.new_variable(0, 10);

        // objective x + 2y + 3
        let constraint = MinimizeConstraint::create(3, &[(1, x), (2, y)], false).unwrap();
        let mut state = Constraint::from(constraint).create_state();
        solver.attach(&mut state);

        solver.set_objective(10);
        solver.propagate(&mut state).expect("no conflict");

        // x + 2y <= 10 - 1 - 3
        solver.assert_bounds(x, 0, 6);
        solver.assert_bounds(y, 0, 3);
        assert_eq!(conjunction!([y >= 0]), solver.get_reason(predicate!(x <= 6)));
    }

    #[test]
    fn the_incumbent_is_never_accepted_again() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(4, 4);

        let constraint = MinimizeConstraint::create(0, &[(1, x)], false).unwrap();
        let mut state = Constraint::from(constraint).create_state();
        solver.attach(&mut state);
        assert!(state.check(solver.context()));

        solver.set_objective(4);
        assert!(!state.check(solver.context()));
        assert_eq!(
            Err(Inconsistency::Conflict(PropagatorConflict {
                conjunction: conjunction!([x >= 4])
            })),
            solver.propagate(&mut state)
        );
    }

    #[test]
    fn negative_coefficients_are_bounded_from_below() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(-5, 5);

        // maximise x, i.e. minimise -x
        let constraint = MinimizeConstraint::create(0, &[(-1, x)], false).unwrap();
        let mut state = Constraint::from(constraint).create_state();
        solver.attach(&mut state);

        solver.set_objective(-2);
        solver.propagate(&mut state).expect("no conflict");

        solver.assert_bounds(x, 3, 5);
    }

    #[test]
    fn improvement_enqueues_on_changes() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(0, 10);

        let constraint = MinimizeConstraint::create(0, &[(1, x)], false).unwrap();
        let mut state = Constraint::from(constraint).create_state();
        solver.attach(&mut state);
        solver.set_objective(8);

        solver.set_lower_bound(x, 2);
        assert_eq!(
            EnqueueDecision::Enqueue,
            solver.notify(&mut state, LocalId::from(0), DomainEvents::LOWER_BOUND)
        );
        assert!(state.detect_inconsistency(solver.context()).is_none());

        solver.set_lower_bound(x, 8);
        assert!(state.detect_inconsistency(solver.context()).is_some());
    }

    #[test]
    fn unchanged_minimum_does_not_enqueue() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(0, 10);
        let y = solver.new_variable(0, 10);

        let constraint = MinimizeConstraint::create(0, &[(1, x), (-1, y)], false).unwrap();
        let mut state = Constraint::from(constraint).create_state();
        solver.attach(&mut state);
        solver.set_objective(8);

        solver.set_lower_bound(x, 2);
        assert_eq!(
            EnqueueDecision::Enqueue,
            solver.notify(&mut state, LocalId::from(0), DomainEvents::LOWER_BOUND)
        );
        assert_eq!(
            EnqueueDecision::Skip,
            solver.notify(&mut state, LocalId::from(0), DomainEvents::LOWER_BOUND)
        );

        solver.new_decision_level();
        solver.set_upper_bound(y, 4);
        assert_eq!(
            EnqueueDecision::Enqueue,
            solver.notify(&mut state, LocalId::from(1), DomainEvents::UPPER_BOUND)
        );

        // The minimum of x - y is back at 2 - 10 after backtracking.
        solver.backtrack(&mut state, 0);
        assert_eq!(
            EnqueueDecision::Skip,
            solver.notify(&mut state, LocalId::from(1), DomainEvents::UPPER_BOUND)
        );
        assert!(state.check(solver.context()));
    }
}
