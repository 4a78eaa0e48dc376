use std::cell::Cell;
use std::marker::PhantomData;

use log::debug;

use super::DistinctState;
use super::DomainEvents;
use super::EnqueueDecision;
use super::LiteralValue;
use super::LocalId;
use super::MinimizeState;
use super::Priority;
use super::PropagationContext;
use super::PropagationContextMut;
use super::PropagationOptions;
use super::SumState;
use super::Watchers;
use crate::basic_types::Inconsistency;
use crate::basic_types::PropagationStatus;
use crate::basic_types::PropagatorConflict;
use crate::conprop_assert_simple;
use crate::constraints::Constraint;
use crate::create_statistics_struct;
use crate::predicates::Predicate;
use crate::statistics::Statistic;
use crate::statistics::StatisticLogger;
use crate::variables::Literal;

create_statistics_struct!(
    /// Counters kept by every constraint state.
    StateStatistics {
        num_propagation_calls: usize,
        num_tightenings: usize,
        num_conflicts: usize,
    }
);

/// Where a [`ConstraintState`] is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateStatus {
    /// Created but not watching anything; also the final status once the owning thread is done.
    Idle,
    /// Watching its variables and waiting to be propagated.
    Attached,
    /// Inside a call to [`ConstraintState::propagate`].
    Propagating,
}

/// The part of a state which does not depend on the constraint kind.
#[derive(Debug, Clone)]
pub(crate) struct StateCore {
    pub(crate) status: StateStatus,
    pub(crate) options: PropagationOptions,
    pub(crate) statistics: StateStatistics,
    /// The most recent conflict and the decision level at which it was found.
    last_conflict: Option<(usize, PropagatorConflict)>,
    /// A state is moved between threads at most as a whole; shared references to it must stay on
    /// one thread.
    not_sync: PhantomData<Cell<()>>,
}

impl StateCore {
    pub(crate) fn new(options: PropagationOptions) -> Self {
        StateCore {
            status: StateStatus::Idle,
            options,
            statistics: StateStatistics::default(),
            last_conflict: None,
            not_sync: PhantomData,
        }
    }

    fn undo(&mut self, level: usize) {
        if self
            .last_conflict
            .as_ref()
            .is_some_and(|(conflict_level, _)| level < *conflict_level)
        {
            self.last_conflict = None;
        }
    }
}

/// The predicates every reason of a constraint with `literal` starts with.
pub(crate) fn literal_reason(literal: Literal) -> Box<[Predicate]> {
    if literal.is_true_literal() {
        Box::new([])
    } else {
        Box::new([Predicate::from(literal)])
    }
}

/// The behaviour a concrete state provides; [`ConstraintState`] adds the lifecycle around it.
pub(crate) trait StateBehaviour {
    fn name(&self) -> &str;

    fn core(&self) -> &StateCore;

    fn core_mut(&mut self) -> &mut StateCore;

    fn literal(&self) -> Literal;

    fn priority(&self) -> Priority;

    fn constraint(&self) -> Constraint;

    /// Registers the watches and computes the initial bookkeeping.
    fn attach(&mut self, watchers: &mut dyn Watchers, context: PropagationContext<'_>);

    fn notify(
        &mut self,
        local_id: LocalId,
        events: DomainEvents,
        context: PropagationContext<'_>,
    ) -> EnqueueDecision;

    fn propagate(&mut self, context: &mut PropagationContextMut<'_>) -> PropagationStatus;

    fn undo(&mut self, level: usize);

    fn detect_inconsistency(&self, context: PropagationContext<'_>) -> Option<PropagatorConflict>;

    fn check(&self, context: PropagationContext<'_>) -> bool;
}

/// The private propagation bookkeeping of one thread for one constraint.
///
/// A state is created by [`Constraint::create_state`] and then driven by the search loop of a
/// single thread: [`attach`](ConstraintState::attach) once, then any interleaving of
/// [`notify`](ConstraintState::notify), [`propagate`](ConstraintState::propagate) and
/// [`undo`](ConstraintState::undo), with [`check`](ConstraintState::check) to confirm complete
/// assignments.
///
/// A state may be moved to another thread, but it cannot be shared:
/// ```compile_fail
/// fn assert_sync<T: Sync>() {}
/// assert_sync::<conprop_core::propagation::ConstraintState>();
/// ```
#[derive(Debug, Clone)]
pub enum ConstraintState {
    Sum(SumState),
    Minimize(MinimizeState),
    Distinct(DistinctState),
}

macro_rules! dispatch {
    ($state:expr, $inner:ident => $body:expr) => {
        match $state {
            ConstraintState::Sum($inner) => $body,
            ConstraintState::Minimize($inner) => $body,
            ConstraintState::Distinct($inner) => $body,
        }
    };
}

impl ConstraintState {
    pub fn name(&self) -> &str {
        dispatch!(self, state => state.name())
    }

    pub fn status(&self) -> StateStatus {
        dispatch!(self, state => state.core().status)
    }

    /// The activation literal of the constraint this state was created from.
    pub fn literal(&self) -> Literal {
        dispatch!(self, state => state.literal())
    }

    pub fn priority(&self) -> Priority {
        dispatch!(self, state => state.priority())
    }

    /// A handle to the definition this state derives from.
    pub fn constraint(&self) -> Constraint {
        dispatch!(self, state => state.constraint())
    }

    pub fn options(&self) -> PropagationOptions {
        dispatch!(self, state => state.core().options)
    }

    /// Registers interest in the variables and the literal of the constraint with `watchers`,
    /// and initialises the bookkeeping from the current domains.
    pub fn attach(&mut self, watchers: &mut dyn Watchers, context: PropagationContext<'_>) {
        conprop_assert_simple!(
            self.status() == StateStatus::Idle,
            "{} is attached twice",
            self.name()
        );

        dispatch!(self, state => {
            state.attach(watchers, context);
            state.core_mut().status = StateStatus::Attached;
        });

        debug!("attached {} at level {}", self.name(), context.decision_level());
    }

    /// Informs the state that `events` happened on the variable registered under `local_id`.
    pub fn notify(
        &mut self,
        local_id: LocalId,
        events: DomainEvents,
        context: PropagationContext<'_>,
    ) -> EnqueueDecision {
        conprop_assert_simple!(self.status() == StateStatus::Attached);

        dispatch!(self, state => state.notify(local_id, events, context))
    }

    /// Informs the state that its activation literal became true.
    pub fn notify_literal(&mut self, context: PropagationContext<'_>) -> EnqueueDecision {
        conprop_assert_simple!(self.status() == StateStatus::Attached);

        match context.literal_value(self.literal()) {
            LiteralValue::True => EnqueueDecision::Enqueue,
            LiteralValue::Unset | LiteralValue::False => EnqueueDecision::Skip,
        }
    }

    /// Tightens the domains based on the current bounds, or reports a conflict.
    pub fn propagate(&mut self, mut context: PropagationContextMut<'_>) -> PropagationStatus {
        conprop_assert_simple!(
            self.status() == StateStatus::Attached,
            "{} is propagated while {:?}",
            self.name(),
            self.status()
        );

        let level = context.decision_level();

        dispatch!(self, state => {
            state.core_mut().status = StateStatus::Propagating;
            state.core_mut().statistics.num_propagation_calls += 1;

            let result = state.propagate(&mut context);

            state.core_mut().status = StateStatus::Attached;
            match &result {
                Ok(()) => {}
                Err(Inconsistency::Conflict(conflict)) => {
                    debug!("{} found a conflict at level {level}: {}", state.name(), conflict.conjunction);
                    let core = state.core_mut();
                    core.statistics.num_conflicts += 1;
                    core.last_conflict = Some((level, conflict.clone()));
                }
                Err(Inconsistency::EmptyDomain) => {
                    debug!("{} emptied a domain at level {level}", state.name());
                    state.core_mut().statistics.num_conflicts += 1;
                }
            }

            result
        })
    }

    /// Discards all bookkeeping derived after decision level `level`.
    pub fn undo(&mut self, level: usize) {
        dispatch!(self, state => {
            state.core_mut().undo(level);
            state.undo(level);
        })
    }

    /// Returns the conflict the constraint is in under the current domains, without changing
    /// anything. The activation literal is not part of the returned conjunction, so the search
    /// loop can use it as the reason for setting the literal to false.
    pub fn detect_inconsistency(
        &self,
        context: PropagationContext<'_>,
    ) -> Option<PropagatorConflict> {
        dispatch!(self, state => state.detect_inconsistency(context))
    }

    /// Whether the current domains satisfy the constraint. Has no side effects.
    pub fn check(&self, context: PropagationContext<'_>) -> bool {
        dispatch!(self, state => state.check(context))
    }

    /// The conflict reported by the last failing call to
    /// [`propagate`](ConstraintState::propagate), until the search loop backtracks past the level
    /// it was found at.
    pub fn last_conflict(&self) -> Option<&PropagatorConflict> {
        dispatch!(self, state => state.core().last_conflict.as_ref().map(|(_, conflict)| conflict))
    }

    /// Moves the state into its final status; it can no longer be propagated.
    pub fn detach(&mut self) {
        dispatch!(self, state => state.core_mut().status = StateStatus::Idle)
    }

    pub fn log_statistics(&self, statistic_logger: StatisticLogger) {
        dispatch!(self, state => state.core().statistics.log(statistic_logger))
    }
}
