use enumset::EnumSet;
use log::debug;
use log::trace;

use super::PropagatorQueue;
use crate::basic_types::PropagationStatus;
use crate::conprop_assert_simple;
use crate::constraints::Constraint;
use crate::constraints::Model;
use crate::containers::HashMap;
use crate::containers::KeyedVec;
use crate::containers::StorageKey;
use crate::create_statistics_struct;
use crate::predicates::Predicate;
use crate::predicates::PropositionalConjunction;
use crate::propagation::ConstraintState;
use crate::propagation::DomainEvent;
use crate::propagation::DomainEvents;
use crate::propagation::DomainStore;
use crate::propagation::EmptyDomain;
use crate::propagation::EnqueueDecision;
use crate::propagation::LocalId;
use crate::propagation::PropagationContext;
use crate::propagation::PropagationContextMut;
use crate::propagation::PropagationOptions;
use crate::propagation::ReadDomains;
use crate::propagation::SearchLoop;
use crate::propagation::StateStatus;
use crate::propagation::Tightening;
use crate::propagation::Watchers;
use crate::statistics::Statistic;
use crate::statistics::StatisticLogger;
use crate::variables::IntVar;
use crate::variables::Literal;
use crate::variables::Value;

/// The index of a state within its [`StateStore`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(pub(crate) u32);

impl StorageKey for StateId {
    fn index(&self) -> usize {
        self.0 as usize
    }

    fn create_from_index(index: usize) -> Self {
        StateId(index as u32)
    }
}

impl std::fmt::Display for StateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

create_statistics_struct!(
    /// Counters of a [`StateStore`].
    StoreStatistics {
        num_propagations: usize,
        num_notifications: usize,
        num_conflicts: usize,
    }
);

#[derive(Debug, Clone, Copy)]
struct VariableWatch {
    state_id: StateId,
    local_id: LocalId,
    events: DomainEvents,
}

#[derive(Debug, Default, Clone)]
struct WatchLists {
    variables: HashMap<IntVar, Vec<VariableWatch>>,
    literals: HashMap<Literal, Vec<StateId>>,
}

impl WatchLists {
    fn remove(&mut self, state_id: StateId) {
        self.variables
            .values_mut()
            .for_each(|watches| watches.retain(|watch| watch.state_id != state_id));
        self.literals
            .values_mut()
            .for_each(|watches| watches.retain(|&watcher| watcher != state_id));
    }
}

/// Registers the watches of one state while it is attached.
#[derive(Debug)]
struct WatchRegistration<'a> {
    watch_lists: &'a mut WatchLists,
    state_id: StateId,
}

impl Watchers for WatchRegistration<'_> {
    fn watch_variable(&mut self, var: IntVar, events: DomainEvents, local_id: LocalId) {
        self.watch_lists
            .variables
            .entry(var)
            .or_default()
            .push(VariableWatch {
                state_id: self.state_id,
                local_id,
                events,
            });
    }

    fn watch_literal(&mut self, literal: Literal) {
        self.watch_lists
            .literals
            .entry(literal)
            .or_default()
            .push(self.state_id);
    }
}

/// A change applied by the domain store on behalf of a state.
#[derive(Debug, Clone, Copy)]
enum Change {
    Domain(IntVar, DomainEvents),
    Literal(Literal),
}

/// Forwards posts to the domain store and records which of them changed something.
struct RecordingDomains<'a> {
    domains: &'a mut dyn DomainStore,
    changes: Vec<Change>,
}

impl std::fmt::Debug for RecordingDomains<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingDomains")
            .field("changes", &self.changes)
            .finish()
    }
}

impl ReadDomains for RecordingDomains<'_> {
    fn lower_bound(&self, var: IntVar) -> Value {
        self.domains.lower_bound(var)
    }

    fn upper_bound(&self, var: IntVar) -> Value {
        self.domains.upper_bound(var)
    }

    fn contains(&self, var: IntVar, value: Value) -> bool {
        self.domains.contains(var, value)
    }

    fn is_fixed(&self, var: IntVar) -> bool {
        self.domains.is_fixed(var)
    }
}

impl DomainStore for RecordingDomains<'_> {
    fn post(
        &mut self,
        predicate: Predicate,
        reason: PropositionalConjunction,
    ) -> Result<Tightening, EmptyDomain> {
        let Some(var) = predicate.get_domain() else {
            let result = self.domains.post(predicate, reason)?;
            if let (Tightening::Applied, Some(literal)) = (result, predicate.as_literal()) {
                self.changes.push(Change::Literal(literal));
            }
            return Ok(result);
        };

        let lower_bound = self.domains.lower_bound(var);
        let upper_bound = self.domains.upper_bound(var);
        let was_fixed = self.domains.is_fixed(var);

        let result = self.domains.post(predicate, reason)?;
        if result == Tightening::AlreadyEntailed {
            return Ok(result);
        }

        let mut events = EnumSet::new();
        if self.domains.lower_bound(var) > lower_bound {
            let _ = events.insert(DomainEvent::LowerBound);
        }
        if self.domains.upper_bound(var) < upper_bound {
            let _ = events.insert(DomainEvent::UpperBound);
        }
        if !was_fixed && self.domains.is_fixed(var) {
            let _ = events.insert(DomainEvent::Assign);
        }
        if events.is_empty() {
            let _ = events.insert(DomainEvent::Removal);
        }

        self.changes
            .push(Change::Domain(var, DomainEvents::new(events)));
        Ok(result)
    }
}

/// The constraint states of one search thread.
///
/// The store attaches a state for every constraint it is given and keeps the watch lists which
/// map domain changes to the states interested in them. [`StateStore::propagate`] runs the
/// enqueued states by priority until none is left, notifying the watchers of every change the
/// domain store applied along the way.
#[derive(Debug, Default)]
pub struct StateStore {
    states: KeyedVec<StateId, ConstraintState>,
    watch_lists: WatchLists,
    queue: PropagatorQueue,
    minimize_states: Vec<StateId>,
    last_objective_bound: Option<i64>,
    options: PropagationOptions,
    statistics: StoreStatistics,
}

impl StateStore {
    pub fn new(options: PropagationOptions) -> Self {
        StateStore {
            options,
            ..Default::default()
        }
    }

    /// Creates a store with one attached state for every definition of `model`.
    pub fn from_model(
        model: &Model,
        options: PropagationOptions,
        context: PropagationContext<'_>,
    ) -> Self {
        let mut store = StateStore::new(options);
        for constraint in model.iter() {
            let _ = store.add_constraint(&constraint, context);
        }
        debug!("created store with {} states", store.len());
        store
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn state(&self, state_id: StateId) -> &ConstraintState {
        &self.states[state_id]
    }

    pub fn iter(&self) -> impl Iterator<Item = (StateId, &ConstraintState)> {
        self.states.keys().zip(self.states.iter())
    }

    /// Creates a state for `constraint`, attaches it and enqueues it for its initial propagation.
    pub fn add_constraint(
        &mut self,
        constraint: &Constraint,
        context: PropagationContext<'_>,
    ) -> StateId {
        let state = constraint.create_state_with_options(self.options);
        let state_id = self.states.push(state);
        self.attach(state_id, context);

        if matches!(constraint, Constraint::Minimize(_)) {
            self.minimize_states.push(state_id);
        }
        state_id
    }

    /// Swaps the state `state_id` for a fresh state of `constraint`, e.g. after the objective was
    /// rebuilt with a different adjustment.
    pub fn replace_constraint(
        &mut self,
        state_id: StateId,
        constraint: &Constraint,
        context: PropagationContext<'_>,
    ) {
        conprop_assert_simple!(
            state_id.index() < self.states.len(),
            "no state with id {state_id}"
        );

        self.states[state_id].detach();
        self.watch_lists.remove(state_id);
        self.minimize_states.retain(|&id| id != state_id);

        self.states[state_id] = constraint.create_state_with_options(self.options);
        self.attach(state_id, context);
        if matches!(constraint, Constraint::Minimize(_)) {
            self.minimize_states.push(state_id);
        }
    }

    fn attach(&mut self, state_id: StateId, context: PropagationContext<'_>) {
        let mut registration = WatchRegistration {
            watch_lists: &mut self.watch_lists,
            state_id,
        };
        self.states[state_id].attach(&mut registration, context);

        let priority = self.states[state_id].priority();
        self.queue.enqueue(state_id, priority);
    }

    /// Informs the watchers of `var` that `events` happened on its domain.
    pub fn notify_domain_change(
        &mut self,
        var: IntVar,
        events: DomainEvents,
        context: PropagationContext<'_>,
    ) {
        let Some(watches) = self.watch_lists.variables.get(&var) else {
            return;
        };

        for watch in watches {
            let relevant = watch.events.intersection(events);
            if relevant.is_empty() {
                continue;
            }

            let state = &mut self.states[watch.state_id];
            if state.status() != StateStatus::Attached {
                continue;
            }

            self.statistics.num_notifications += 1;
            if state.notify(watch.local_id, relevant, context) == EnqueueDecision::Enqueue {
                self.queue.enqueue(watch.state_id, state.priority());
            }
        }
    }

    /// Informs the watchers of `literal` that it became true.
    pub fn notify_literal(&mut self, literal: Literal, context: PropagationContext<'_>) {
        let Some(watchers) = self.watch_lists.literals.get(&literal) else {
            return;
        };

        for &state_id in watchers {
            let state = &mut self.states[state_id];
            if state.status() != StateStatus::Attached {
                continue;
            }

            self.statistics.num_notifications += 1;
            if state.notify_literal(context) == EnqueueDecision::Enqueue {
                self.queue.enqueue(state_id, state.priority());
            }
        }
    }

    /// Runs the enqueued states until none is left or one of them fails.
    ///
    /// On failure the queue is emptied; the search loop is expected to backtrack and call
    /// [`StateStore::undo`].
    pub fn propagate(
        &mut self,
        domains: &mut dyn DomainStore,
        search: &dyn SearchLoop,
    ) -> PropagationStatus {
        let objective_bound = search.objective_bound();
        if objective_bound != self.last_objective_bound {
            trace!("objective bound changed to {objective_bound:?}");
            self.last_objective_bound = objective_bound;
            for &state_id in &self.minimize_states {
                self.queue
                    .enqueue(state_id, self.states[state_id].priority());
            }
        }

        while let Some(state_id) = self.queue.pop() {
            if self.states[state_id].status() != StateStatus::Attached {
                continue;
            }

            let mut recorder = RecordingDomains {
                domains: &mut *domains,
                changes: Vec::new(),
            };
            self.statistics.num_propagations += 1;
            let result =
                self.states[state_id].propagate(PropagationContextMut::new(&mut recorder, search));
            let changes = recorder.changes;

            let context = PropagationContext::new(&*domains, search);
            for change in changes {
                match change {
                    Change::Domain(var, events) => self.notify_domain_change(var, events, context),
                    Change::Literal(literal) => self.notify_literal(literal, context),
                }
            }

            if let Err(inconsistency) = result {
                debug!("state {state_id} failed: {inconsistency:?}");
                self.statistics.num_conflicts += 1;
                self.queue.clear();
                return Err(inconsistency);
            }
        }

        Ok(())
    }

    /// Rewinds every state to decision level `level`.
    pub fn undo(&mut self, level: usize) {
        for state in self.states.iter_mut() {
            state.undo(level);
        }
        self.queue.clear();
    }

    /// Whether every attached state accepts the current domains.
    pub fn check(&self, context: PropagationContext<'_>) -> bool {
        self.states
            .iter()
            .filter(|state| state.status() == StateStatus::Attached)
            .all(|state| state.check(context))
    }

    /// Detaches every state; the store cannot propagate anymore afterwards.
    pub fn detach_all(&mut self) {
        for state in self.states.iter_mut() {
            state.detach();
        }
        self.queue.clear();
    }

    pub fn log_statistics(&self) {
        self.statistics.log(StatisticLogger::new("store"));
        for (state_id, state) in self.iter() {
            state.log_statistics(StatisticLogger::new(state.name()).attach_to_prefix(state_id));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::Inconsistency;
    use crate::constraints::DistinctConstraint;
    use crate::constraints::DistinctTerm;
    use crate::constraints::MinimizeConstraint;
    use crate::constraints::SumConstraint;
    use crate::engine::test_solver::TestSolver;
    use crate::predicate;
    use crate::propagation::LiteralValue;
    use crate::variables::TRUE_LIT;

    #[test]
    fn sum_scenario_reaches_a_fixed_point() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(0, 10);
        let y = solver.new_variable(0, 10);
        let sum = SumConstraint::create(TRUE_LIT, 5, &[(3, x), (1, y)], true).unwrap();

        let mut store = StateStore::default();
        let _ = solver.add_to_store(&mut store, &sum.into());
        solver.propagate_store(&mut store).expect("no conflict");

        solver.assert_bounds(x, 0, 1);
        solver.assert_bounds(y, 0, 5);
        assert!(store.check(solver.context()));
    }

    #[test]
    fn changes_are_forwarded_between_states() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(0, 10);
        let y = solver.new_variable(0, 10);
        let z = solver.new_variable(0, 10);

        let mut store = StateStore::default();
        // x >= 4, x + y <= 6 and z - y <= -1
        let _ = solver.add_to_store(
            &mut store,
            &SumConstraint::create(TRUE_LIT, -4, &[(-1, x)], false).unwrap().into(),
        );
        let _ = solver.add_to_store(
            &mut store,
            &SumConstraint::create(TRUE_LIT, 6, &[(1, x), (1, y)], false).unwrap().into(),
        );
        let _ = solver.add_to_store(
            &mut store,
            &SumConstraint::create(TRUE_LIT, -1, &[(1, z), (-1, y)], false).unwrap().into(),
        );
        solver.propagate_store(&mut store).expect("no conflict");

        solver.assert_bounds(x, 4, 5);
        solver.assert_bounds(y, 1, 2);
        solver.assert_bounds(z, 0, 1);
    }

    #[test]
    fn distinct_and_sum_interact() {
        let mut solver = TestSolver::default();
        let a = solver.new_variable(0, 1);
        let b = solver.new_variable(0, 1);

        let mut store = StateStore::default();
        let _ = solver.add_to_store(
            &mut store,
            &DistinctConstraint::new(
                TRUE_LIT,
                vec![
                    DistinctTerm::new(vec![(1, a)], 0),
                    DistinctTerm::new(vec![(1, b)], 0),
                ],
            )
            .into(),
        );
        // a >= 1
        let _ = solver.add_to_store(
            &mut store,
            &SumConstraint::create(TRUE_LIT, -1, &[(-1, a)], false).unwrap().into(),
        );
        solver.propagate_store(&mut store).expect("no conflict");

        solver.assert_bounds(a, 1, 1);
        solver.assert_bounds(b, 0, 0);
    }

    #[test]
    fn activation_literals_are_notified() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(3, 10);
        let literal = solver.new_literal();

        let mut store = StateStore::default();
        let _ = solver.add_to_store(
            &mut store,
            &SumConstraint::create(literal, 5, &[(1, x)], false).unwrap().into(),
        );
        solver.propagate_store(&mut store).expect("no conflict");
        solver.assert_bounds(x, 3, 10);

        solver.new_decision_level();
        solver.set_literal(literal, true);
        store.notify_literal(literal, solver.context());
        solver.propagate_store(&mut store).expect("no conflict");
        solver.assert_bounds(x, 3, 5);

        solver.backtrack_store(&mut store, 0);
        solver.assert_bounds(x, 3, 10);
        assert_eq!(LiteralValue::Unset, solver.literal_value(literal));
    }

    #[test]
    fn conflicts_empty_the_queue() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(0, 10);

        let mut store = StateStore::default();
        let _ = solver.add_to_store(
            &mut store,
            &SumConstraint::create(TRUE_LIT, 4, &[(1, x)], false).unwrap().into(),
        );

        solver.new_decision_level();
        solver.set_lower_bound(x, 6);
        store.notify_domain_change(x, DomainEvents::LOWER_BOUND, solver.context());
        let result = solver.propagate_store(&mut store);

        assert_eq!(
            Err(Inconsistency::Conflict(crate::basic_types::PropagatorConflict {
                conjunction: predicate!(x >= 6).into()
            })),
            result
        );
        assert!(store.queue.is_empty());

        solver.backtrack_store(&mut store, 0);
        assert!(store.check(solver.context()));
    }

    #[test]
    fn improved_objectives_enqueue_minimize_states() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(0, 10);

        let mut store = StateStore::default();
        let _ = solver.add_to_store(
            &mut store,
            &MinimizeConstraint::create(1, &[(1, x)], false).unwrap().into(),
        );
        solver.propagate_store(&mut store).expect("no conflict");
        solver.assert_bounds(x, 0, 10);

        solver.set_objective(6);
        solver.propagate_store(&mut store).expect("no conflict");
        solver.assert_bounds(x, 0, 4);
    }

    #[test]
    fn replaced_states_stop_watching() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(0, 10);

        let mut store = StateStore::default();
        let objective = MinimizeConstraint::create(0, &[(1, x)], false).unwrap();
        let state_id = solver.add_to_store(&mut store, &objective.clone().into());
        solver.propagate_store(&mut store).expect("no conflict");

        let adjusted = objective.with_adjust(2).unwrap();
        store.replace_constraint(state_id, &adjusted.into(), solver.context());
        assert_eq!(1, store.len());
        assert_eq!(1, store.watch_lists.variables[&x].len());

        solver.set_objective(5);
        solver.propagate_store(&mut store).expect("no conflict");
        solver.assert_bounds(x, 0, 2);
    }

    #[test]
    fn store_is_created_from_a_model() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(0, 10);
        let y = solver.new_variable(0, 10);

        let mut model = Model::default();
        let _ = model
            .add_sum(TRUE_LIT, [(1, Some(x)), (1, Some(y))], 3)
            .unwrap();
        model.add_minimize([(-1, Some(x))], 0).unwrap();
        let model = model.share();

        let mut store =
            StateStore::from_model(&model, PropagationOptions::default(), solver.context());
        assert_eq!(2, store.len());
        solver.propagate_store(&mut store).expect("no conflict");
        solver.assert_bounds(x, 0, 3);

        // Maximising x: a solution with x = 2 demands x >= 3 from now on.
        solver.set_objective(-2);
        solver.propagate_store(&mut store).expect("no conflict");
        solver.assert_bounds(x, 3, 3);
        solver.assert_bounds(y, 0, 0);
    }
}
