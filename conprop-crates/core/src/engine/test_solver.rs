//! A minimal search loop for driving constraint states in unit tests.
use std::cell::RefCell;
use std::rc::Rc;

use super::StateId;
use super::StateStore;
use crate::basic_types::PropagationStatus;
use crate::basic_types::Trail;
use crate::constraints::Constraint;
use crate::containers::HashMap;
use crate::containers::HashSet;
use crate::containers::KeyedVec;
use crate::predicates::Predicate;
use crate::predicates::PredicateType;
use crate::predicates::PropositionalConjunction;
use crate::propagation::ConstraintState;
use crate::propagation::DomainEvents;
use crate::propagation::DomainStore;
use crate::propagation::EmptyDomain;
use crate::propagation::EnqueueDecision;
use crate::propagation::LiteralValue;
use crate::propagation::LocalId;
use crate::propagation::PropagationContext;
use crate::propagation::PropagationContextMut;
use crate::propagation::ReadDomains;
use crate::propagation::SearchLoop;
use crate::propagation::Tightening;
use crate::propagation::Watchers;
use crate::variables::IntVar;
use crate::variables::Literal;
use crate::variables::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
struct TestDomain {
    lower_bound: Value,
    upper_bound: Value,
    holes: HashSet<Value>,
}

impl TestDomain {
    fn contains(&self, value: Value) -> bool {
        self.lower_bound <= value && value <= self.upper_bound && !self.holes.contains(&value)
    }

    fn is_empty(&self) -> bool {
        self.lower_bound > self.upper_bound
    }

    /// Moves the bounds past the holes at the ends of the domain.
    fn normalise(&mut self) {
        while self.lower_bound <= self.upper_bound && self.holes.contains(&self.lower_bound) {
            self.lower_bound += 1;
        }
        while self.lower_bound <= self.upper_bound && self.holes.contains(&self.upper_bound) {
            self.upper_bound -= 1;
        }
    }

    fn apply(&self, predicate_type: PredicateType, value: Value) -> TestDomain {
        let mut updated = self.clone();
        match predicate_type {
            PredicateType::LowerBound => updated.lower_bound = updated.lower_bound.max(value),
            PredicateType::UpperBound => updated.upper_bound = updated.upper_bound.min(value),
            PredicateType::Equal => {
                if self.contains(value) {
                    updated.lower_bound = value;
                    updated.upper_bound = value;
                } else {
                    updated.upper_bound = updated.lower_bound - 1;
                }
            }
            PredicateType::NotEqual => {
                if self.contains(value) {
                    let _ = updated.holes.insert(value);
                }
            }
        }
        updated.normalise();
        updated
    }
}

/// The truth values of the literals, shared by the domains (which assign them) and the search
/// loop (which reports them).
#[derive(Debug, Default)]
struct LiteralAssignment {
    true_literals: HashSet<Literal>,
    trail: Trail<Literal>,
}

impl LiteralAssignment {
    fn value(&self, literal: Literal) -> LiteralValue {
        if self.true_literals.contains(&literal) {
            LiteralValue::True
        } else if self.true_literals.contains(&!literal) {
            LiteralValue::False
        } else {
            LiteralValue::Unset
        }
    }

    fn assign(&mut self, literal: Literal) {
        let _ = self.true_literals.insert(literal);
        self.trail.push(literal);
    }

    fn new_level(&mut self) {
        self.trail.new_level();
    }

    fn synchronise(&mut self, level: usize) {
        for literal in self.trail.synchronise(level) {
            let _ = self.true_literals.remove(&literal);
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct TestDomains {
    domains: KeyedVec<IntVar, TestDomain>,
    trail: Trail<(IntVar, TestDomain)>,
    literals: Rc<RefCell<LiteralAssignment>>,
    reasons: HashMap<Predicate, PropositionalConjunction>,
    num_posted: usize,
}

impl TestDomains {
    fn update(&mut self, var: IntVar, updated: TestDomain) {
        let previous = std::mem::replace(&mut self.domains[var], updated);
        self.trail.push((var, previous));
    }

    fn synchronise(&mut self, level: usize) {
        for (var, previous) in self.trail.synchronise(level) {
            self.domains[var] = previous;
        }
    }
}

impl ReadDomains for TestDomains {
    fn lower_bound(&self, var: IntVar) -> Value {
        self.domains[var].lower_bound
    }

    fn upper_bound(&self, var: IntVar) -> Value {
        self.domains[var].upper_bound
    }

    fn contains(&self, var: IntVar, value: Value) -> bool {
        self.domains[var].contains(value)
    }
}

impl DomainStore for TestDomains {
    fn post(
        &mut self,
        predicate: Predicate,
        reason: PropositionalConjunction,
    ) -> Result<Tightening, EmptyDomain> {
        if let Some(literal) = predicate.as_literal() {
            let value = self.literals.borrow().value(literal);
            return match value {
                LiteralValue::True => Ok(Tightening::AlreadyEntailed),
                LiteralValue::False => Err(EmptyDomain),
                LiteralValue::Unset => {
                    self.literals.borrow_mut().assign(literal);
                    let _ = self.reasons.insert(predicate, reason);
                    self.num_posted += 1;
                    Ok(Tightening::Applied)
                }
            };
        }

        let (Some(var), Some(predicate_type), Some(value)) = (
            predicate.get_domain(),
            predicate.get_predicate_type(),
            predicate.get_right_hand_side(),
        ) else {
            unreachable!("{predicate} is neither a literal nor an integer predicate");
        };

        let updated = self.domains[var].apply(predicate_type, value);
        if updated.is_empty() {
            return Err(EmptyDomain);
        }
        if updated == self.domains[var] {
            return Ok(Tightening::AlreadyEntailed);
        }

        self.update(var, updated);
        let _ = self.reasons.insert(predicate, reason);
        self.num_posted += 1;
        Ok(Tightening::Applied)
    }
}

#[derive(Debug, Default)]
pub(crate) struct TestSearch {
    literals: Rc<RefCell<LiteralAssignment>>,
    decision_level: usize,
    objective_bound: Option<i64>,
}

impl SearchLoop for TestSearch {
    fn literal_value(&self, literal: Literal) -> LiteralValue {
        self.literals.borrow().value(literal)
    }

    fn decision_level(&self) -> usize {
        self.decision_level
    }

    fn objective_bound(&self) -> Option<i64> {
        self.objective_bound
    }
}

/// Remembers what the states registered when they were attached.
#[derive(Debug, Default)]
pub(crate) struct TestWatchers {
    pub(crate) variables: Vec<(IntVar, DomainEvents, LocalId)>,
    pub(crate) literals: Vec<Literal>,
}

impl Watchers for TestWatchers {
    fn watch_variable(&mut self, var: IntVar, events: DomainEvents, local_id: LocalId) {
        self.variables.push((var, events, local_id));
    }

    fn watch_literal(&mut self, literal: Literal) {
        self.literals.push(literal);
    }
}

/// A search loop with bounds and holes for the integer variables and a trail for backtracking.
///
/// Decisions are made by calling [`TestSolver::set_lower_bound`] and friends directly; they are
/// not counted as posts and have no reason.
#[derive(Debug)]
pub(crate) struct TestSolver {
    pub(crate) domains: TestDomains,
    pub(crate) search: TestSearch,
    pub(crate) watchers: TestWatchers,
    next_literal: i32,
}

impl Default for TestSolver {
    fn default() -> Self {
        let _ = env_logger::builder().is_test(true).try_init();

        let literals = Rc::new(RefCell::new(LiteralAssignment::default()));
        TestSolver {
            domains: TestDomains {
                literals: Rc::clone(&literals),
                ..Default::default()
            },
            search: TestSearch {
                literals,
                ..Default::default()
            },
            watchers: TestWatchers::default(),
            next_literal: 2,
        }
    }
}

impl TestSolver {
    pub(crate) fn new_variable(&mut self, lower_bound: Value, upper_bound: Value) -> IntVar {
        assert!(lower_bound <= upper_bound, "empty initial domain");
        self.domains.domains.push(TestDomain {
            lower_bound,
            upper_bound,
            holes: HashSet::default(),
        })
    }

    pub(crate) fn new_literal(&mut self) -> Literal {
        let literal = Literal::new(self.next_literal);
        self.next_literal += 1;
        literal
    }

    pub(crate) fn set_literal(&mut self, literal: Literal, value: bool) {
        let literal = if value { literal } else { !literal };
        assert_eq!(
            LiteralValue::Unset,
            self.literal_value(literal),
            "{literal} is already assigned"
        );
        self.search.literals.borrow_mut().assign(literal);
    }

    pub(crate) fn literal_value(&self, literal: Literal) -> LiteralValue {
        self.context().literal_value(literal)
    }

    pub(crate) fn set_objective(&mut self, objective: i64) {
        self.search.objective_bound = Some(objective);
    }

    pub(crate) fn new_decision_level(&mut self) {
        self.search.decision_level += 1;
        self.domains.trail.new_level();
        self.search.literals.borrow_mut().new_level();
    }

    fn decide(&mut self, var: IntVar, predicate_type: PredicateType, value: Value) {
        let updated = self.domains.domains[var].apply(predicate_type, value);
        assert!(!updated.is_empty(), "decision empties the domain of {var}");
        self.domains.update(var, updated);
    }

    pub(crate) fn set_lower_bound(&mut self, var: IntVar, value: Value) {
        self.decide(var, PredicateType::LowerBound, value);
    }

    pub(crate) fn set_upper_bound(&mut self, var: IntVar, value: Value) {
        self.decide(var, PredicateType::UpperBound, value);
    }

    pub(crate) fn contains(&self, var: IntVar, value: Value) -> bool {
        self.domains.contains(var, value)
    }

    pub(crate) fn assert_bounds(&self, var: IntVar, lower_bound: Value, upper_bound: Value) {
        assert_eq!(
            (lower_bound, upper_bound),
            (self.domains.lower_bound(var), self.domains.upper_bound(var)),
            "unexpected bounds of {var}"
        );
    }

    pub(crate) fn get_reason(&self, predicate: Predicate) -> PropositionalConjunction {
        self.domains
            .reasons
            .get(&predicate)
            .cloned()
            .unwrap_or_else(|| panic!("{predicate} was never posted"))
    }

    pub(crate) fn num_posted(&self) -> usize {
        self.domains.num_posted
    }

    pub(crate) fn context(&self) -> PropagationContext<'_> {
        PropagationContext::new(&self.domains, &self.search)
    }

    pub(crate) fn attach(&mut self, state: &mut ConstraintState) {
        let context = PropagationContext::new(&self.domains, &self.search);
        state.attach(&mut self.watchers, context);
    }

    pub(crate) fn propagate(&mut self, state: &mut ConstraintState) -> PropagationStatus {
        state.propagate(PropagationContextMut::new(&mut self.domains, &self.search))
    }

    pub(crate) fn notify(
        &mut self,
        state: &mut ConstraintState,
        local_id: LocalId,
        events: DomainEvents,
    ) -> EnqueueDecision {
        state.notify(local_id, events, self.context())
    }

    pub(crate) fn notify_literal(&mut self, state: &mut ConstraintState) -> EnqueueDecision {
        state.notify_literal(self.context())
    }

    pub(crate) fn backtrack(&mut self, state: &mut ConstraintState, level: usize) {
        self.backtrack_domains(level);
        state.undo(level);
    }

    fn backtrack_domains(&mut self, level: usize) {
        assert!(level <= self.search.decision_level);
        self.domains.synchronise(level);
        self.search.literals.borrow_mut().synchronise(level);
        self.search.decision_level = level;
    }

    pub(crate) fn add_to_store(&mut self, store: &mut StateStore, constraint: &Constraint) -> StateId {
        store.add_constraint(constraint, self.context())
    }

    pub(crate) fn propagate_store(&mut self, store: &mut StateStore) -> PropagationStatus {
        store.propagate(&mut self.domains, &self.search)
    }

    pub(crate) fn backtrack_store(&mut self, store: &mut StateStore, level: usize) {
        self.backtrack_domains(level);
        store.undo(level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate;

    #[test]
    fn posts_tighten_and_backtracking_restores() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(0, 10);

        solver.new_decision_level();
        assert_eq!(
            Ok(Tightening::Applied),
            solver.domains.post(predicate!(x != 0), PropositionalConjunction::default())
        );
        assert_eq!(
            Ok(Tightening::AlreadyEntailed),
            solver.domains.post(predicate!(x <= 12), PropositionalConjunction::default())
        );
        solver.assert_bounds(x, 1, 10);
        assert_eq!(
            Err(EmptyDomain),
            solver.domains.post(predicate!(x >= 11), PropositionalConjunction::default())
        );

        solver.backtrack_domains(0);
        solver.assert_bounds(x, 0, 10);
        assert_eq!(1, solver.num_posted());
    }

    #[test]
    fn new_literals_are_fresh_and_unassigned() {
        let mut solver = TestSolver::default();
        let first = solver.new_literal();
        let second = solver.new_literal();

        assert_ne!(first, second);
        assert_ne!(first, !second);
        assert!(first.is_positive() && second.is_positive());
        assert!(!first.is_true_literal() && !second.is_true_literal());
        assert_eq!(LiteralValue::Unset, solver.literal_value(first));

        solver.set_literal(first, true);
        assert_eq!(LiteralValue::True, solver.literal_value(first));
        assert_eq!(LiteralValue::Unset, solver.literal_value(second));
    }

    #[test]
    fn literal_posts_assign_the_literal() {
        let mut solver = TestSolver::default();
        let literal = solver.new_literal();

        solver.new_decision_level();
        assert_eq!(
            Ok(Tightening::Applied),
            solver
                .domains
                .post(Predicate::from(!literal), PropositionalConjunction::default())
        );
        assert_eq!(LiteralValue::False, solver.literal_value(literal));
        assert_eq!(
            Err(EmptyDomain),
            solver
                .domains
                .post(Predicate::from(literal), PropositionalConjunction::default())
        );

        solver.backtrack_domains(0);
        assert_eq!(LiteralValue::Unset, solver.literal_value(literal));
    }
}
