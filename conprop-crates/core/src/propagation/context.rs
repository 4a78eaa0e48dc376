use super::DomainStore;
use super::EmptyDomain;
use super::LiteralValue;
use super::ReadDomains;
use super::SearchLoop;
use super::Tightening;
use crate::predicates::Predicate;
use crate::predicates::PropositionalConjunction;
use crate::variables::IntVar;
use crate::variables::Literal;
use crate::variables::Value;

/// [`PropagationContext`] is passed to states during attachment, notification and checks. It
/// may be queried to retrieve information about the current variable domains and the search
/// loop, but it cannot be used to change anything.
#[derive(Clone, Copy)]
pub struct PropagationContext<'a> {
    domains: &'a dyn DomainStore,
    search: &'a dyn SearchLoop,
}

impl<'a> PropagationContext<'a> {
    pub fn new(domains: &'a dyn DomainStore, search: &'a dyn SearchLoop) -> Self {
        PropagationContext { domains, search }
    }

    pub fn literal_value(&self, literal: Literal) -> LiteralValue {
        if literal.is_true_literal() {
            LiteralValue::True
        } else {
            self.search.literal_value(literal)
        }
    }

    pub fn decision_level(&self) -> usize {
        self.search.decision_level()
    }

    pub fn objective_bound(&self) -> Option<i64> {
        self.search.objective_bound()
    }
}

impl ReadDomains for PropagationContext<'_> {
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

impl std::fmt::Debug for PropagationContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropagationContext")
            .field("decision_level", &self.decision_level())
            .finish_non_exhaustive()
    }
}

/// [`PropagationContextMut`] is passed to states during propagation; besides reading, it can post
/// tightenings to the domain store.
pub struct PropagationContextMut<'a> {
    domains: &'a mut dyn DomainStore,
    search: &'a dyn SearchLoop,
}

impl<'a> PropagationContextMut<'a> {
    pub fn new(domains: &'a mut dyn DomainStore, search: &'a dyn SearchLoop) -> Self {
        PropagationContextMut { domains, search }
    }

    pub fn as_readonly(&self) -> PropagationContext<'_> {
        PropagationContext {
            domains: &*self.domains,
            search: self.search,
        }
    }

    pub fn literal_value(&self, literal: Literal) -> LiteralValue {
        self.as_readonly().literal_value(literal)
    }

    pub fn decision_level(&self) -> usize {
        self.search.decision_level()
    }

    pub fn objective_bound(&self) -> Option<i64> {
        self.search.objective_bound()
    }

    /// Proposes `predicate` to the domain store with `reason` as its justification.
    pub fn post(
        &mut self,
        predicate: Predicate,
        reason: PropositionalConjunction,
    ) -> Result<Tightening, EmptyDomain> {
        self.domains.post(predicate, reason)
    }
}

impl ReadDomains for PropagationContextMut<'_> {
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

impl std::fmt::Debug for PropagationContextMut<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropagationContextMut")
            .field("decision_level", &self.decision_level())
            .finish_non_exhaustive()
    }
}
