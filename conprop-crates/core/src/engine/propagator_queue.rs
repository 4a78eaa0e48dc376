use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::collections::VecDeque;

use super::StateId;
use crate::conprop_assert_moderate;
use crate::containers::KeyedVec;
use crate::propagation::Priority;

/// The states waiting to be propagated, served by priority and first-in first-out within a
/// priority. A state is in the queue at most once.
#[derive(Debug, Clone)]
pub(crate) struct PropagatorQueue {
    queues: Vec<VecDeque<StateId>>,
    is_enqueued: KeyedVec<StateId, bool>,
    num_enqueued: usize,
    present_priorities: BinaryHeap<Reverse<u32>>,
}

impl Default for PropagatorQueue {
    fn default() -> Self {
        Self::new(4)
    }
}

impl PropagatorQueue {
    pub(crate) fn new(num_priority_levels: u32) -> PropagatorQueue {
        PropagatorQueue {
            queues: vec![VecDeque::new(); num_priority_levels as usize],
            is_enqueued: KeyedVec::default(),
            num_enqueued: 0,
            present_priorities: BinaryHeap::new(),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.num_enqueued == 0
    }

    pub(crate) fn len(&self) -> usize {
        self.num_enqueued
    }

    pub(crate) fn enqueue(&mut self, state_id: StateId, priority: Priority) {
        conprop_assert_moderate!((priority as usize) < self.queues.len());

        if self.is_enqueued(state_id) {
            return;
        }

        self.is_enqueued.accomodate(state_id, false);
        self.is_enqueued[state_id] = true;
        self.num_enqueued += 1;

        if self.queues[priority as usize].is_empty() {
            self.present_priorities.push(Reverse(priority as u32));
        }
        self.queues[priority as usize].push_back(state_id);
    }

    pub(crate) fn pop(&mut self) -> Option<StateId> {
        let top_priority = self.present_priorities.peek()?.0 as usize;
        conprop_assert_moderate!(!self.queues[top_priority].is_empty());

        let next_state_id = self.queues[top_priority].pop_front();

        if let Some(state_id) = next_state_id {
            self.is_enqueued[state_id] = false;
            self.num_enqueued -= 1;
        }

        if self.queues[top_priority].is_empty() {
            let _ = self.present_priorities.pop();
        }

        next_state_id
    }

    pub(crate) fn clear(&mut self) {
        while let Some(Reverse(priority)) = self.present_priorities.pop() {
            self.queues[priority as usize].clear();
        }

        for is_state_enqueued in self.is_enqueued.iter_mut() {
            *is_state_enqueued = false;
        }

        self.num_enqueued = 0;
    }

    pub(crate) fn is_enqueued(&self, state_id: StateId) -> bool {
        self.is_enqueued.get(state_id).copied().unwrap_or_default()
    }
}
