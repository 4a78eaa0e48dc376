use std::iter::Rev;
use std::ops::Deref;
use std::vec::Drain;

use crate::conprop_assert_moderate;

/// An undo log partitioned by decision level.
///
/// The search loop does not announce new decision levels to every constraint state, so the trail
/// is aligned lazily: before recording an entry the owner calls [`Trail::align_to`] with the
/// level the entry belongs to.
#[derive(Clone, Debug)]
pub(crate) struct Trail<T> {
    current_level: usize,
    /// At index i is the position where the i-th decision level ends (exclusive) on the trail
    trail_delimiter: Vec<usize>,
    trail: Vec<T>,
}

// We explicitly implement the Default and not as a macro, because we want to avoid imposing Default
// on the generic type T.
impl<T> Default for Trail<T> {
    fn default() -> Self {
        Trail {
            current_level: Default::default(),
            trail_delimiter: Default::default(),
            trail: Default::default(),
        }
    }
}

impl<T> Trail<T> {
    pub(crate) fn new_level(&mut self) {
        self.current_level += 1;
        self.trail_delimiter.push(self.trail.len());
    }

    /// Opens levels until the trail is at `level`. Levels which are skipped stay empty.
    pub(crate) fn align_to(&mut self, level: usize) {
        conprop_assert_moderate!(
            level >= self.current_level,
            "aligning to level {level} requires backtracking from {} first",
            self.current_level
        );
        while self.current_level < level {
            self.new_level();
        }
    }

    /// Removes every entry recorded above `new_level`, most recent first. Backtracking to a level
    /// at or above the current one drains nothing.
    pub(crate) fn synchronise(&mut self, new_level: usize) -> Rev<Drain<'_, T>> {
        let new_trail_len = if new_level < self.current_level {
            let new_trail_len = self.trail_delimiter[new_level];
            self.current_level = new_level;
            self.trail_delimiter.truncate(new_level);
            new_trail_len
        } else {
            self.trail.len()
        };

        self.trail.drain(new_trail_len..).rev()
    }

    pub(crate) fn push(&mut self, elem: T) {
        self.trail.push(elem)
    }
}

impl<T> Deref for Trail<T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        &self.trail
    }
}
