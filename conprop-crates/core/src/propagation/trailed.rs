use crate::basic_types::Trail;
use crate::containers::KeyedVec;
use crate::containers::StorageKey;

/// A handle to an integer whose writes are undone on backtracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TrailedInteger {
    id: u32,
}

impl StorageKey for TrailedInteger {
    fn index(&self) -> usize {
        self.id as usize
    }

    fn create_from_index(index: usize) -> Self {
        Self { id: index as u32 }
    }
}

#[derive(Debug, Clone)]
struct TrailedChange<T> {
    old_value: T,
    reference: TrailedInteger,
}

/// The backtrackable integers of a single constraint state.
///
/// Writes are recorded at the decision level given by the caller; [`TrailedValues::synchronise`]
/// restores the values they had at an earlier level.
#[derive(Debug, Clone)]
pub(crate) struct TrailedValues<T = i64> {
    trail: Trail<TrailedChange<T>>,
    values: KeyedVec<TrailedInteger, T>,
}

impl<T> Default for TrailedValues<T> {
    fn default() -> Self {
        TrailedValues {
            trail: Trail::default(),
            values: KeyedVec::default(),
        }
    }
}

impl<T: Copy + PartialEq> TrailedValues<T> {
    pub(crate) fn grow(&mut self, initial_value: T) -> TrailedInteger {
        self.values.push(initial_value)
    }

    pub(crate) fn read(&self, trailed_integer: TrailedInteger) -> T {
        self.values[trailed_integer]
    }

    pub(crate) fn synchronise(&mut self, new_level: usize) {
        self.trail
            .synchronise(new_level)
            .for_each(|state_change| self.values[state_change.reference] = state_change.old_value)
    }

    /// Overwrites the value without recording the change; only valid before any level has been
    /// opened, e.g. while (re)initialising a state.
    pub(crate) fn reset(&mut self, trailed_integer: TrailedInteger, value: T) {
        self.values[trailed_integer] = value;
    }

    pub(crate) fn assign(&mut self, trailed_integer: TrailedInteger, value: T, level: usize) {
        let old_value = self.values[trailed_integer];
        if old_value == value {
            return;
        }
        self.trail.align_to(level);
        let entry = TrailedChange {
            old_value,
            reference: trailed_integer,
        };
        self.trail.push(entry);
        self.values[trailed_integer] = value;
    }
}

impl<T: Copy + PartialEq + std::ops::Add<Output = T>> TrailedValues<T> {
    pub(crate) fn add_assign(&mut self, trailed_integer: TrailedInteger, addition: T, level: usize) {
        self.assign(trailed_integer, self.values[trailed_integer] + addition, level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_resets() {
        let mut assignments = TrailedValues::<i64>::default();
        let trailed_integer = assignments.grow(0);

        assert_eq!(assignments.read(trailed_integer), 0);

        assignments.add_assign(trailed_integer, 5, 1);

        assert_eq!(assignments.read(trailed_integer), 5);

        assignments.add_assign(trailed_integer, 5, 1);
        assert_eq!(assignments.read(trailed_integer), 10);

        assignments.add_assign(trailed_integer, 1, 2);

        assert_eq!(assignments.read(trailed_integer), 11);

        assignments.synchronise(1);
        assert_eq!(assignments.read(trailed_integer), 10);

        assignments.synchronise(0);
        assert_eq!(assignments.read(trailed_integer), 0);
    }

    #[test]
    fn skipped_levels_are_restored_together() {
        let mut values = TrailedValues::<i128>::default();
        let a = values.grow(1);
        let b = values.grow(2);

        values.assign(a, 10, 3);
        values.assign(b, 20, 7);

        values.synchronise(5);
        assert_eq!(10, values.read(a));
        assert_eq!(2, values.read(b));

        values.synchronise(2);
        assert_eq!(1, values.read(a));
    }

    #[test]
    fn root_level_writes_survive_backtracking() {
        let mut values = TrailedValues::<i64>::default();
        let a = values.grow(0);

        values.assign(a, 4, 0);
        values.assign(a, 6, 1);
        values.synchronise(0);

        assert_eq!(4, values.read(a));
    }
}
