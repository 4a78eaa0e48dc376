use crate::containers::StorageKey;

/// An opaque handle to an integer variable whose domain is owned by the domain store.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IntVar {
    id: u32,
}

impl IntVar {
    pub const fn new(id: u32) -> Self {
        IntVar { id }
    }

    pub fn id(&self) -> u32 {
        self.id
    }
}

impl StorageKey for IntVar {
    fn index(&self) -> usize {
        self.id as usize
    }

    fn create_from_index(index: usize) -> Self {
        IntVar { id: index as u32 }
    }
}

impl std::fmt::Display for IntVar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "x{}", self.id)
    }
}

impl std::fmt::Debug for IntVar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "x{}", self.id)
    }
}
