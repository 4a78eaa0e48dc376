/// Options which influence how constraint definitions are built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstraintOptions {
    /// Order the elements of sums and objectives by descending absolute coefficient, so that
    /// propagation looks at the most influential terms first.
    pub sort_elements: bool,
}

impl Default for ConstraintOptions {
    fn default() -> Self {
        ConstraintOptions {
            sort_elements: true,
        }
    }
}
