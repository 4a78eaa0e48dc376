//! The primitive identifiers shared with the external search loop and domain store.
mod int_var;
mod literal;

pub use int_var::IntVar;
pub use literal::Literal;
pub use literal::TRUE_LIT;

/// The type of coefficients, bounds, right-hand sides and variable values.
pub type Value = i32;

/// A weighted term `coefficient * variable`.
pub type CoVar = (Value, IntVar);

/// An ordered sequence of weighted terms.
pub type CoVarVec = Vec<CoVar>;
