//! Two-level minimization of boolean formulas.
//!
//! A [`Minimizer`] takes formula text over `v1`, `v2`, ... and returns an
//! equivalent, smaller formula in the same grammar, or reports that the
//! formula is constant.

mod cube;
mod native;
mod process;

pub use native::NativeMinimizer;
pub use process::ProcessMinimizer;

use crate::error::Result;

/// Outcome of minimizing one formula.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Minimized {
    /// An equivalent formula (`And`, `Or`, `Not` over the input variables).
    Expression(String),
    /// True under every assignment.
    Tautology,
    /// False under every assignment.
    Contradiction,
    /// The formula is beyond what the minimizer handles; use it as given.
    Unminimized,
}

pub trait Minimizer: Send + Sync {
    fn name(&self) -> &'static str;

    fn minimize(&self, formula: &str) -> Result<Minimized>;
}
