//! Boolean view of filter trees.
//!
//! A tree is rendered to a formula over generated variables, and a
//! minimized formula is parsed back into a tree:
//!
//!   And(v1, Or(v2, Not(v3)))   - function names are case-insensitive
//!   v1, v2, ...                - one per distinct atomic condition

mod expr;
mod lexer;
mod parser;
mod renderer;

pub use expr::BoolExpr;
pub use parser::{parse_formula, parse_minimized};
pub use renderer::{BooleanRenderer, Variable, VariableMap};
