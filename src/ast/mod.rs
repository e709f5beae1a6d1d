//! CSDL filter trees.
//!
//! A tree is built from the closed node set:
//!   and, or                 - two or more children
//!   not                     - target/operator/argument triple, or one child
//!   condition               - target, operator, optional argument
//!   logical_group           - one parenthesized child
//!   raw                     - verbatim CSDL text
//!   target, operator,
//!   argument, string        - terminals of a triple

mod eval;
mod node;
pub mod words;

pub use eval::{collect_atoms, evaluate_filter};
pub use node::*;
