//! Optimization of CSDL filter trees.
//!
//! A filter tree is rendered as a boolean formula, minimized to a
//! two-level form, parsed back into a tree, and folded so that repeated
//! `contains` conditions on one target become a single `contains_any` or
//! `contains_all` condition.
//!
//! ```
//! use csdl::{Node, Optimizer};
//!
//! let tree = Node::or(vec![
//!     Node::condition("fb.content", "contains", "apple"),
//!     Node::condition("fb.content", "contains", "book"),
//! ]);
//! let optimized = Optimizer::default().optimize(&tree).unwrap();
//! assert_eq!(
//!     optimized,
//!     Some(Node::condition("fb.content", "contains_any", "apple,book"))
//! );
//! ```

pub mod ast;
pub mod boolean;
pub mod config;
pub mod error;
pub mod fold;
pub mod minimize;
pub mod optimizer;
pub mod registry;
pub mod render;

pub use ast::{Node, NodeKind};
pub use config::OptimizerConfig;
pub use error::{OptimizeError, Result};
pub use minimize::{Minimized, Minimizer, NativeMinimizer, ProcessMinimizer};
pub use optimizer::{Mode, Optimizer};
pub use registry::{CsdlRegistry, Dialect, Registry};
pub use render::CsdlWriter;
