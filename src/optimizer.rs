//! The optimization pipeline: render, minimize, parse back, fold.

use crate::ast::Node;
use crate::boolean::{BooleanRenderer, parse_minimized};
use crate::error::{OptimizeError, Result};
use crate::fold::fold;
use crate::minimize::{Minimized, Minimizer, NativeMinimizer};
use crate::registry::{CsdlRegistry, Registry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Boolean minimization followed by folding.
    #[default]
    Minimize,
    /// Validate and fold only.
    FoldOnly,
}

/// Rewrites filter trees into equivalent, smaller trees.
///
/// An optimizer holds no per-call state and can be shared across threads.
pub struct Optimizer {
    registry: Box<dyn Registry>,
    minimizer: Box<dyn Minimizer>,
    mode: Mode,
}

impl Default for Optimizer {
    fn default() -> Self {
        Self::new(
            Box::new(CsdlRegistry::default()),
            Box::new(NativeMinimizer::default()),
        )
    }
}

impl Optimizer {
    pub fn new(registry: Box<dyn Registry>, minimizer: Box<dyn Minimizer>) -> Self {
        Self {
            registry,
            minimizer,
            mode: Mode::Minimize,
        }
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Optimize `tree`.
    ///
    /// Returns `Ok(None)` when no optimization applies: the tree has no
    /// boolean content, or is true under every assignment. A tree that can
    /// never match fails with [`OptimizeError::FalseExpression`].
    pub fn optimize(&self, tree: &Node) -> Result<Option<Node>> {
        let Some((expr, variables)) = BooleanRenderer::new(self.registry.as_ref()).render(tree)?
        else {
            return Ok(None);
        };

        if self.mode == Mode::FoldOnly {
            return Ok(Some(fold(tree.clone())));
        }

        let formula = expr.to_string();
        let minimized = self.minimizer.minimize(&formula).inspect_err(|err| {
            tracing::error!("Minimizer {} failed on {}: {}", self.minimizer.name(), formula, err)
        })?;

        let rebuilt = match minimized {
            Minimized::Tautology => {
                tracing::debug!("Formula is a tautology: {}", formula);
                return Ok(None);
            }
            Minimized::Contradiction => {
                tracing::debug!("Formula is a contradiction: {}", formula);
                return Err(OptimizeError::FalseExpression);
            }
            Minimized::Unminimized => {
                tracing::debug!(
                    "Minimizer {} skipped {}; folding only",
                    self.minimizer.name(),
                    formula
                );
                tree.clone()
            }
            Minimized::Expression(text) => {
                tracing::debug!("Minimized {} to {}", formula, text);
                parse_minimized(&text, &variables).inspect_err(|err| {
                    tracing::error!(
                        "Minimizer {} returned unparseable output {:?}: {}",
                        self.minimizer.name(),
                        text,
                        err
                    )
                })?
            }
        };

        Ok(Some(fold(rebuilt)))
    }
}
