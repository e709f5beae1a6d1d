//! Error types for the optimization pipeline.

use std::time::Duration;
use thiserror::Error;

use crate::ast::NodeKind;

pub type Result<T, E = OptimizeError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum OptimizeError {
    #[error(":{parent} nodes must contain at least {expected} child nodes. Expected >= {expected}, got {found}")]
    MissingChildNodes {
        parent: NodeKind,
        expected: usize,
        found: usize,
    },

    #[error(":{parent} cannot have :{child} as a child")]
    InvalidChildNode { parent: NodeKind, child: NodeKind },

    #[error("Operator {0} is unknown")]
    UnknownOperator(String),

    #[error("Target '{0}' is not a known target type")]
    UnknownTarget(String),

    #[error("Malformed :{kind} node: {message}")]
    MalformedNode { kind: NodeKind, message: String },

    /// The filter is a contradiction and can never match.
    #[error("Filter can never match: the expression is always false")]
    FalseExpression,

    #[error("Minimizer failed: {0}")]
    MinimizerFailure(String),

    #[error("Minimizer did not finish within {0:?}")]
    MinimizerTimeout(Duration),

    #[error("Cannot parse minimized expression at offset {offset}: {message}")]
    Parse { offset: usize, message: String },
}

impl OptimizeError {
    pub fn parse(offset: usize, message: impl Into<String>) -> Self {
        OptimizeError::Parse {
            offset,
            message: message.into(),
        }
    }

    pub fn malformed(kind: NodeKind, message: impl Into<String>) -> Self {
        OptimizeError::MalformedNode {
            kind,
            message: message.into(),
        }
    }

    /// Errors caused by the filter itself, as opposed to minimizer defects.
    pub fn is_filter_error(&self) -> bool {
        match self {
            OptimizeError::MissingChildNodes { .. }
            | OptimizeError::InvalidChildNode { .. }
            | OptimizeError::UnknownOperator(_)
            | OptimizeError::UnknownTarget(_)
            | OptimizeError::MalformedNode { .. }
            | OptimizeError::FalseExpression => true,
            OptimizeError::MinimizerFailure(_)
            | OptimizeError::MinimizerTimeout(_)
            | OptimizeError::Parse { .. } => false,
        }
    }
}
