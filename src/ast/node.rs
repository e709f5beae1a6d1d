//! Node types for CSDL filter trees.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A node in a CSDL filter tree.
///
/// Nodes are plain owned values. Every pipeline stage builds new nodes
/// instead of mutating its input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    /// Two or more children ANDed together.
    And(Vec<Node>),

    /// Two or more children ORed together.
    Or(Vec<Node>),

    /// Negation: either a target/operator/argument triple, or a single
    /// condition, raw or logical_group child.
    Not(Vec<Node>),

    /// `target operator argument`, argument optional.
    Condition(Vec<Node>),

    /// Verbatim CSDL text.
    Raw(String),

    /// Parenthesized group with exactly one child.
    LogicalGroup(Vec<Node>),

    Target(String),
    Operator(String),
    Argument(Box<Node>),
    String(String),
}

/// Discriminant of a [`Node`], used in error messages and child checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    And,
    Or,
    Not,
    Condition,
    Raw,
    LogicalGroup,
    Target,
    Operator,
    Argument,
    String,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::And => "and",
            NodeKind::Or => "or",
            NodeKind::Not => "not",
            NodeKind::Condition => "condition",
            NodeKind::Raw => "raw",
            NodeKind::LogicalGroup => "logical_group",
            NodeKind::Target => "target",
            NodeKind::Operator => "operator",
            NodeKind::Argument => "argument",
            NodeKind::String => "string",
        };
        write!(f, "{}", name)
    }
}

impl NodeKind {
    /// Terminal kinds that may only appear inside a condition triple.
    pub fn is_leaf(self) -> bool {
        matches!(
            self,
            NodeKind::Target | NodeKind::Operator | NodeKind::Argument | NodeKind::String
        )
    }
}

/// Borrowed view of a target/operator/argument triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triple<'a> {
    pub target: &'a str,
    pub operator: &'a str,
    pub argument: Option<&'a str>,
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::And(_) => NodeKind::And,
            Node::Or(_) => NodeKind::Or,
            Node::Not(_) => NodeKind::Not,
            Node::Condition(_) => NodeKind::Condition,
            Node::Raw(_) => NodeKind::Raw,
            Node::LogicalGroup(_) => NodeKind::LogicalGroup,
            Node::Target(_) => NodeKind::Target,
            Node::Operator(_) => NodeKind::Operator,
            Node::Argument(_) => NodeKind::Argument,
            Node::String(_) => NodeKind::String,
        }
    }

    /// Build the children of a condition triple.
    pub fn triple(target: &str, operator: &str, argument: Option<&str>) -> Vec<Node> {
        let mut children = vec![
            Node::Target(target.to_string()),
            Node::Operator(operator.to_string()),
        ];
        if let Some(argument) = argument {
            children.push(Node::Argument(Box::new(Node::String(argument.to_string()))));
        }
        children
    }

    /// `target operator "argument"`
    pub fn condition(target: &str, operator: &str, argument: &str) -> Self {
        Node::Condition(Node::triple(target, operator, Some(argument)))
    }

    /// `NOT target operator "argument"`, with the triple held directly.
    pub fn not_condition(target: &str, operator: &str, argument: &str) -> Self {
        Node::Not(Node::triple(target, operator, Some(argument)))
    }

    pub fn and(children: Vec<Node>) -> Self {
        Node::And(children)
    }

    pub fn or(children: Vec<Node>) -> Self {
        Node::Or(children)
    }

    pub fn group(child: Node) -> Self {
        Node::LogicalGroup(vec![child])
    }

    pub fn raw(text: &str) -> Self {
        Node::Raw(text.to_string())
    }

    /// Child list of an interior node; empty for terminals.
    pub fn children(&self) -> &[Node] {
        match self {
            Node::And(children)
            | Node::Or(children)
            | Node::Not(children)
            | Node::Condition(children)
            | Node::LogicalGroup(children) => children,
            Node::Argument(child) => std::slice::from_ref(child.as_ref()),
            Node::Raw(_) | Node::Target(_) | Node::Operator(_) | Node::String(_) => &[],
        }
    }

    /// Whether a `not` node holds its triple directly rather than a child.
    pub fn is_triple_not(&self) -> bool {
        matches!(self, Node::Not(children) if matches!(children.first(), Some(Node::Target(_))))
    }

    /// Target/operator/argument of a condition or triple-holding not node.
    ///
    /// Returns `None` when the node has no triple or the triple lacks a
    /// target or operator.
    pub fn as_triple(&self) -> Option<Triple<'_>> {
        let children = match self {
            Node::Condition(children) => children,
            Node::Not(_) if self.is_triple_not() => self.children(),
            _ => return None,
        };
        triple_of(children)
    }
}

/// Find the target, operator and argument among triple children.
pub fn triple_of(children: &[Node]) -> Option<Triple<'_>> {
    let mut target = None;
    let mut operator = None;
    let mut argument = None;
    for child in children {
        match child {
            Node::Target(value) if target.is_none() => target = Some(value.as_str()),
            Node::Operator(value) if operator.is_none() => operator = Some(value.as_str()),
            Node::Argument(inner) if argument.is_none() => {
                if let Node::String(value) = inner.as_ref() {
                    argument = Some(value.as_str());
                }
            }
            _ => {}
        }
    }
    Some(Triple {
        target: target?,
        operator: operator?,
        argument,
    })
}
