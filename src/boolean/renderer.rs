//! Rendering of filter trees as boolean formulas.
//!
//! Each distinct atomic condition becomes a variable (`v1`, `v2`, ...) in
//! first-seen order. Conditions with the same canonical text share a variable.

use std::collections::HashMap;

use super::expr::BoolExpr;
use crate::ast::words::split_words;
use crate::ast::{Node, NodeKind, Triple, triple_of};
use crate::error::{OptimizeError, Result};
use crate::registry::Registry;
use crate::render::{CsdlWriter, condition_text};

/// A generated variable and the nodes it stands for.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    /// Canonical CSDL text of the atom.
    pub text: String,
    /// The condition or raw node.
    pub node: Node,
    /// The same atom wrapped in `not`.
    pub negated: Node,
}

/// Variables of one render, by name and by canonical text.
#[derive(Debug, Clone, Default)]
pub struct VariableMap {
    variables: Vec<Variable>,
    by_name: HashMap<String, usize>,
    by_text: HashMap<String, usize>,
}

impl VariableMap {
    /// Register an atom, reusing the variable of an identical one.
    pub fn register(&mut self, text: String, node: Node, negated: Node) -> String {
        if let Some(&idx) = self.by_text.get(&text) {
            return self.variables[idx].name.clone();
        }

        let idx = self.variables.len();
        let name = format!("v{}", idx + 1);
        self.by_name.insert(name.clone(), idx);
        self.by_text.insert(text.clone(), idx);
        self.variables.push(Variable {
            name: name.clone(),
            text,
            node,
            negated,
        });
        name
    }

    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.by_name.get(name).map(|&idx| &self.variables[idx])
    }

    pub fn name_of(&self, text: &str) -> Option<&str> {
        self.by_text
            .get(text)
            .map(|&idx| self.variables[idx].name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.variables.iter()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

/// Renders one filter tree. Owns the variable map for that call.
pub struct BooleanRenderer<'r> {
    writer: CsdlWriter<'r>,
    variables: VariableMap,
}

impl<'r> BooleanRenderer<'r> {
    pub fn new(registry: &'r dyn Registry) -> Self {
        Self {
            writer: CsdlWriter::new(registry),
            variables: VariableMap::default(),
        }
    }

    /// Render `node` as a formula.
    ///
    /// Returns `None` when the root is a terminal (target, operator,
    /// argument, string), which has no boolean meaning.
    pub fn render(mut self, node: &Node) -> Result<Option<(BoolExpr, VariableMap)>> {
        if node.kind().is_leaf() {
            return Ok(None);
        }
        let expr = self.expr(node)?;
        tracing::debug!(
            "Rendered formula over {} variables: {}",
            self.variables.len(),
            expr
        );
        Ok(Some((expr, self.variables)))
    }

    fn expr(&mut self, node: &Node) -> Result<BoolExpr> {
        match node {
            Node::And(children) => Ok(BoolExpr::And(self.join(NodeKind::And, children)?)),
            Node::Or(children) => Ok(BoolExpr::Or(self.join(NodeKind::Or, children)?)),
            Node::Not(children) => match children.first() {
                Some(Node::Target(_)) => Ok(BoolExpr::negate(self.triple(NodeKind::Not, children)?)),
                Some(child) => {
                    validate_child(NodeKind::Not, child)?;
                    Ok(BoolExpr::negate(self.expr(child)?))
                }
                None => Err(OptimizeError::malformed(NodeKind::Not, "no child nodes")),
            },
            Node::LogicalGroup(children) => {
                let child = children
                    .first()
                    .ok_or(OptimizeError::MissingChildNodes {
                        parent: NodeKind::LogicalGroup,
                        expected: 1,
                        found: 0,
                    })?;
                validate_child(NodeKind::LogicalGroup, child)?;
                self.expr(child)
            }
            Node::Condition(children) => self.triple(NodeKind::Condition, children),
            Node::Raw(text) => {
                let name = self.variables.register(
                    text.clone(),
                    node.clone(),
                    Node::Not(vec![node.clone()]),
                );
                Ok(BoolExpr::Var(name))
            }
            Node::Target(_) | Node::Operator(_) | Node::Argument(_) | Node::String(_) => Err(
                OptimizeError::malformed(node.kind(), "not a boolean expression"),
            ),
        }
    }

    fn join(&mut self, parent: NodeKind, children: &[Node]) -> Result<Vec<BoolExpr>> {
        if children.len() < 2 {
            return Err(OptimizeError::MissingChildNodes {
                parent,
                expected: 2,
                found: children.len(),
            });
        }
        children
            .iter()
            .map(|child| {
                validate_child(parent, child)?;
                self.expr(child)
            })
            .collect()
    }

    fn triple(&mut self, kind: NodeKind, children: &[Node]) -> Result<BoolExpr> {
        let triple = triple_of(children)
            .ok_or_else(|| OptimizeError::malformed(kind, "missing target or operator"))?;
        let text = self.writer.triple(triple)?;

        match (triple.operator, triple.argument) {
            ("contains_any" | "contains_all", Some(list)) => {
                let mut vars: Vec<BoolExpr> = split_words(list)
                    .iter()
                    .map(|word| self.contains_var(triple.target, word))
                    .collect();
                if vars.len() == 1 {
                    Ok(vars.remove(0))
                } else if triple.operator == "contains_any" {
                    Ok(BoolExpr::Or(vars))
                } else {
                    Ok(BoolExpr::And(vars))
                }
            }
            _ => Ok(BoolExpr::Var(self.register_triple(text, triple))),
        }
    }

    fn contains_var(&mut self, target: &str, word: &str) -> BoolExpr {
        let triple = Triple {
            target,
            operator: "contains",
            argument: Some(word),
        };
        let text = condition_text(target, "contains", Some(word));
        BoolExpr::Var(self.register_triple(text, triple))
    }

    fn register_triple(&mut self, text: String, triple: Triple<'_>) -> String {
        let children = Node::triple(triple.target, triple.operator, triple.argument);
        self.variables.register(
            text,
            Node::Condition(children.clone()),
            Node::Not(children),
        )
    }
}

fn validate_child(parent: NodeKind, child: &Node) -> Result<()> {
    if child.kind().is_leaf() {
        return Err(OptimizeError::InvalidChildNode {
            parent,
            child: child.kind(),
        });
    }
    Ok(())
}
