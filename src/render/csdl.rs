//! CSDL text writer.

use crate::ast::{Node, NodeKind, Triple, triple_of};
use crate::error::{OptimizeError, Result};
use crate::registry::Registry;

/// Quote a string argument, escaping inner double quotes.
pub fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\\\""))
}

/// Canonical text of a condition, without registry checks.
pub fn condition_text(target: &str, operator: &str, argument: Option<&str>) -> String {
    match argument {
        Some(argument) => format!("{} {} {}", target, operator, quote(argument)),
        None => format!("{} {}", target, operator),
    }
}

/// Writes filter trees as CSDL, validating targets and operators.
pub struct CsdlWriter<'r> {
    registry: &'r dyn Registry,
}

impl<'r> CsdlWriter<'r> {
    pub fn new(registry: &'r dyn Registry) -> Self {
        Self { registry }
    }

    pub fn write(&self, node: &Node) -> Result<String> {
        match node {
            Node::And(children) => self.join("AND", NodeKind::And, children),
            Node::Or(children) => self.join("OR", NodeKind::Or, children),
            Node::Argument(child) => self.write(child),
            Node::Condition(children) => self.condition(NodeKind::Condition, children),
            Node::LogicalGroup(children) => {
                if children.is_empty() {
                    return Err(OptimizeError::MissingChildNodes {
                        parent: NodeKind::LogicalGroup,
                        expected: 1,
                        found: 0,
                    });
                }
                let parts = children
                    .iter()
                    .map(|child| self.write(child))
                    .collect::<Result<Vec<_>>>()?;
                Ok(format!("({})", parts.join(" ")))
            }
            Node::Not(children) => match children.first() {
                Some(Node::Target(_)) => {
                    Ok(format!("NOT {}", self.condition(NodeKind::Not, children)?))
                }
                Some(child) => Ok(format!("NOT {}", self.write(child)?)),
                None => Err(OptimizeError::malformed(NodeKind::Not, "no child nodes")),
            },
            Node::Operator(name) => self.operator(name).map(str::to_string),
            Node::Raw(text) => Ok(text.clone()),
            Node::String(value) => Ok(quote(value)),
            Node::Target(name) => self.target(name).map(str::to_string),
        }
    }

    /// Canonical text of a triple, after registry checks.
    pub fn triple(&self, triple: Triple<'_>) -> Result<String> {
        let target = self.target(triple.target)?;
        let operator = self.operator(triple.operator)?;
        Ok(condition_text(target, operator, triple.argument))
    }

    fn condition(&self, kind: NodeKind, children: &[Node]) -> Result<String> {
        let triple = triple_of(children)
            .ok_or_else(|| OptimizeError::malformed(kind, "missing target or operator"))?;
        self.triple(triple)
    }

    fn target<'a>(&self, name: &'a str) -> Result<&'a str> {
        if self.registry.is_valid_target(name) {
            Ok(name)
        } else {
            Err(OptimizeError::UnknownTarget(name.to_string()))
        }
    }

    fn operator<'a>(&self, name: &'a str) -> Result<&'a str> {
        if self.registry.is_valid_operator(name) {
            Ok(name)
        } else {
            Err(OptimizeError::UnknownOperator(name.to_string()))
        }
    }

    fn join(&self, keyword: &str, parent: NodeKind, children: &[Node]) -> Result<String> {
        if children.len() < 2 {
            return Err(OptimizeError::MissingChildNodes {
                parent,
                expected: 2,
                found: children.len(),
            });
        }
        let parts = children
            .iter()
            .map(|child| self.write(child))
            .collect::<Result<Vec<_>>>()?;
        Ok(parts.join(&format!(" {} ", keyword)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::CsdlRegistry;

    fn write(node: &Node) -> Result<String> {
        let registry = CsdlRegistry::default();
        CsdlWriter::new(&registry).write(node)
    }

    #[test]
    fn test_condition() {
        let node = Node::condition("fb.content", "contains_any", "foo");
        assert_eq!(write(&node).unwrap(), r#"fb.content contains_any "foo""#);
    }

    #[test]
    fn test_string_with_quotes() {
        assert_eq!(
            write(&Node::String(r#"foo "bar" baz"#.into())).unwrap(),
            r#""foo \"bar\" baz""#
        );
    }

    #[test]
    fn test_grouped_expressions() {
        let node = Node::or(vec![
            Node::group(Node::and(vec![
                Node::condition("fb.content", "contains", "a"),
                Node::not_condition("fb.parent.content", "contains", "b"),
            ])),
            Node::raw(r#"links.domain == "x""#),
        ]);
        assert_eq!(
            write(&node).unwrap(),
            r#"(fb.content contains "a" AND NOT fb.parent.content contains "b") OR links.domain == "x""#
        );
    }

    #[test]
    fn test_not_with_logical_group() {
        let node = Node::Not(vec![Node::group(Node::condition("fb.content", "exists", "x"))]);
        assert_eq!(write(&node).unwrap(), r#"NOT (fb.content exists "x")"#);
    }

    #[test]
    fn test_and_with_one_child() {
        let node = Node::and(vec![Node::condition("fb.content", "contains", "a")]);
        assert!(matches!(
            write(&node),
            Err(OptimizeError::MissingChildNodes { found: 1, .. })
        ));
    }

    #[test]
    fn test_invalid_operator_and_target() {
        assert!(matches!(
            write(&Node::condition("fb.content", "fake", "a")),
            Err(OptimizeError::UnknownOperator(op)) if op == "fake"
        ));
        assert!(matches!(
            write(&Node::condition("fake.target", "contains", "a")),
            Err(OptimizeError::UnknownTarget(target)) if target == "fake.target"
        ));
    }
}
