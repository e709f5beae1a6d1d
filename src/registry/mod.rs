//! Operator and target registries.
//!
//! Rendering consults a [`Registry`] to reject operators and targets the
//! filter language doesn't know about.

mod operators;
mod targets;

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

pub use operators::{OPERATORS, is_operator};
pub use targets::{TARGETS, Target, is_tag_tree_target, lookup};

pub trait Registry: Send + Sync {
    fn is_valid_operator(&self, name: &str) -> bool;
    fn is_valid_target(&self, name: &str) -> bool;
}

/// Which filter kind the targets are checked for.
#[derive(Debug, Default, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Any known target.
    #[default]
    Generic,
    Interaction,
    Query,
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "generic" => Ok(Dialect::Generic),
            "interaction" => Ok(Dialect::Interaction),
            "query" => Ok(Dialect::Query),
            _ => Err(format!("invalid dialect: {value}")),
        }
    }
}

/// Registry backed by the built-in operator and target tables.
#[derive(Debug, Clone, Default)]
pub struct CsdlRegistry {
    dialect: Dialect,
    extra_targets: BTreeSet<String>,
}

impl CsdlRegistry {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            extra_targets: BTreeSet::new(),
        }
    }

    /// Accept additional target names regardless of dialect.
    pub fn with_extra_targets<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_targets
            .extend(targets.into_iter().map(Into::into));
        self
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }
}

impl Registry for CsdlRegistry {
    fn is_valid_operator(&self, name: &str) -> bool {
        is_operator(name)
    }

    fn is_valid_target(&self, name: &str) -> bool {
        if self.extra_targets.contains(name) {
            return true;
        }
        let known = lookup(name);
        match self.dialect {
            Dialect::Generic => known.is_some(),
            Dialect::Interaction => known.is_some_and(|t| t.interaction),
            Dialect::Query => known.is_some_and(|t| t.query) || is_tag_tree_target(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operators() {
        let registry = CsdlRegistry::default();
        assert!(registry.is_valid_operator("contains_any"));
        assert!(registry.is_valid_operator("cs =="));
        assert!(!registry.is_valid_operator("fake"));
    }

    #[test]
    fn test_dialects() {
        let generic = CsdlRegistry::new(Dialect::Generic);
        let interaction = CsdlRegistry::new(Dialect::Interaction);
        let query = CsdlRegistry::new(Dialect::Query);

        assert!(generic.is_valid_target("interaction.tags"));
        assert!(!interaction.is_valid_target("interaction.tags"));
        assert!(interaction.is_valid_target("interaction.content"));

        assert!(!query.is_valid_target("fb.topics.website"));
        assert!(query.is_valid_target("fb.topic_ids"));
        assert!(query.is_valid_target("interaction.tag_tree.foo"));
        assert!(!generic.is_valid_target("interaction.tag_tree.foo"));
    }

    #[test]
    fn test_extra_targets() {
        let registry = CsdlRegistry::new(Dialect::Interaction).with_extra_targets(["tumblr.content"]);
        assert!(registry.is_valid_target("tumblr.content"));
        assert!(!registry.is_valid_target("tumblr.title"));
    }

    #[test]
    fn test_dialect_from_str() {
        assert_eq!("Query".parse::<Dialect>(), Ok(Dialect::Query));
        assert!("other".parse::<Dialect>().is_err());
    }
}
