//! Boolean formulas over named variables.

use std::fmt;

/// A boolean formula. Renders as `And(v1, Or(v2, Not(v3)))`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoolExpr {
    Var(String),
    Not(Box<BoolExpr>),
    And(Vec<BoolExpr>),
    Or(Vec<BoolExpr>),
}

impl BoolExpr {
    pub fn var(name: &str) -> Self {
        BoolExpr::Var(name.to_string())
    }

    pub fn negate(expr: BoolExpr) -> Self {
        BoolExpr::Not(Box::new(expr))
    }

    /// Variable names in order of first appearance.
    pub fn variables(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_variables(&mut names);
        names
    }

    fn collect_variables<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            BoolExpr::Var(name) => {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
            BoolExpr::Not(inner) => inner.collect_variables(names),
            BoolExpr::And(items) | BoolExpr::Or(items) => {
                for item in items {
                    item.collect_variables(names);
                }
            }
        }
    }

    /// Evaluate with `value` giving each variable's truth.
    pub fn evaluate<F>(&self, value: &F) -> bool
    where
        F: Fn(&str) -> bool,
    {
        match self {
            BoolExpr::Var(name) => value(name),
            BoolExpr::Not(inner) => !inner.evaluate(value),
            BoolExpr::And(items) => items.iter().all(|item| item.evaluate(value)),
            BoolExpr::Or(items) => items.iter().any(|item| item.evaluate(value)),
        }
    }
}

impl fmt::Display for BoolExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoolExpr::Var(name) => write!(f, "{}", name),
            BoolExpr::Not(inner) => write!(f, "Not({})", inner),
            BoolExpr::And(items) => write_call(f, "And", items),
            BoolExpr::Or(items) => write_call(f, "Or", items),
        }
    }
}

fn write_call(f: &mut fmt::Formatter<'_>, name: &str, items: &[BoolExpr]) -> fmt::Result {
    write!(f, "{}(", name)?;
    for (idx, item) in items.iter().enumerate() {
        if idx > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    write!(f, ")")
}
