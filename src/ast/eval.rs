//! Truth evaluation of filter trees over atomic conditions.

use super::node::{Node, Triple};
use super::words::split_words;
use crate::render::condition_text;
use std::collections::{BTreeSet, HashSet};

/// Evaluate a filter tree given the atoms that hold.
///
/// An atom is the canonical text of a condition. `contains_any` and
/// `contains_all` are word lists: they stand for the `contains` atom of each
/// word, ORed or ANDed.
pub fn evaluate_filter(node: &Node, truths: &HashSet<String>) -> bool {
    match node {
        Node::And(children) => children.iter().all(|c| evaluate_filter(c, truths)),
        Node::Or(children) => children.iter().any(|c| evaluate_filter(c, truths)),
        Node::LogicalGroup(children) => children
            .first()
            .is_some_and(|c| evaluate_filter(c, truths)),
        Node::Not(children) => {
            if let Some(triple) = node.as_triple() {
                !evaluate_triple(triple, truths)
            } else {
                !children
                    .first()
                    .is_some_and(|c| evaluate_filter(c, truths))
            }
        }
        Node::Condition(_) => node
            .as_triple()
            .is_some_and(|triple| evaluate_triple(triple, truths)),
        Node::Raw(text) => truths.contains(text),
        Node::Target(_) | Node::Operator(_) | Node::Argument(_) | Node::String(_) => false,
    }
}

fn evaluate_triple(triple: Triple<'_>, truths: &HashSet<String>) -> bool {
    match (triple.operator, triple.argument) {
        ("contains_any", Some(list)) => split_words(list)
            .iter()
            .any(|word| truths.contains(&contains_atom(triple.target, word))),
        ("contains_all", Some(list)) => split_words(list)
            .iter()
            .all(|word| truths.contains(&contains_atom(triple.target, word))),
        (operator, argument) => truths.contains(&condition_text(triple.target, operator, argument)),
    }
}

fn contains_atom(target: &str, word: &str) -> String {
    condition_text(target, "contains", Some(word))
}

/// Collect every atom a tree refers to.
pub fn collect_atoms(node: &Node) -> BTreeSet<String> {
    let mut atoms = BTreeSet::new();
    collect_into(node, &mut atoms);
    atoms
}

fn collect_into(node: &Node, atoms: &mut BTreeSet<String>) {
    if let Some(triple) = node.as_triple() {
        match (triple.operator, triple.argument) {
            ("contains_any" | "contains_all", Some(list)) => {
                for word in split_words(list) {
                    atoms.insert(contains_atom(triple.target, &word));
                }
            }
            (operator, argument) => {
                atoms.insert(condition_text(triple.target, operator, argument));
            }
        }
        return;
    }

    match node {
        Node::Raw(text) => {
            atoms.insert(text.clone());
        }
        other => {
            for child in other.children() {
                collect_into(child, atoms);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn truths(atoms: &[&str]) -> HashSet<String> {
        atoms.iter().map(|a| a.to_string()).collect()
    }

    #[test]
    fn test_condition() {
        let node = Node::condition("fb.content", "contains", "apple");
        assert!(evaluate_filter(&node, &truths(&[r#"fb.content contains "apple""#])));
        assert!(!evaluate_filter(&node, &truths(&[])));
    }

    #[test]
    fn test_contains_any_and_all() {
        let any = Node::condition("fb.content", "contains_any", "apple,book");
        let all = Node::condition("fb.content", "contains_all", "apple,book");
        let only_book = truths(&[r#"fb.content contains "book""#]);
        assert!(evaluate_filter(&any, &only_book));
        assert!(!evaluate_filter(&all, &only_book));
    }

    #[test]
    fn test_not_forms() {
        let direct = Node::not_condition("fb.content", "contains", "apple");
        let wrapped = Node::Not(vec![Node::group(Node::condition(
            "fb.content",
            "contains",
            "apple",
        ))]);
        let empty = truths(&[]);
        assert!(evaluate_filter(&direct, &empty));
        assert!(evaluate_filter(&wrapped, &empty));
    }

    #[test]
    fn test_collect_atoms_expands_lists() {
        let node = Node::or(vec![
            Node::condition("fb.content", "contains_any", "apple,book"),
            Node::raw("links.domain == \"x\""),
        ]);
        let atoms: Vec<String> = collect_atoms(&node).into_iter().collect();
        assert_eq!(
            atoms,
            vec![
                r#"fb.content contains "apple""#.to_string(),
                r#"fb.content contains "book""#.to_string(),
                "links.domain == \"x\"".to_string(),
            ]
        );
    }
}
