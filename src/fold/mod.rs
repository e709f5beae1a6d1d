//! Condition folding.
//!
//! A bottom-up rewrite that merges `contains` family conditions on the same
//! target into one `contains_any` / `contains_all` condition:
//!
//!   a contains "x" AND a contains "y"          -> a contains_all "x,y"
//!   NOT a contains "x" AND NOT a contains "y"  -> NOT a contains_any "x,y"
//!
//! Nested groups of the same connective are inlined first, and negated
//! groups are pushed inward with De Morgan's laws.

use crate::ast::words::{escape, split_unescaped, unescape};
use crate::ast::{Node, Triple};

const CONTAINS: &str = "contains";
const CONTAINS_ANY: &str = "contains_any";
const CONTAINS_ALL: &str = "contains_all";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Connective {
    And,
    Or,
}

impl Connective {
    fn of(node: &Node) -> Option<Self> {
        match node {
            Node::And(_) => Some(Connective::And),
            Node::Or(_) => Some(Connective::Or),
            _ => None,
        }
    }

    fn flip(self) -> Self {
        match self {
            Connective::And => Connective::Or,
            Connective::Or => Connective::And,
        }
    }

    fn wrap(self, children: Vec<Node>) -> Node {
        match self {
            Connective::And => Node::And(children),
            Connective::Or => Node::Or(children),
        }
    }

    /// Operator that merges several words of one polarity under this connective.
    fn merge_operator(self, polarity: Polarity) -> &'static str {
        match (self, polarity) {
            (Connective::And, Polarity::Plain) | (Connective::Or, Polarity::Negated) => {
                CONTAINS_ALL
            }
            (Connective::And, Polarity::Negated) | (Connective::Or, Polarity::Plain) => {
                CONTAINS_ANY
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Polarity {
    Plain,
    Negated,
}

impl Polarity {
    fn build(self, children: Vec<Node>) -> Node {
        match self {
            Polarity::Plain => Node::Condition(children),
            Polarity::Negated => Node::Not(children),
        }
    }
}

/// Words collected for one (target, polarity, operator) key.
///
/// Words are stored list-encoded: commas inside a word are escaped.
#[derive(Debug)]
struct Bucket {
    target: String,
    polarity: Polarity,
    operator: &'static str,
    words: Vec<String>,
}

impl Bucket {
    fn into_node(mut self) -> Node {
        self.words.sort();
        self.words.dedup();
        let (operator, argument) = if self.words.len() == 1 {
            (CONTAINS, unescape(&self.words[0]))
        } else {
            (self.operator, self.words.join(","))
        };
        self.polarity
            .build(Node::triple(&self.target, operator, Some(argument.as_str())))
    }
}

/// Fold a filter tree.
pub fn fold(node: Node) -> Node {
    match node {
        Node::And(children) => fold_connective(Connective::And, children),
        Node::Or(children) => fold_connective(Connective::Or, children),
        Node::LogicalGroup(children) => fold_group(children),
        not @ Node::Not(_) if not.is_triple_not() => degrade(not),
        Node::Not(children) => fold_not(children),
        condition @ Node::Condition(_) => degrade(condition),
        other => other,
    }
}

fn fold_connective(connective: Connective, children: Vec<Node>) -> Node {
    let mut flat = Vec::with_capacity(children.len());
    for child in children.into_iter().map(fold) {
        let same = Connective::of(&child) == Some(connective);
        match child {
            Node::And(inner) | Node::Or(inner) if same => flat.extend(inner),
            Node::LogicalGroup(mut inner)
                if inner.len() == 1 && Connective::of(&inner[0]) == Some(connective) =>
            {
                match inner.remove(0) {
                    Node::And(grand) | Node::Or(grand) => flat.extend(grand),
                    other => flat.push(other),
                }
            }
            other => flat.push(other),
        }
    }

    let mut results = Vec::new();
    let mut buckets: Vec<Bucket> = Vec::new();
    for child in flat {
        let Some((polarity, triple)) = foldable(&child) else {
            results.push(child);
            continue;
        };
        let operator = connective.merge_operator(polarity);
        if triple.operator != CONTAINS && triple.operator != operator {
            results.push(child);
            continue;
        }
        let words = list_words(&triple);
        // A trailing backslash would escape the separator after it.
        if words.iter().any(|word| word.ends_with('\\')) {
            results.push(child);
            continue;
        }
        match buckets.iter_mut().find(|b| {
            b.target == triple.target && b.polarity == polarity && b.operator == operator
        }) {
            Some(bucket) => bucket.words.extend(words),
            None => buckets.push(Bucket {
                target: triple.target.to_string(),
                polarity,
                operator,
                words,
            }),
        }
    }

    // Buckets are grouped by target, then by polarity, in first-seen order.
    let ranks: Vec<(usize, usize)> = buckets
        .iter()
        .map(|bucket| {
            let target = buckets.iter().position(|b| b.target == bucket.target);
            let polarity = buckets
                .iter()
                .position(|b| b.target == bucket.target && b.polarity == bucket.polarity);
            (target.unwrap_or(0), polarity.unwrap_or(0))
        })
        .collect();
    let mut ranked: Vec<(usize, usize, Bucket)> = ranks
        .into_iter()
        .zip(buckets)
        .map(|((target, polarity), bucket)| (target, polarity, bucket))
        .collect();
    ranked.sort_by_key(|(target, polarity, _)| (*target, *polarity));
    results.extend(ranked.into_iter().map(|(_, _, bucket)| bucket.into_node()));

    if results.len() == 1 {
        results.remove(0)
    } else {
        connective.wrap(results)
    }
}

fn fold_group(mut children: Vec<Node>) -> Node {
    if children.len() != 1 {
        return Node::LogicalGroup(children);
    }
    match fold(children.remove(0)) {
        inner @ (Node::And(_) | Node::Or(_)) => Node::group(inner),
        other => other,
    }
}

fn fold_not(mut children: Vec<Node>) -> Node {
    if children.len() != 1 {
        return Node::Not(children);
    }
    match fold(children.remove(0)) {
        Node::And(items) => distribute(Connective::And, items),
        Node::Or(items) => distribute(Connective::Or, items),
        Node::LogicalGroup(mut inner)
            if inner.len() == 1 && Connective::of(&inner[0]).is_some() =>
        {
            match inner.remove(0) {
                Node::And(items) => distribute(Connective::And, items),
                Node::Or(items) => distribute(Connective::Or, items),
                other => negate(other),
            }
        }
        other => negate(other),
    }
}

/// `NOT (a AND b)` -> `(NOT a OR NOT b)`
fn distribute(connective: Connective, items: Vec<Node>) -> Node {
    let negated = items
        .into_iter()
        .map(|item| fold(Node::Not(vec![item])))
        .collect();
    match fold_connective(connective.flip(), negated) {
        inner @ (Node::And(_) | Node::Or(_)) => Node::group(inner),
        other => other,
    }
}

/// Negate a folded node that is not a connective.
fn negate(node: Node) -> Node {
    match node {
        Node::Condition(children) => Node::Not(children),
        Node::Not(children) if matches!(children.first(), Some(Node::Target(_))) => {
            Node::Condition(children)
        }
        Node::Not(mut children) if children.len() == 1 => children.remove(0),
        other => Node::Not(vec![other]),
    }
}

/// `contains_any "foo"` -> `contains "foo"`
fn degrade(node: Node) -> Node {
    let Some((polarity, triple)) = foldable(&node) else {
        return node;
    };
    if triple.operator == CONTAINS {
        return node;
    }
    let words = list_words(&triple);
    if words.len() != 1 {
        return node;
    }
    polarity.build(Node::triple(triple.target, CONTAINS, Some(unescape(&words[0]).as_str())))
}

/// Polarity and triple of a `contains` family condition with an argument.
fn foldable(node: &Node) -> Option<(Polarity, Triple<'_>)> {
    let polarity = match node {
        Node::Condition(_) => Polarity::Plain,
        Node::Not(_) if node.is_triple_not() => Polarity::Negated,
        _ => return None,
    };
    let triple = node.as_triple()?;
    triple.argument?;
    matches!(triple.operator, CONTAINS | CONTAINS_ANY | CONTAINS_ALL).then_some((polarity, triple))
}

fn list_words(triple: &Triple<'_>) -> Vec<String> {
    let argument = triple.argument.unwrap_or_default();
    if triple.operator == CONTAINS {
        vec![escape(argument)]
    } else {
        split_unescaped(argument)
            .into_iter()
            .map(String::from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn contains(target: &str, op: &str, arg: &str) -> Node {
        Node::condition(target, op, arg)
    }

    fn not_contains(target: &str, op: &str, arg: &str) -> Node {
        Node::not_condition(target, op, arg)
    }

    #[test]
    fn test_anded_contains_become_contains_all() {
        let tree = Node::and(vec![
            contains("fb.content", "contains", "apple"),
            contains("interaction.content", "contains", "apple"),
            contains("tumblr.content", "contains", "cat"),
            contains("fb.content", "contains", "book"),
            contains("interaction.content", "contains", "book"),
        ]);
        assert_eq!(
            fold(tree),
            Node::and(vec![
                contains("fb.content", "contains_all", "apple,book"),
                contains("interaction.content", "contains_all", "apple,book"),
                contains("tumblr.content", "contains", "cat"),
            ])
        );
    }

    #[test]
    fn test_anded_not_contains_become_not_contains_any() {
        let tree = Node::and(vec![
            not_contains("fb.content", "contains", "book"),
            not_contains("fb.content", "contains", "apple"),
        ]);
        assert_eq!(
            fold(tree),
            not_contains("fb.content", "contains_any", "apple,book")
        );
    }

    #[test]
    fn test_ored_forms() {
        let tree = Node::or(vec![
            contains("fb.content", "contains", "apple"),
            not_contains("fb.content", "contains", "cat"),
            contains("fb.content", "contains", "book"),
            not_contains("fb.content", "contains", "eye"),
        ]);
        assert_eq!(
            fold(tree),
            Node::or(vec![
                contains("fb.content", "contains_any", "apple,book"),
                not_contains("fb.content", "contains_all", "cat,eye"),
            ])
        );
    }

    #[test]
    fn test_duplicates_collapse_to_single_condition() {
        let tree = Node::group(Node::and(vec![
            contains("fb.content", "contains", "apple"),
            contains("fb.content", "contains", "apple"),
        ]));
        assert_eq!(fold(tree), contains("fb.content", "contains", "apple"));
    }

    #[test]
    fn test_not_group_distributes() {
        let tree = Node::Not(vec![Node::group(Node::and(vec![
            contains("fb.content", "contains", "apple"),
            contains("fb.content", "contains", "apple"),
        ]))]);
        assert_eq!(fold(tree), not_contains("fb.content", "contains", "apple"));

        let tree = Node::Not(vec![Node::group(Node::or(vec![
            contains("fb.content", "contains", "apple"),
            Node::raw(r#"links.domain == "x""#),
        ]))]);
        assert_eq!(
            fold(tree),
            Node::group(Node::and(vec![
                Node::Not(vec![Node::raw(r#"links.domain == "x""#)]),
                not_contains("fb.content", "contains", "apple"),
            ]))
        );
    }

    #[test]
    fn test_double_negation() {
        let tree = Node::Not(vec![not_contains("fb.content", "==", "apple")]);
        assert_eq!(fold(tree), contains("fb.content", "==", "apple"));

        let tree = Node::Not(vec![Node::Not(vec![Node::raw("x")])]);
        assert_eq!(fold(tree), Node::raw("x"));

        let tree = Node::Not(vec![contains("fb.content", "contains", "a")]);
        assert_eq!(fold(tree), not_contains("fb.content", "contains", "a"));
    }

    #[test]
    fn test_list_operators_respect_connective() {
        let unchanged = Node::group(Node::and(vec![
            contains("fb.content", "contains_any", "apple,book"),
            contains("fb.content", "contains_any", "cat,eye"),
        ]));
        assert_eq!(fold(unchanged.clone()), unchanged);

        let unchanged = Node::group(Node::or(vec![
            contains("fb.content", "contains_all", "apple,book"),
            contains("fb.content", "contains", "cat"),
        ]));
        assert_eq!(fold(unchanged.clone()), unchanged);

        let tree = Node::group(Node::or(vec![
            contains("fb.content", "contains_any", "apple,book"),
            contains("fb.content", "contains_any", "cat,eye"),
        ]));
        let folded = fold(tree);
        assert_eq!(
            folded,
            contains("fb.content", "contains_any", "apple,book,cat,eye")
        );
        assert_eq!(fold(folded.clone()), folded);

        let tree = Node::and(vec![
            contains("fb.content", "contains_all", "apple,book"),
            contains("fb.content", "contains", "cat"),
        ]);
        assert_eq!(
            fold(tree),
            contains("fb.content", "contains_all", "apple,book,cat")
        );
    }

    #[test]
    fn test_reuses_folded_group() {
        let tree = Node::and(vec![
            contains("fb.content", "contains", "book"),
            Node::group(Node::and(vec![
                contains("fb.content", "contains", "apple"),
                contains("fb.content", "contains", "cat"),
            ])),
        ]);
        assert_eq!(
            fold(tree),
            contains("fb.content", "contains_all", "apple,book,cat")
        );
    }

    #[test]
    fn test_inlines_same_connective_group() {
        let tree = Node::and(vec![
            contains("fb.content", "contains", "book"),
            Node::group(Node::and(vec![
                contains("fb.content", "contains", "apple"),
                contains("fb.parent.content", "==", "x"),
            ])),
        ]);
        assert_eq!(
            fold(tree),
            Node::and(vec![
                contains("fb.parent.content", "==", "x"),
                contains("fb.content", "contains_all", "apple,book"),
            ])
        );
    }

    #[test]
    fn test_keeps_other_operators() {
        let tree = Node::or(vec![
            contains("fb.content", "contains", "apple"),
            contains("fb.content", "==", "book"),
        ]);
        assert_eq!(
            fold(tree),
            Node::or(vec![
                contains("fb.content", "==", "book"),
                contains("fb.content", "contains", "apple"),
            ])
        );
    }

    #[test]
    fn test_comma_escaping() {
        let tree = Node::or(vec![
            contains("fb.content", "contains", "a,b"),
            contains("fb.content", "contains_any", "c\\,d,e"),
        ]);
        assert_eq!(
            fold(tree),
            contains("fb.content", "contains_any", "a\\,b,c\\,d,e")
        );

        let tree = Node::and(vec![
            contains("fb.content", "contains", "a,b"),
            contains("fb.content", "contains", "a,b"),
        ]);
        assert_eq!(fold(tree), contains("fb.content", "contains", "a,b"));
    }

    #[test]
    fn test_trailing_backslash_is_not_merged() {
        let tree = Node::or(vec![
            contains("fb.content", "contains", "a\\"),
            contains("fb.content", "contains", "c"),
            contains("fb.content", "contains", "b"),
        ]);
        assert_eq!(
            fold(tree),
            Node::or(vec![
                contains("fb.content", "contains", "a\\"),
                contains("fb.content", "contains_any", "b,c"),
            ])
        );

        let tree = Node::or(vec![
            contains("fb.content", "contains_any", "b,a\\"),
            contains("fb.content", "contains", "c"),
        ]);
        assert_eq!(
            fold(tree),
            Node::or(vec![
                contains("fb.content", "contains_any", "b,a\\"),
                contains("fb.content", "contains", "c"),
            ])
        );
    }

    #[test]
    fn test_single_word_degrades() {
        assert_eq!(
            fold(contains("fb.content", "contains_any", "foo")),
            contains("fb.content", "contains", "foo")
        );
        assert_eq!(
            fold(not_contains("fb.content", "contains_all", "a\\,b")),
            not_contains("fb.content", "contains", "a,b")
        );
    }
}
