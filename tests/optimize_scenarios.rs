use csdl::render::CsdlWriter;
use csdl::{CsdlRegistry, Mode, Node, OptimizeError, Optimizer};
use pretty_assertions::assert_eq;

fn c(op: &str, arg: &str) -> Node {
    Node::condition("fb.content", op, arg)
}

fn not_c(op: &str, arg: &str) -> Node {
    Node::not_condition("fb.content", op, arg)
}

fn optimize(tree: &Node) -> Result<Option<Node>, OptimizeError> {
    Optimizer::default().optimize(tree)
}

#[test]
fn test_stabilizes_contains_any() {
    let tree = Node::or(vec![
        c("contains_any", "apple,book"),
        c("contains_any", "cat,eye"),
    ]);
    let once = optimize(&tree).unwrap().unwrap();
    assert_eq!(once, c("contains_any", "apple,book,cat,eye"));

    let twice = optimize(&once).unwrap().unwrap();
    assert_eq!(twice, once);
}

#[test]
fn test_dedups_and_sorts_words() {
    let tree = Node::and(vec![c("contains_all", "apple,book"), c("contains", "cat")]);
    assert_eq!(
        optimize(&tree).unwrap(),
        Some(c("contains_all", "apple,book,cat"))
    );
}

#[test]
fn test_single_word_degrades() {
    assert_eq!(
        optimize(&c("contains_any", "foo")).unwrap(),
        Some(c("contains", "foo"))
    );
}

#[test]
fn test_contradiction_can_never_match() {
    let tree = Node::and(vec![c("contains", "apple"), not_c("contains", "apple")]);
    let err = optimize(&tree).unwrap_err();
    assert!(matches!(err, OptimizeError::FalseExpression));
    assert!(err.is_filter_error());
}

#[test]
fn test_tautology_has_no_result() {
    let tree = Node::or(vec![c("contains", "apple"), not_c("contains", "apple")]);
    assert_eq!(optimize(&tree).unwrap(), None);
}

#[test]
fn test_other_operators_are_not_merged() {
    let tree = Node::or(vec![c("contains", "apple"), c("==", "book")]);
    assert_eq!(
        optimize(&tree).unwrap(),
        Some(Node::or(vec![c("==", "book"), c("contains", "apple")]))
    );
}

#[test]
fn test_negated_duplicate_group() {
    let tree = Node::Not(vec![Node::group(Node::and(vec![
        c("contains", "apple"),
        c("contains", "apple"),
    ]))]);
    assert_eq!(optimize(&tree).unwrap(), Some(not_c("contains", "apple")));

    let fold_only = Optimizer::default().with_mode(Mode::FoldOnly);
    assert_eq!(fold_only.optimize(&tree).unwrap(), Some(not_c("contains", "apple")));
}

#[test]
fn test_minimizes_before_folding() {
    // apple.book'.cat' + apple'.book'.cat + apple.book'.cat + apple.book.cat + apple.book.cat'
    let term = |apple: bool, book: bool, cat: bool| {
        let pick = |on: bool, word: &str| {
            if on {
                c("contains", word)
            } else {
                not_c("contains", word)
            }
        };
        Node::group(Node::and(vec![
            pick(apple, "apple"),
            pick(book, "book"),
            pick(cat, "cat"),
        ]))
    };
    let tree = Node::group(Node::or(vec![
        term(true, false, false),
        term(false, false, true),
        term(true, false, true),
        term(true, true, true),
        term(true, true, false),
    ]));

    let optimized = optimize(&tree).unwrap().unwrap();
    assert_eq!(
        optimized,
        Node::or(vec![
            Node::group(Node::and(vec![not_c("contains", "book"), c("contains", "cat")])),
            c("contains", "apple"),
        ])
    );

    let registry = CsdlRegistry::default();
    assert_eq!(
        CsdlWriter::new(&registry).write(&optimized).unwrap(),
        r#"(NOT fb.content contains "book" AND fb.content contains "cat") OR fb.content contains "apple""#
    );
}

#[test]
fn test_merges_across_targets_separately() {
    let tree = Node::and(vec![
        c("contains", "apple"),
        Node::condition("interaction.content", "contains", "apple"),
        c("contains", "book"),
        Node::condition("interaction.content", "contains", "book"),
    ]);
    assert_eq!(
        optimize(&tree).unwrap(),
        Some(Node::and(vec![
            c("contains_all", "apple,book"),
            Node::condition("interaction.content", "contains_all", "apple,book"),
        ]))
    );
}

#[test]
fn test_raw_nodes_pass_through() {
    let raw = Node::raw(r#"links.domain == "example.com""#);
    let tree = Node::or(vec![
        raw.clone(),
        c("contains", "apple"),
        c("contains", "book"),
    ]);
    assert_eq!(
        optimize(&tree).unwrap(),
        Some(Node::or(vec![raw, c("contains_any", "apple,book")]))
    );
}

#[test]
fn test_long_keyword_list_is_kept() {
    let words: Vec<String> = (0..65).map(|i| format!("w{:02}", i)).collect();
    let tree = c("contains_any", &words.join(","));
    assert_eq!(optimize(&tree).unwrap(), Some(tree.clone()));
}

#[test]
fn test_large_product_is_folded_without_minimizing() {
    let targets = [
        "fb.content",
        "fb.parent.content",
        "interaction.content",
        "interaction.raw_content",
        "fb.hashtags",
        "fb.link",
    ];
    let lists: Vec<Node> = targets
        .iter()
        .map(|target| Node::condition(target, "contains_any", "a,b,c,d,e"))
        .collect();
    let tree = Node::and(lists.clone());
    assert_eq!(optimize(&tree).unwrap(), Some(Node::and(lists)));

    let tree = Node::or(vec![tree, c("contains", "x"), c("contains", "y")]);
    let folded = optimize(&tree).unwrap().unwrap();
    match folded {
        Node::Or(children) => assert_eq!(children.last(), Some(&c("contains_any", "x,y"))),
        other => panic!("expected an or node, got {:?}", other),
    }
}

#[test]
fn test_filter_errors() {
    let tree = Node::and(vec![c("contains", "apple")]);
    assert!(matches!(
        optimize(&tree),
        Err(OptimizeError::MissingChildNodes { found: 1, .. })
    ));

    let tree = Node::or(vec![c("contains", "apple"), Node::Target("fb.content".into())]);
    assert!(matches!(
        optimize(&tree),
        Err(OptimizeError::InvalidChildNode { .. })
    ));

    let tree = Node::or(vec![
        c("contains", "apple"),
        Node::condition("bogus.target", "contains", "x"),
    ]);
    assert!(matches!(optimize(&tree), Err(OptimizeError::UnknownTarget(_))));

    let tree = Node::or(vec![c("contains", "apple"), c("resembles", "x")]);
    assert!(matches!(optimize(&tree), Err(OptimizeError::UnknownOperator(_))));
}

#[cfg(unix)]
#[test]
fn test_external_minimizer() {
    use csdl::ProcessMinimizer;
    use std::time::Duration;

    // Echoes the formula back unchanged.
    let minimizer = ProcessMinimizer::new(
        "/bin/sh",
        vec!["-c".into(), "read line; echo \"$line\"".into()],
        Duration::from_secs(5),
    );
    let optimizer = Optimizer::new(Box::new(CsdlRegistry::default()), Box::new(minimizer));

    let tree = Node::or(vec![c("contains", "apple"), c("contains", "book")]);
    assert_eq!(
        optimizer.optimize(&tree).unwrap(),
        Some(c("contains_any", "apple,book"))
    );

    let contradiction = ProcessMinimizer::new(
        "/bin/sh",
        vec!["-c".into(), "read line; echo 0".into()],
        Duration::from_secs(5),
    );
    let optimizer = Optimizer::new(Box::new(CsdlRegistry::default()), Box::new(contradiction));
    assert!(matches!(
        optimizer.optimize(&tree),
        Err(OptimizeError::FalseExpression)
    ));
}
