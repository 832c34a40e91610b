use fudg_core::{
    graph::{NodeKind, Parse},
    identifier::{NodeId, TokenIndex},
    validate::{Rule, Violation},
};
use fudg_parser::{
    ParseOptions, parse,
    error::{BuildErrorKind, ErrorCode, ErrorKind},
};
use proptest::prelude::*;

const SENTENCE: &[&str] = &["the", "cat", "chased", "the", "mouse"];

fn parse_ok(words: &[&str], source: &str) -> Parse {
    parse(words, source, &ParseOptions::default())
        .unwrap_or_else(|err| panic!("expected {source:?} to parse, got {err}"))
}

fn pairs(parse: &Parse) -> Vec<(NodeId, NodeId)> {
    parse.edges().iter().map(|e| (e.source(), e.target())).collect()
}

fn token_node(parse: &Parse, index: usize) -> NodeId {
    parse
        .node_for_token(TokenIndex::new(index))
        .map(|node| node.id())
        .expect("token should have a node")
}

#[test]
fn test_ambiguous_mention_is_reference_error() {
    let err = parse(SENTENCE, "the > cat", &ParseOptions::default()).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Reference);
    assert_eq!(err.diagnostics()[0].code(), Some(ErrorCode::E201));
}

#[test]
fn test_selected_mention_builds_unlabeled_edge() {
    let parse = parse_ok(SENTENCE, "the_1 > cat");

    assert_eq!(parse.edges().len(), 1);
    let edge = &parse.edges()[0];
    assert_eq!(edge.source(), token_node(&parse, 0));
    assert_eq!(edge.target(), token_node(&parse, 1));
    assert_eq!(edge.label(), None);
}

#[test]
fn test_chain_builds_exactly_consecutive_edges() {
    let parse = parse_ok(&["A", "B", "C"], "A > B > C");

    let (a, b, c) = (token_node(&parse, 0), token_node(&parse, 1), token_node(&parse, 2));
    assert_eq!(pairs(&parse), vec![(a, b), (b, c)]);
}

#[test]
fn test_group_node_absorbs_later_mentions() {
    let parse = parse_ok(&["A", "B", "C", "D"], "[A B] > C\nA > D");

    let group = parse.edges()[1].source();
    assert_eq!(parse.node(group).map(|n| n.kind()), Some(NodeKind::Group));
    assert_eq!(token_node(&parse, 0), group);
    assert_eq!(token_node(&parse, 1), group);
}

#[test]
fn test_repeated_edge_is_build_error() {
    let err = parse(&["A", "B"], "A > B\nA > B", &ParseOptions::default()).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Build);
    assert_eq!(err.build_kind(), Some(BuildErrorKind::DuplicateEdge));
}

#[test]
fn test_error_position_is_attached() {
    let err = parse(SENTENCE, "chased > cat\nchased > dog", &ParseOptions::default()).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Reference);
    let position = err.position().expect("position should be known");
    assert_eq!((position.line, position.column), (2, 10));
    assert!(err.to_string().contains("line 2, column 10"), "{err}");
}

#[test]
fn test_stage_kinds() {
    let options = ParseOptions::default();

    assert_eq!(parse(SENTENCE, "\"cat", &options).unwrap_err().kind(), ErrorKind::Lex);
    assert_eq!(parse(SENTENCE, "cat >", &options).unwrap_err().kind(), ErrorKind::Syntax);
    assert_eq!(
        parse(SENTENCE, "chased > $x", &options).unwrap_err().kind(),
        ErrorKind::Build
    );
}

#[test]
fn test_semantic_checks_are_optional() {
    let source = "chased > cat";
    assert!(parse(SENTENCE, source, &ParseOptions::default()).is_ok());

    let options = ParseOptions::default().with_semantic_checks(true);
    let err = parse(SENTENCE, source, &options).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Semantic);
    let uncovered = err
        .diagnostics()
        .iter()
        .filter(|d| d.code() == Some(ErrorCode::E400))
        .count();
    assert_eq!(uncovered, 3);
}

#[test]
fn test_complete_annotation_passes_semantic_checks() {
    let options = ParseOptions::default().with_semantic_checks(true);
    let source = "chased > [the_1 cat]*cat :nsubj\nchased > [the_2 mouse]*mouse :obj";

    let parse = parse(SENTENCE, source, &options).expect("should validate");
    assert_eq!(parse.roots(), &[token_node(&parse, 2)]);
}

#[test]
fn test_cycle_without_root_fails_semantic_checks() {
    let options = ParseOptions::default().with_semantic_checks(true);

    let err = parse(&["a", "b"], "a > b > a", &options).unwrap_err();
    assert!(err.diagnostics().iter().all(|d| d.code() == Some(ErrorCode::E403)));

    assert!(parse(&["a", "b"], "a** > b > a", &options).is_ok());
}

struct NoUnlabeledEdges;

impl Rule for NoUnlabeledEdges {
    fn name(&self) -> &str {
        "no-unlabeled-edges"
    }

    fn check(&self, parse: &Parse, violations: &mut Vec<Violation>) {
        for edge in parse.edges().iter().filter(|e| e.label().is_none()) {
            violations.push(Violation::Custom {
                rule: self.name().to_string(),
                message: "edge has no label".to_string(),
                nodes: vec![edge.source(), edge.target()],
            });
        }
    }
}

#[test]
fn test_custom_rule() {
    let options = ParseOptions::default()
        .with_semantic_checks(true)
        .with_rule(NoUnlabeledEdges);

    let err = parse(&["a", "b"], "a > b", &options).unwrap_err();
    assert_eq!(err.diagnostics()[0].code(), Some(ErrorCode::E405));
    assert_eq!(err.message(), "no-unlabeled-edges: edge has no label");

    assert!(parse(&["a", "b"], "a > b :x", &options).is_ok());
}

#[test]
fn test_json_round_trip() {
    let parse = parse_ok(
        SENTENCE,
        "$np = [the_1 cat]*cat\nchased > $np :nsubj\nchased > mouse & the_2 :obj",
    );

    let json = parse.to_json_string();
    assert_eq!(Parse::from_json(&json).expect("valid document"), parse);
}

#[test]
fn test_parallel_parses_agree() {
    let source = "chased > [the_1 cat]*cat :nsubj\nchased > mouse :obj; mouse > the_2";
    let expected = parse_ok(SENTENCE, source).to_json_string();

    let outputs: Vec<String> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| parse_ok(SENTENCE, source).to_json_string()))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("thread should not panic"))
            .collect()
    });

    assert!(outputs.iter().all(|output| *output == expected));
}

fn words(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("w{i}")).collect()
}

proptest! {
    #[test]
    fn prop_chains_are_deterministic_and_valid(directions in prop::collection::vec(any::<bool>(), 1..10)) {
        let sentence = words(directions.len() + 1);
        let mut source = sentence[0].clone();
        for (word, governs) in sentence[1..].iter().zip(&directions) {
            source.push_str(if *governs { " > " } else { " < " });
            source.push_str(word);
        }

        let options = ParseOptions::default().with_semantic_checks(true);
        let first = parse(&sentence, &source, &options).map(|p| p.to_json_string());
        let second = parse(&sentence, &source, &options).map(|p| p.to_json_string());

        prop_assert!(first.is_ok(), "{:?}", first);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_groups_partition_the_sentence(sizes in prop::collection::vec(1usize..4, 1..6)) {
        let sentence = words(sizes.iter().sum());
        let mut groups = Vec::new();
        let mut next = 0;
        for size in &sizes {
            groups.push(format!("[{}]", sentence[next..next + size].join(" ")));
            next += size;
        }
        let source = groups.join(" > ");

        let options = ParseOptions::default().with_semantic_checks(true);
        let parse = parse(&sentence, &source, &options).expect("should validate");

        prop_assert_eq!(parse.nodes().len(), sizes.len());
        for token in parse.tokens() {
            let owners = parse.nodes().iter().filter(|n| n.contains(token.index())).count();
            prop_assert_eq!(owners, 1);
        }
        prop_assert_eq!(Parse::from_json(&parse.to_json_string()).ok(), Some(parse));
    }
}
