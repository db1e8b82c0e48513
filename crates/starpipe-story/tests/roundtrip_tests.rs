//! Round-trip properties of the story codec

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use starpipe_story::{parse_str, CodecError, LineNormalization, ParseOptions, StoryNode, Stories};

const KING_SNAPSHOT: &str = "\
(Particle
  N = 2
(Log
  ===>  Fri Feb  5 12:14:42 2016
       makeking -w 1.5 -s 1454677882 -n 2 -i
       Starlab 4.4.4 (user starlab) : random number seed = 1454677882
  initial_mass = 1
)Log
(Dynamics
  system_time = 0
  m = 1
  r = 0 0 0
  v = 0 0 0
)Dynamics
(Hydro
)Hydro
(Star
)Star
(Particle
  i = 1
  N = 1
(Log
)Log
(Dynamics
  m = 0.5
  r = -0.4 0.1 0.2
  v = 0.3 -0.2 0.1
)Dynamics
(Hydro
)Hydro
(Star
)Star
)Particle
(Particle
  i = 2
  N = 1
(Log
)Log
(Dynamics
  m = 0.5
  r = 0.4 -0.1 -0.2
  v = -0.3 0.2 -0.1
)Dynamics
(Hydro
)Hydro
(Star
)Star
)Particle
)Particle
";

#[test]
fn king_snapshot_structure() {
    let root = parse_str(KING_SNAPSHOT).unwrap().into_single().unwrap();
    assert_eq!(root.kind(), "Particle");
    assert_eq!(root.attribute("N"), Some("2"));

    let log = root.child("Log").unwrap();
    assert_eq!(log.lines().len(), 4);
    assert!(log.attributes().is_empty());

    let masses: Vec<_> = root
        .children_of_kind("Particle")
        .filter_map(|p| p.descendant(&["Dynamics"]))
        .filter_map(|d| d.attribute("m"))
        .collect();
    assert_eq!(masses, vec!["0.5", "0.5"]);
}

#[test]
fn canonical_text_reserializes_byte_identical() {
    let root = parse_str(KING_SNAPSHOT).unwrap().into_single().unwrap();
    let text = root.to_story_string();
    let again = parse_str(&text).unwrap().into_single().unwrap();
    assert_eq!(again.to_story_string(), text);
    assert_eq!(again, root);
}

#[test]
fn non_canonical_whitespace_becomes_canonical() {
    let root = parse_str("(Dynamics\n   system_time  =  0\n m=1\n)Dynamics\n")
        .unwrap()
        .into_single()
        .unwrap();
    assert_eq!(
        root.to_story_string(),
        "(Dynamics\n  m = 1\n  system_time = 0\n)Dynamics\n"
    );
}

#[test]
fn trajectory_output_round_trips_as_sequence() {
    let text = format!("{KING_SNAPSHOT}{KING_SNAPSHOT}");
    let stories = parse_str(&text).unwrap();
    assert!(matches!(stories, Stories::Many(ref s) if s.len() == 2));
    let again = parse_str(&stories.to_story_string()).unwrap();
    assert_eq!(again, stories);
}

#[test]
fn live_output_normalization_trims_padding() {
    let options = ParseOptions::new().with_normalization(LineNormalization::TrimTrailingWhitespace);
    let text = "(Particle   \n  N = 1   \n)Particle   \n";
    let root = starpipe_story::parse_str_with(text, options)
        .unwrap()
        .into_single()
        .unwrap();
    assert_eq!(root.attribute("N"), Some("1"));
}

#[test]
fn reports_errors() {
    assert!(matches!(parse_str(""), Err(CodecError::EmptyResult)));
    assert!(matches!(
        parse_str("(A\nfoo = 1\n"),
        Err(CodecError::UnterminatedBlock { ref kinds }) if kinds == &["A".to_string()]
    ));
}

fn kind_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => "[A-Z][a-z]{0,7}",
        1 => Just("Log".to_string()),
    ]
}

/// Raw lines that must survive a round trip as content
///
/// Never an open marker, never exactly one `=` and never closing a kind that
/// `kind_strategy` can produce.
fn raw_line_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => "[a-z0-9 .:>#]{0,16}",
        2 => "[a-z0-9 .:>#]{1,6}[()][a-z0-9 .()]{0,8}",
        1 => "[()][ .:#]{1,3}[a-z0-9()]{0,8}",
        1 => "\\)[_0-9][a-z0-9_]{0,6}",
        1 => "[a-z ]{0,4}=[a-z ]{0,4}=[a-z0-9= ]{0,6}",
    ]
}

fn leaf_strategy() -> impl Strategy<Value = StoryNode> {
    (
        kind_strategy(),
        proptest::collection::btree_map("[a-z_][a-z0-9_]{0,7}", "[a-z0-9.+\\-]([a-z0-9. +\\-]{0,10}[a-z0-9.+\\-])?", 0..5),
        proptest::collection::vec(raw_line_strategy(), 0..4),
    )
        .prop_map(|(kind, attributes, lines)| {
            let mut node = StoryNode::new(kind);
            for line in lines {
                node.push_line(line);
            }
            if !node.is_log() {
                for (key, value) in attributes {
                    node.set_attribute(key, value);
                }
            }
            node
        })
}

fn tree_strategy() -> impl Strategy<Value = StoryNode> {
    leaf_strategy().prop_recursive(4, 48, 6, |inner| {
        (leaf_strategy(), proptest::collection::vec(inner, 0..6)).prop_map(|(mut node, children)| {
            for child in children {
                node.push_child(child);
            }
            node
        })
    })
}

proptest! {
    #[test]
    fn prop_serialize_then_parse_is_identity(tree in tree_strategy()) {
        let text = tree.to_story_string();
        let parsed = parse_str(&text).unwrap().into_single().unwrap();
        prop_assert_eq!(&parsed, &tree);
        prop_assert_eq!(parsed.to_story_string(), text);
    }

    #[test]
    fn prop_attribute_order_independent_of_insertion(
        pairs in proptest::collection::vec(("[a-z]{1,6}", "[0-9]{1,4}"), 0..12)
    ) {
        let mut forward = StoryNode::new("Dynamics");
        let mut backward = StoryNode::new("Dynamics");
        let mut deduped = std::collections::BTreeMap::new();
        for (k, v) in &pairs {
            deduped.insert(k.clone(), v.clone());
        }
        for (k, v) in &deduped {
            forward.set_attribute(k.clone(), v.clone());
        }
        for (k, v) in deduped.iter().rev() {
            backward.set_attribute(k.clone(), v.clone());
        }
        prop_assert_eq!(forward.to_story_string(), backward.to_story_string());
    }

    #[test]
    fn prop_log_lines_stay_raw(key in "[a-z]{1,8}", value in "[0-9]{1,4}") {
        let text = format!("(Log\n{key} = {value}\n)Log\n");
        let log = parse_str(&text).unwrap().into_single().unwrap();
        prop_assert!(log.attributes().is_empty());
        prop_assert_eq!(log.lines(), &[format!("{key} = {value}")]);
    }
}
