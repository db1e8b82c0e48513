//! Stack-based incremental parser

use crate::codec::ParseOptions;
use crate::error::{CodecError, CodecResult};
use crate::node::StoryNode;
use crate::stories::Stories;
use once_cell::sync::Lazy;
use regex::Regex;

static OPEN_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\((\w+)").expect("valid regex"));
static CLOSE_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\)(\w+)").expect("valid regex"));

/// Incremental story parser
///
/// Feed lines with [`push_line`](Self::push_line) as they arrive and call
/// [`finish`](Self::finish) at end of input. In-progress nodes live on an
/// explicit stack, so nesting depth does not grow the call stack.
///
/// A close marker only closes the top node when its identifier equals that
/// node's kind exactly; any other close-shaped line is ordinary content.
#[derive(Debug, Default)]
pub struct StoryParser {
    options: ParseOptions,
    stack: Vec<StoryNode>,
    completed: Vec<StoryNode>,
    lines_seen: usize,
}

impl StoryParser {
    /// Create parser with options
    #[inline]
    #[must_use]
    pub fn new(options: ParseOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Current nesting depth
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Number of top-level stories completed so far
    #[inline]
    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed.len()
    }

    /// Number of lines consumed
    #[inline]
    #[must_use]
    pub fn lines_seen(&self) -> usize {
        self.lines_seen
    }

    /// Consume one line
    pub fn push_line(&mut self, raw: &str) {
        self.lines_seen += 1;
        let line = self.options.normalization.apply(raw);

        if let Some(caps) = OPEN_MARKER.captures(line) {
            self.stack.push(StoryNode::new(&caps[1]));
            return;
        }

        let Some(top) = self.stack.last_mut() else {
            tracing::trace!(line = self.lines_seen, "skipping content outside any block");
            return;
        };

        let closes_top = CLOSE_MARKER
            .captures(line)
            .is_some_and(|caps| &caps[1] == top.kind());
        if !closes_top {
            top.absorb_content(line);
            return;
        }

        if let Some(done) = self.stack.pop() {
            match self.stack.last_mut() {
                Some(parent) => parent.push_child(done),
                None => self.completed.push(done),
            }
        }
    }

    /// End of input
    ///
    /// # Errors
    /// `UnterminatedBlock` if blocks remain open (innermost kind first),
    /// `EmptyResult` if no top-level block completed.
    pub fn finish(self) -> CodecResult<Stories> {
        if !self.stack.is_empty() {
            return Err(CodecError::unterminated(
                self.stack.iter().map(StoryNode::kind),
            ));
        }
        tracing::trace!(
            lines = self.lines_seen,
            stories = self.completed.len(),
            "parsed story input"
        );
        Stories::from_vec(self.completed).ok_or(CodecError::EmptyResult)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::parse_str;

    #[test]
    fn nested_children_in_order() {
        let text = "(Particle\n  N = 2\n(Particle\n  i = 1\n)Particle\n(Particle\n  i = 2\n)Particle\n)Particle\n";
        let root = parse_str(text).unwrap().into_single().unwrap();
        assert_eq!(root.attribute("N"), Some("2"));
        let ids: Vec<_> = root.children().iter().filter_map(|c| c.attribute("i")).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn mismatched_close_is_content() {
        let root = parse_str("(A\n(B\n)X\n)B\n)A\n").unwrap().into_single().unwrap();
        assert_eq!(root.kind(), "A");
        assert_eq!(root.children().len(), 1);
        let b = &root.children()[0];
        assert_eq!(b.kind(), "B");
        assert_eq!(b.lines(), &[")X".to_string()]);
    }

    #[test]
    fn close_of_ancestor_inside_child_is_content() {
        // `)A` while `B` is on top does not close `B` or `A`.
        let root = parse_str("(A\n(B\n)A\n)B\n)A\n").unwrap().into_single().unwrap();
        assert_eq!(root.children()[0].lines(), &[")A".to_string()]);
    }

    #[test]
    fn close_requires_whole_identifier() {
        let err = parse_str("(Part\n)Particle\n").unwrap_err();
        assert!(matches!(err, CodecError::UnterminatedBlock { .. }));

        let root = parse_str("(Part\n)Particle\n)Part trailing\n").unwrap().into_single().unwrap();
        assert_eq!(root.lines(), &[")Particle".to_string()]);
    }

    #[test]
    fn log_lines_never_attributes() {
        let root = parse_str("(Particle\n(Log\n  initial_mass = 1\n)Log\n)Particle\n")
            .unwrap()
            .into_single()
            .unwrap();
        let log = root.child("Log").unwrap();
        assert!(log.attributes().is_empty());
        assert_eq!(log.lines(), &["  initial_mass = 1".to_string()]);
    }

    #[test]
    fn open_marker_inside_log_still_opens() {
        let root = parse_str("(Log\n(Note\n)Note\n)Log\n").unwrap().into_single().unwrap();
        assert_eq!(root.children()[0].kind(), "Note");
    }

    #[test]
    fn multiple_top_level_stories() {
        let stories = parse_str("(Particle\n t = 0\n)Particle\n(Particle\n t = 1\n)Particle\n").unwrap();
        assert!(stories.is_many());
        assert_eq!(stories.len(), 2);
    }

    #[test]
    fn unterminated_names_kind() {
        let err = parse_str("(A\nfoo = 1\n").unwrap_err();
        match err {
            CodecError::UnterminatedBlock { kinds } => assert_eq!(kinds, vec!["A".to_string()]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unterminated_nested_innermost_first() {
        let err = parse_str("(A\n(B\n(C\n)C\n").unwrap_err();
        match err {
            CodecError::UnterminatedBlock { kinds } => {
                assert_eq!(kinds, vec!["B".to_string(), "A".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unterminated_wins_over_completed_stories() {
        let err = parse_str("(A\n)A\n(A\n").unwrap_err();
        assert!(matches!(err, CodecError::UnterminatedBlock { .. }));
    }

    #[test]
    fn empty_input_is_empty_result() {
        assert!(matches!(parse_str("").unwrap_err(), CodecError::EmptyResult));
        assert!(matches!(
            parse_str("no blocks here\n= =\n").unwrap_err(),
            CodecError::EmptyResult
        ));
    }

    #[test]
    fn content_outside_blocks_is_skipped() {
        let stories = parse_str("kira: starting\n(A\n)A\n)A\nbetween\n(A\n)A\n").unwrap();
        assert_eq!(stories.len(), 2);
        for story in &stories {
            assert!(story.lines().is_empty());
        }
    }

    #[test]
    fn incremental_state_is_observable() {
        let mut parser = StoryParser::default();
        parser.push_line("(A");
        parser.push_line("(B");
        assert_eq!(parser.depth(), 2);
        parser.push_line(")B");
        parser.push_line(")A");
        assert_eq!(parser.depth(), 0);
        assert_eq!(parser.completed(), 1);
        assert_eq!(parser.lines_seen(), 4);
        assert!(parser.finish().is_ok());
    }

    #[test]
    fn very_deep_nesting() {
        let depth = 100_000;
        let mut parser = StoryParser::default();
        for _ in 0..depth {
            parser.push_line("(Particle");
        }
        for _ in 0..depth {
            parser.push_line(")Particle");
        }
        let root = parser.finish().unwrap().into_single().unwrap();
        let mut levels = 1;
        let mut node = &root;
        while let Some(child) = node.children().first() {
            node = child;
            levels += 1;
        }
        assert_eq!(levels, depth);
    }
}
