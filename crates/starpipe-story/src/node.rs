//! Story data model

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Kind whose content lines are never promoted to attributes
pub const LOG_KIND: &str = "Log";

/// One block of the story format
///
/// A node owns its children exclusively; there are no back-references.
/// The `kind` is fixed at construction. Attributes are kept in a
/// [`BTreeMap`] so serialization order is the key order regardless of how
/// they were inserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryNode {
    kind: String,
    #[serde(default)]
    attributes: BTreeMap<String, String>,
    #[serde(default)]
    lines: Vec<String>,
    #[serde(default)]
    children: Vec<StoryNode>,
}

impl StoryNode {
    /// Create empty node of the given kind
    #[inline]
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            attributes: BTreeMap::new(),
            lines: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Block tag following the open marker
    #[inline]
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Whether attribute classification is disabled for this node
    #[inline]
    #[must_use]
    pub fn is_log(&self) -> bool {
        self.kind == LOG_KIND
    }

    /// All attributes, sorted by key
    #[inline]
    #[must_use]
    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// Raw value of one attribute
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Raw content lines in source order
    #[inline]
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Child nodes in source order
    #[inline]
    #[must_use]
    pub fn children(&self) -> &[StoryNode] {
        &self.children
    }

    /// First direct child of the given kind
    #[must_use]
    pub fn child(&self, kind: &str) -> Option<&StoryNode> {
        self.children.iter().find(|c| c.kind == kind)
    }

    /// Direct children of the given kind, in order
    pub fn children_of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a StoryNode> {
        self.children.iter().filter(move |c| c.kind == kind)
    }

    /// Follow a chain of child kinds, taking the first match at each level
    ///
    /// An empty path returns `self`.
    #[must_use]
    pub fn descendant(&self, path: &[&str]) -> Option<&StoryNode> {
        path.iter().try_fold(self, |node, kind| node.child(kind))
    }

    /// Set an attribute, returning the previous value
    pub fn set_attribute(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Option<String> {
        self.attributes.insert(key.into(), value.into())
    }

    /// Append a raw content line
    pub fn push_line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Append a child node
    pub fn push_child(&mut self, child: StoryNode) {
        self.children.push(child);
    }

    /// With attribute
    #[inline]
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(key, value);
        self
    }

    /// With raw line
    #[inline]
    #[must_use]
    pub fn with_line(mut self, line: impl Into<String>) -> Self {
        self.push_line(line);
        self
    }

    /// With child
    #[inline]
    #[must_use]
    pub fn with_child(mut self, child: StoryNode) -> Self {
        self.push_child(child);
        self
    }

    /// Classify one content line into an attribute or a raw line
    ///
    /// A line containing exactly one `=` becomes a trimmed `key = value`
    /// attribute (last write wins), unless this is a `Log` node.
    pub(crate) fn absorb_content(&mut self, line: &str) {
        if !self.is_log() {
            if let Some((key, value)) = line.split_once('=') {
                if !value.contains('=') {
                    self.attributes
                        .insert(key.trim().to_string(), value.trim().to_string());
                    return;
                }
            }
        }
        self.lines.push(line.to_string());
    }

    /// Canonical serialized text
    #[must_use]
    pub fn to_story_string(&self) -> String {
        let mut out = Vec::new();
        // Writing into a Vec cannot fail
        let _ = crate::codec::write_story(self, &mut out);
        String::from_utf8_lossy(&out).into_owned()
    }
}

impl fmt::Display for StoryNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_story_string())
    }
}

// Deep trees are torn down with a worklist so drop does not recurse.
impl Drop for StoryNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absorb_single_equals_is_attribute() {
        let mut node = StoryNode::new("Dynamics");
        node.absorb_content("  m  =  0.25 ");
        assert_eq!(node.attribute("m"), Some("0.25"));
        assert!(node.lines().is_empty());
    }

    #[test]
    fn absorb_repeated_key_last_write_wins() {
        let mut node = StoryNode::new("Dynamics");
        node.absorb_content("t = 0");
        node.absorb_content("t = 1");
        assert_eq!(node.attribute("t"), Some("1"));
        assert_eq!(node.attributes().len(), 1);
    }

    #[test]
    fn absorb_two_equals_is_raw_line() {
        let mut node = StoryNode::new("Star");
        node.absorb_content("a = b = c");
        assert!(node.attributes().is_empty());
        assert_eq!(node.lines(), &["a = b = c".to_string()]);
    }

    #[test]
    fn absorb_in_log_is_raw_line() {
        let mut node = StoryNode::new(LOG_KIND);
        node.absorb_content("  initial_mass = 1");
        assert!(node.attributes().is_empty());
        assert_eq!(node.lines(), &["  initial_mass = 1".to_string()]);
    }

    #[test]
    fn absorb_without_equals_is_raw_line() {
        let mut node = StoryNode::new("Star");
        node.absorb_content("  ===>  Tue Jan 26 2016");
        assert_eq!(node.lines().len(), 1);
    }

    #[test]
    fn descendant_follows_first_match() {
        let root = StoryNode::new("Particle")
            .with_child(StoryNode::new("Log"))
            .with_child(
                StoryNode::new("Dynamics").with_child(StoryNode::new("Star").with_attribute("r", "1")),
            );

        assert_eq!(root.descendant(&[]).map(StoryNode::kind), Some("Particle"));
        let star = root.descendant(&["Dynamics", "Star"]).unwrap();
        assert_eq!(star.attribute("r"), Some("1"));
        assert!(root.descendant(&["Hydro"]).is_none());
    }

    #[test]
    fn children_of_kind_keeps_order() {
        let root = StoryNode::new("Particle")
            .with_child(StoryNode::new("Particle").with_attribute("i", "1"))
            .with_child(StoryNode::new("Log"))
            .with_child(StoryNode::new("Particle").with_attribute("i", "2"));

        let ids: Vec<_> = root
            .children_of_kind("Particle")
            .filter_map(|c| c.attribute("i"))
            .collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn deep_tree_drops_without_overflow() {
        let mut node = StoryNode::new("Particle");
        for _ in 0..200_000 {
            node = StoryNode::new("Particle").with_child(node);
        }
        drop(node);
    }

    #[test]
    fn serde_json_shape() {
        let node = StoryNode::new("Star").with_attribute("m", "1").with_line("raw");
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["kind"], "Star");
        assert_eq!(json["attributes"]["m"], "1");
        assert_eq!(json["lines"][0], "raw");
    }
}
