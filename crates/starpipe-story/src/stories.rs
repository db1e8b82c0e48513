//! Single-or-many story results

use crate::node::StoryNode;
use serde::{Deserialize, Serialize};

/// Result of parsing or running a stage: one story or an ordered sequence
///
/// `Many` is produced by expanding stages (e.g. successive snapshots of an
/// integration) and is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Stories {
    /// Exactly one story
    Single(StoryNode),
    /// Ordered sequence of stories
    Many(Vec<StoryNode>),
}

impl Stories {
    /// Build from parsed top-level results
    ///
    /// Returns `None` for an empty sequence; one element collapses to `Single`.
    #[must_use]
    pub fn from_vec(mut stories: Vec<StoryNode>) -> Option<Self> {
        match stories.len() {
            0 => None,
            1 => stories.pop().map(Self::Single),
            _ => Some(Self::Many(stories)),
        }
    }

    /// Number of stories held
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Many(stories) => stories.len(),
        }
    }

    /// Always false for values built by the codec
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether this is an expanded sequence
    #[inline]
    #[must_use]
    pub fn is_many(&self) -> bool {
        matches!(self, Self::Many(_))
    }

    /// Take the single story, or give back the sequence
    ///
    /// # Errors
    /// Returns the sequence unchanged when this is `Many`.
    pub fn into_single(self) -> Result<StoryNode, Vec<StoryNode>> {
        match self {
            Self::Single(node) => Ok(node),
            Self::Many(stories) => Err(stories),
        }
    }

    /// Flatten into an ordered vector
    #[must_use]
    pub fn into_vec(self) -> Vec<StoryNode> {
        match self {
            Self::Single(node) => vec![node],
            Self::Many(stories) => stories,
        }
    }

    /// Insert a story at the front, turning the result into a sequence
    #[must_use]
    pub fn prepend(self, first: StoryNode) -> Self {
        let mut stories = Vec::with_capacity(self.len() + 1);
        stories.push(first);
        stories.extend(self.into_vec());
        Self::Many(stories)
    }

    /// Iterate stories in order
    pub fn iter(&self) -> std::slice::Iter<'_, StoryNode> {
        match self {
            Self::Single(node) => std::slice::from_ref(node).iter(),
            Self::Many(stories) => stories.iter(),
        }
    }

    /// First story
    #[must_use]
    pub fn first(&self) -> Option<&StoryNode> {
        self.iter().next()
    }

    /// Last story (the final state of a trajectory)
    #[must_use]
    pub fn last(&self) -> Option<&StoryNode> {
        self.iter().next_back()
    }

    /// Canonical text of every story, concatenated in order
    #[must_use]
    pub fn to_story_string(&self) -> String {
        self.iter().map(StoryNode::to_story_string).collect()
    }
}

impl From<StoryNode> for Stories {
    fn from(node: StoryNode) -> Self {
        Self::Single(node)
    }
}

impl<'a> IntoIterator for &'a Stories {
    type Item = &'a StoryNode;
    type IntoIter = std::slice::Iter<'a, StoryNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
