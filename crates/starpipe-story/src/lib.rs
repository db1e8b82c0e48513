//! starpipe story format
//!
//! Data model and codec for the nested, self-delimiting "story" text format
//! written by N-body snapshot tools.
//!
//! # Core Concepts
//!
//! - [`StoryNode`]: a tagged block holding attributes, raw lines and children
//! - [`Stories`]: one story or an ordered sequence of stories
//! - [`StoryParser`]: incremental, stack-based parser fed one line at a time
//! - [`write_story`]: canonical serializer
//!
//! # Format
//!
//! ```text
//! (Particle
//!   N = 2
//! (Log
//!   ===>  Tue Jan 26 12:00:00 2016
//! )Log
//! (Dynamics
//!   m  =  1
//! )Dynamics
//! )Particle
//! ```
//!
//! # Example
//!
//! ```rust
//! use starpipe_story::{parse_str, StoryNode};
//!
//! let stories = parse_str("(Particle\n  N = 2\n)Particle\n").unwrap();
//! let root: StoryNode = stories.into_single().unwrap();
//! assert_eq!(root.kind(), "Particle");
//! assert_eq!(root.attribute("N"), Some("2"));
//! assert_eq!(root.to_story_string(), "(Particle\n  N = 2\n)Particle\n");
//! ```

#![warn(unreachable_pub)]

// Core modules
pub mod codec;
pub mod error;
mod node;
mod stories;

// Re-exports for convenience
pub use codec::{
    parse_lines, parse_reader, parse_str, parse_str_with, write_story, LineNormalization,
    ParseOptions, StoryParser,
};
pub use error::{CodecError, CodecResult};
pub use node::{StoryNode, LOG_KIND};
pub use stories::Stories;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with stories
    pub use crate::codec::{parse_str, write_story, LineNormalization, ParseOptions, StoryParser};
    pub use crate::error::CodecError;
    pub use crate::node::StoryNode;
    pub use crate::stories::Stories;
}
