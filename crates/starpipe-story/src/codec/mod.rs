//! Story format codec
//!
//! Parsing is incremental and non-recursive ([`StoryParser`]); serialization
//! is canonical ([`write_story`]): raw lines verbatim, then attributes sorted
//! by key as `  key = value`, then children, then the close marker.

use crate::error::CodecResult;
use crate::stories::Stories;
use serde::{Deserialize, Serialize};
use std::io::BufRead;

mod parser;
mod writer;

pub use parser::StoryParser;
pub use writer::write_story;

/// How each input line is normalized before classification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineNormalization {
    /// Strip only the `\n` or `\r\n` terminator
    #[default]
    Terminator,
    /// Strip every trailing whitespace character
    TrimTrailingWhitespace,
}

impl LineNormalization {
    /// Apply to one line
    #[must_use]
    pub fn apply(self, line: &str) -> &str {
        match self {
            Self::Terminator => {
                let line = line.strip_suffix('\n').unwrap_or(line);
                line.strip_suffix('\r').unwrap_or(line)
            }
            Self::TrimTrailingWhitespace => line.trim_end(),
        }
    }
}

/// Parser options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseOptions {
    /// Line normalization policy
    #[serde(default)]
    pub normalization: LineNormalization,
}

impl ParseOptions {
    /// Create default options
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With line normalization
    #[inline]
    #[must_use]
    pub fn with_normalization(mut self, normalization: LineNormalization) -> Self {
        self.normalization = normalization;
        self
    }
}

/// Parse a complete string with default options
///
/// # Errors
/// `EmptyResult` when no top-level block completes, `UnterminatedBlock` when
/// input ends inside a block.
pub fn parse_str(text: &str) -> CodecResult<Stories> {
    parse_str_with(text, ParseOptions::default())
}

/// Parse a complete string
///
/// # Errors
/// See [`parse_str`].
pub fn parse_str_with(text: &str, options: ParseOptions) -> CodecResult<Stories> {
    // Terminators stay attached so normalization strips exactly one.
    parse_lines(text.split_inclusive('\n'), options)
}

/// Parse a sequence of lines
///
/// # Errors
/// See [`parse_str`].
pub fn parse_lines<I, S>(lines: I, options: ParseOptions) -> CodecResult<Stories>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut parser = StoryParser::new(options);
    for line in lines {
        parser.push_line(line.as_ref());
    }
    parser.finish()
}

/// Parse a buffered line stream without reading it into memory first
///
/// # Errors
/// `Io` if reading fails (including invalid UTF-8), otherwise see [`parse_str`].
pub fn parse_reader<R: BufRead>(mut reader: R, options: ParseOptions) -> CodecResult<Stories> {
    let mut parser = StoryParser::new(options);
    let mut line = String::new();
    while reader.read_line(&mut line)? > 0 {
        parser.push_line(&line);
        line.clear();
    }
    parser.finish()
}
