//! Error types for the story codec

/// Errors produced while parsing story text
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// No block was ever opened and closed at depth 0
    #[error("no stories found in input")]
    EmptyResult,

    /// Input ended while blocks were still open (innermost kind first)
    #[error("unterminated block(s): {}", kinds.join(" < "))]
    UnterminatedBlock {
        /// Unclosed kinds, innermost to outermost
        kinds: Vec<String>,
    },

    /// A line was not valid UTF-8 (1-based line number)
    #[error("line {line} is not valid UTF-8")]
    InvalidUtf8 {
        /// Offending line
        line: usize,
    },

    /// Reading the line stream failed
    #[error("io error reading story input: {0}")]
    Io(#[from] std::io::Error),
}

impl CodecError {
    /// Create unterminated block error from the parser stack (outermost first)
    pub(crate) fn unterminated<'a>(stack: impl DoubleEndedIterator<Item = &'a str>) -> Self {
        Self::UnterminatedBlock {
            kinds: stack.rev().map(str::to_string).collect(),
        }
    }
}

/// Result type alias for codec operations
pub type CodecResult<T> = Result<T, CodecError>;
