//! Error types for stage invocation

use starpipe_story::CodecError;
use std::time::Duration;

/// Errors building an argument vector
#[derive(Debug, thiserror::Error)]
pub enum ArgvError {
    /// Command line had no tokens
    #[error("empty command line")]
    EmptyCommand,

    /// The argument-vector builder rejected the request
    #[error("cannot build arguments for stage '{stage}': {source}")]
    Builder {
        stage: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ArgvError {
    /// Wrap a builder-specific error
    pub fn builder(
        stage: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Builder {
            stage: stage.into(),
            source: source.into(),
        }
    }
}

/// Errors running one stage
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    /// Argument vector could not be built
    #[error("argument error: {0}")]
    Argv(#[from] ArgvError),

    /// Process could not be started
    #[error("failed to spawn stage '{stage}': {source}")]
    Spawn {
        stage: String,
        #[source]
        source: std::io::Error,
    },

    /// Serialized input could not be staged
    #[error("failed to stage input for '{stage}': {source}")]
    Input {
        stage: String,
        #[source]
        source: std::io::Error,
    },

    /// Pipe failure while exchanging data with the process
    #[error("io error talking to stage '{stage}': {source}")]
    Io {
        stage: String,
        #[source]
        source: std::io::Error,
    },

    /// Process exited unsuccessfully; its output was discarded
    #[error("stage '{stage}' failed ({}): {}", describe_status(.status), .stderr.trim_end())]
    Failed {
        stage: String,
        /// Exit code, `None` if terminated by a signal
        status: Option<i32>,
        /// Captured error stream (tail)
        stderr: String,
    },

    /// Deadline expired; the process was killed
    #[error("stage '{stage}' timed out after {after:?}")]
    TimedOut { stage: String, after: Duration },

    /// Output was not a well-formed story
    #[error("stage '{stage}' produced unparseable output: {source}")]
    Parse {
        stage: String,
        #[source]
        source: CodecError,
    },
}

fn describe_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("exit status {code}"),
        None => "terminated by signal".to_string(),
    }
}

impl StageError {
    pub(crate) fn spawn(stage: &str, source: std::io::Error) -> Self {
        Self::Spawn {
            stage: stage.to_string(),
            source,
        }
    }

    pub(crate) fn input(stage: &str, source: std::io::Error) -> Self {
        Self::Input {
            stage: stage.to_string(),
            source,
        }
    }

    pub(crate) fn io(stage: &str, source: std::io::Error) -> Self {
        Self::Io {
            stage: stage.to_string(),
            source,
        }
    }

    /// Identifier of the failing stage, when known
    #[must_use]
    pub fn stage(&self) -> Option<&str> {
        match self {
            Self::Argv(ArgvError::Builder { stage, .. }) => Some(stage),
            Self::Argv(ArgvError::EmptyCommand) => None,
            Self::Spawn { stage, .. }
            | Self::Input { stage, .. }
            | Self::Io { stage, .. }
            | Self::Failed { stage, .. }
            | Self::TimedOut { stage, .. }
            | Self::Parse { stage, .. } => Some(stage),
        }
    }

    /// Captured error stream for `Failed`
    #[must_use]
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::Failed { stderr, .. } => Some(stderr),
            _ => None,
        }
    }
}

/// Result type alias for stage operations
pub type StageResult<T> = Result<T, StageError>;
