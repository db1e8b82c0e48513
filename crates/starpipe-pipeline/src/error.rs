//! Error types for pipeline execution

use starpipe_stage::StageError;

/// Errors running a pipeline or applying a stage
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Pipeline was declared with no stages
    #[error("pipeline has no stages")]
    EmptyPipeline,

    /// A stage invocation failed
    #[error("stage {index} ('{stage}') failed: {source}")]
    Stage {
        /// Position of the stage in the pipeline
        index: usize,
        /// Stage identifier
        stage: String,
        /// Underlying stage failure
        #[source]
        source: StageError,
    },

    /// A stage other than the terminal one produced several stories
    #[error(
        "stage {index} ('{stage}') produced {count} stories; a stage that yields multiple \
         results may only be the final stage in a pipeline"
    )]
    UnexpectedExpansion {
        /// Position of the stage in the pipeline
        index: usize,
        /// Stage identifier
        stage: String,
        /// Number of stories produced
        count: usize,
    },

    /// Invalid configuration
    #[error("invalid pipeline configuration: {0}")]
    Config(String),
}

impl PipelineError {
    pub(crate) fn stage(index: usize, stage: &str, source: StageError) -> Self {
        Self::Stage {
            index,
            stage: stage.to_string(),
            source,
        }
    }

    /// Index of the failing stage, when the error is stage-scoped
    #[must_use]
    pub fn stage_index(&self) -> Option<usize> {
        match self {
            Self::Stage { index, .. } | Self::UnexpectedExpansion { index, .. } => Some(*index),
            Self::EmptyPipeline | Self::Config(_) => None,
        }
    }

    /// Underlying stage failure
    #[must_use]
    pub fn stage_error(&self) -> Option<&StageError> {
        match self {
            Self::Stage { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result type alias for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;
