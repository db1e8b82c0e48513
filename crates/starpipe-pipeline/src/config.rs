//! Pipeline configuration

use crate::error::{PipelineError, PipelineResult};
use serde::{Deserialize, Serialize};
use starpipe_stage::{StageInvoker, DEFAULT_SPILL_THRESHOLD};
use starpipe_story::LineNormalization;
use std::time::Duration;

/// Executor settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// In-memory bound for staged input, in bytes
    pub spill_threshold_bytes: usize,
    /// Deadline for stages that set none, in seconds
    pub default_timeout_secs: Option<u64>,
    /// Normalization applied to stage output lines
    pub line_normalization: LineNormalization,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            spill_threshold_bytes: DEFAULT_SPILL_THRESHOLD,
            default_timeout_secs: None,
            line_normalization: LineNormalization::TrimTrailingWhitespace,
        }
    }
}

impl PipelineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With spill threshold
    #[inline]
    #[must_use]
    pub fn with_spill_threshold(mut self, bytes: usize) -> Self {
        self.spill_threshold_bytes = bytes;
        self
    }

    /// With default stage deadline
    #[inline]
    #[must_use]
    pub fn with_default_timeout_secs(mut self, secs: u64) -> Self {
        self.default_timeout_secs = Some(secs);
        self
    }

    /// With output line normalization
    #[inline]
    #[must_use]
    pub fn with_line_normalization(mut self, normalization: LineNormalization) -> Self {
        self.line_normalization = normalization;
        self
    }

    /// Default stage deadline
    #[must_use]
    pub fn default_timeout(&self) -> Option<Duration> {
        self.default_timeout_secs.map(Duration::from_secs)
    }

    /// Check settings
    ///
    /// # Errors
    /// `Config` if the default deadline is zero.
    pub fn validate(&self) -> PipelineResult<()> {
        if self.default_timeout_secs == Some(0) {
            return Err(PipelineError::Config(
                "default_timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Stage invoker with these settings
    #[must_use]
    pub fn invoker(&self) -> StageInvoker {
        StageInvoker::new()
            .with_spill_threshold(self.spill_threshold_bytes)
            .with_default_timeout(self.default_timeout())
            .with_normalization(self.line_normalization)
    }
}
