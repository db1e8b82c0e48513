//! Pipeline executor
//!
//! Stages run strictly in sequence. Every stage but the last must resolve to
//! exactly one story; the last may expand, in which case its input (the state
//! before the transformation) is prepended so the caller sees the full
//! trajectory.

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::pipeline::Pipeline;
use crate::runner::StageRunner;
use starpipe_stage::StageSpec;
use starpipe_story::{Stories, StoryNode};
use std::sync::Arc;

/// Runs pipelines and single-stage applications
#[derive(Clone)]
pub struct PipelineExecutor {
    config: PipelineConfig,
    runner: Arc<dyn StageRunner>,
}

impl std::fmt::Debug for PipelineExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineExecutor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for PipelineExecutor {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

impl PipelineExecutor {
    /// Create an executor that runs stages as external processes
    #[must_use]
    pub fn new(config: PipelineConfig) -> Self {
        let runner = Arc::new(config.invoker());
        Self { config, runner }
    }

    /// Create with custom stage runner
    #[must_use]
    pub fn with_runner(config: PipelineConfig, runner: Arc<dyn StageRunner>) -> Self {
        Self { config, runner }
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every stage of `pipeline`
    ///
    /// # Arguments
    /// * `pipeline` - generator first, terminal stage last
    ///
    /// # Errors
    /// - `Stage` if any invocation fails (later stages are not run)
    /// - `UnexpectedExpansion` if a stage other than the terminal one, or the
    ///   generator, yields several stories
    #[tracing::instrument(name = "pipeline", skip_all, fields(stages = pipeline.len()))]
    pub async fn run(&self, pipeline: &Pipeline) -> PipelineResult<Stories> {
        let (generator, middle, terminal) = pipeline.split()?;

        let mut current = self.run_single(0, generator, None).await?;
        for (offset, stage) in middle.iter().enumerate() {
            current = self.run_single(offset + 1, stage, Some(&current)).await?;
        }

        match terminal {
            Some(stage) => self.run_terminal(pipeline.len() - 1, stage, &current).await,
            None => Ok(Stories::Single(current)),
        }
    }

    /// Run a stage list
    ///
    /// # Errors
    /// `EmptyPipeline` for an empty list, otherwise as [`run`](Self::run).
    pub async fn run_stages(&self, stages: Vec<StageSpec>) -> PipelineResult<Stories> {
        self.run(&Pipeline::from_stages(stages)?).await
    }

    /// Run one more stage against an existing story
    ///
    /// The stage is treated as terminal: a single result is returned as is,
    /// an expansion comes back with `node` prepended.
    ///
    /// # Errors
    /// `Stage` if the invocation fails.
    #[tracing::instrument(name = "apply", skip_all, fields(stage = %stage.id()))]
    pub async fn apply(&self, node: &StoryNode, stage: &StageSpec) -> PipelineResult<Stories> {
        self.run_terminal(0, stage, node).await
    }

    async fn invoke(
        &self,
        index: usize,
        stage: &StageSpec,
        input: Option<&StoryNode>,
    ) -> PipelineResult<Stories> {
        tracing::info!(index, stage = %stage.id(), has_input = input.is_some(), "running stage");
        self.runner
            .run_stage(stage, input)
            .await
            .map_err(|e| PipelineError::stage(index, stage.id(), e))
    }

    async fn run_single(
        &self,
        index: usize,
        stage: &StageSpec,
        input: Option<&StoryNode>,
    ) -> PipelineResult<StoryNode> {
        self.invoke(index, stage, input)
            .await?
            .into_single()
            .map_err(|stories| {
                tracing::warn!(index, stage = %stage.id(), count = stories.len(), "non-terminal stage expanded");
                PipelineError::UnexpectedExpansion {
                    index,
                    stage: stage.id().to_string(),
                    count: stories.len(),
                }
            })
    }

    async fn run_terminal(
        &self,
        index: usize,
        stage: &StageSpec,
        input: &StoryNode,
    ) -> PipelineResult<Stories> {
        let result = self.invoke(index, stage, Some(input)).await?;
        if result.is_many() {
            tracing::info!(index, count = result.len(), "terminal stage expanded, prepending its input");
            return Ok(result.prepend(input.clone()));
        }
        Ok(result)
    }
}
