//! Stage runner seam

use starpipe_stage::{StageInvoker, StageResult, StageSpec};
use starpipe_story::{Stories, StoryNode};

/// Runs one stage against an optional input story
///
/// [`StageInvoker`] is the production implementation; tests substitute
/// scripted runners.
#[async_trait::async_trait]
pub trait StageRunner: Send + Sync {
    /// Run `stage`, feeding `input` when present
    async fn run_stage(&self, stage: &StageSpec, input: Option<&StoryNode>)
        -> StageResult<Stories>;
}

#[async_trait::async_trait]
impl StageRunner for StageInvoker {
    async fn run_stage(
        &self,
        stage: &StageSpec,
        input: Option<&StoryNode>,
    ) -> StageResult<Stories> {
        self.run(stage, input).await
    }
}
