//! Pipeline declaration

use crate::error::{PipelineError, PipelineResult};
use starpipe_stage::StageSpec;

/// Ordered, non-empty list of stages
///
/// The first stage is a generator (it runs with no input); the last stage is
/// the only one allowed to expand into several stories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    stages: Vec<StageSpec>,
}

impl Pipeline {
    /// Start a pipeline from its generator stage
    #[inline]
    #[must_use]
    pub fn starting_with(generator: StageSpec) -> PipelineBuilder {
        PipelineBuilder {
            stages: vec![generator],
        }
    }

    /// Build from a stage list
    ///
    /// # Errors
    /// `EmptyPipeline` if `stages` is empty.
    pub fn from_stages(stages: Vec<StageSpec>) -> PipelineResult<Self> {
        if stages.is_empty() {
            return Err(PipelineError::EmptyPipeline);
        }
        Ok(Self { stages })
    }

    /// Stages in execution order
    #[inline]
    #[must_use]
    pub fn stages(&self) -> &[StageSpec] {
        &self.stages
    }

    /// Number of stages
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Always false
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Split into generator, intermediate stages and terminal stage
    ///
    /// The terminal stage is `None` for a single-stage pipeline.
    pub(crate) fn split(&self) -> PipelineResult<(&StageSpec, &[StageSpec], Option<&StageSpec>)> {
        let (generator, rest) = self
            .stages
            .split_first()
            .ok_or(PipelineError::EmptyPipeline)?;
        Ok(match rest.split_last() {
            Some((terminal, middle)) => (generator, middle, Some(terminal)),
            None => (generator, rest, None),
        })
    }
}

/// Builder returned by [`Pipeline::starting_with`]
#[derive(Debug, Clone)]
pub struct PipelineBuilder {
    stages: Vec<StageSpec>,
}

impl PipelineBuilder {
    /// Append a stage
    #[inline]
    #[must_use]
    pub fn then(mut self, stage: StageSpec) -> Self {
        self.stages.push(stage);
        self
    }

    /// Finish the pipeline
    #[inline]
    #[must_use]
    pub fn build(self) -> Pipeline {
        Pipeline {
            stages: self.stages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage(line: &str) -> StageSpec {
        StageSpec::from_command_line(line).unwrap()
    }

    #[test]
    fn builder_keeps_order() {
        let pipeline = Pipeline::starting_with(stage("makeking -n 5 -w 3"))
            .then(stage("makemass -i"))
            .then(stage("kira -t 1"))
            .build();
        let ids: Vec<_> = pipeline.stages().iter().map(StageSpec::id).collect();
        assert_eq!(ids, vec!["makeking", "makemass", "kira"]);

        let (generator, middle, terminal) = pipeline.split().unwrap();
        assert_eq!(generator.id(), "makeking");
        assert_eq!(middle.len(), 1);
        assert_eq!(terminal.map(StageSpec::id), Some("kira"));
    }

    #[test]
    fn single_stage_has_no_terminal() {
        let pipeline = Pipeline::starting_with(stage("makeking")).build();
        let (_, middle, terminal) = pipeline.split().unwrap();
        assert!(middle.is_empty());
        assert!(terminal.is_none());
    }

    #[test]
    fn empty_stage_list_rejected() {
        assert!(matches!(
            Pipeline::from_stages(Vec::new()),
            Err(PipelineError::EmptyPipeline)
        ));
    }
}
