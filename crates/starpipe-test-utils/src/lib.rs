//! Testing utilities for the starpipe workspace
//!
//! Story fixtures, shell-script stages and a scripted stage runner.

#![allow(missing_docs)]

use parking_lot::Mutex;
use starpipe_pipeline::StageRunner;
use starpipe_stage::{StageError, StageResult, StageSpec};
use starpipe_story::{parse_str, Stories, StoryNode};
use std::collections::{HashMap, VecDeque};

/// Two-particle King-model snapshot as written by `makeking -n 2`
pub const KING_SNAPSHOT: &str = "\
(Particle
  N = 2
(Log
  ===>  Fri Feb  5 12:14:42 2016
       makeking -w 1.5 -s 1454677882 -n 2 -i
)Log
(Dynamics
  system_time = 0
  m = 1
)Dynamics
(Particle
  i = 1
  N = 1
(Dynamics
  m = 0.5
  r = -0.4 0.1 0.2
)Dynamics
)Particle
(Particle
  i = 2
  N = 1
(Dynamics
  m = 0.5
  r = 0.4 -0.1 -0.2
)Dynamics
)Particle
)Particle
";

/// Two successive snapshots of an integration
pub const TRAJECTORY: &str = "\
(Particle
  N = 1
(Dynamics
  system_time = 0.5
)Dynamics
)Particle
(Particle
  N = 1
(Dynamics
  system_time = 1
)Dynamics
)Particle
";

pub fn king_snapshot() -> StoryNode {
    parse_str(KING_SNAPSHOT).unwrap().into_single().unwrap()
}

pub fn trajectory() -> Vec<StoryNode> {
    parse_str(TRAJECTORY).unwrap().into_vec()
}

/// Minimal snapshot tagged with a system time
pub fn snapshot_at(time: &str) -> StoryNode {
    StoryNode::new("Particle")
        .with_attribute("N", "1")
        .with_child(StoryNode::new("Dynamics").with_attribute("system_time", time))
}

/// Stage running `script` under `/bin/sh -c`
pub fn sh_stage(id: &str, script: &str) -> StageSpec {
    StageSpec::from_argv(
        id,
        vec!["sh".to_string(), "-c".to_string(), script.to_string()],
    )
    .unwrap()
}

/// Stage that prints `text` and ignores its input
pub fn emit_stage(id: &str, text: &str) -> StageSpec {
    let escaped = text.replace('\'', r"'\''");
    sh_stage(id, &format!("cat > /dev/null; printf '%s' '{escaped}'"))
}

#[derive(Debug, Clone)]
enum Scripted {
    Output(Stories),
    Failure { status: Option<i32>, stderr: String },
}

/// One recorded invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub stage: String,
    pub input: Option<StoryNode>,
}

/// Fake runner returning preset outputs per stage id, in call order
///
/// A stage with several queued outputs returns them one per call; the last
/// one repeats. Unknown stages fail as if the program did not exist.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    scripts: Mutex<HashMap<String, VecDeque<Scripted>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn on(self, stage: &str, output: impl Into<Stories>) -> Self {
        self.push(stage, Scripted::Output(output.into()));
        self
    }

    #[must_use]
    pub fn expanding(self, stage: &str, outputs: Vec<StoryNode>) -> Self {
        self.push(stage, Scripted::Output(Stories::Many(outputs)));
        self
    }

    #[must_use]
    pub fn failing(self, stage: &str, status: i32, stderr: &str) -> Self {
        self.push(
            stage,
            Scripted::Failure {
                status: Some(status),
                stderr: stderr.to_string(),
            },
        );
        self
    }

    fn push(&self, stage: &str, scripted: Scripted) {
        self.scripts
            .lock()
            .entry(stage.to_string())
            .or_default()
            .push_back(scripted);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn called_stages(&self) -> Vec<String> {
        self.calls.lock().iter().map(|c| c.stage.clone()).collect()
    }

    fn next_for(&self, stage: &str) -> Option<Scripted> {
        let mut scripts = self.scripts.lock();
        let queue = scripts.get_mut(stage)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait::async_trait]
impl StageRunner for ScriptedRunner {
    async fn run_stage(
        &self,
        stage: &StageSpec,
        input: Option<&StoryNode>,
    ) -> StageResult<Stories> {
        self.calls.lock().push(RecordedCall {
            stage: stage.id().to_string(),
            input: input.cloned(),
        });

        match self.next_for(stage.id()) {
            Some(Scripted::Output(stories)) => Ok(stories),
            Some(Scripted::Failure { status, stderr }) => Err(StageError::Failed {
                stage: stage.id().to_string(),
                status,
                stderr,
            }),
            None => Err(StageError::Spawn {
                stage: stage.id().to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no scripted output"),
            }),
        }
    }
}
