//! starpipe pipeline execution
//!
//! Chains external stages so that each stage's output story becomes the next
//! stage's input. The generator stage runs with no input, intermediate stages
//! must resolve to exactly one story, and only the terminal stage may expand
//! into a sequence (for example successive snapshots of an integration); an
//! expansion is returned with the terminal stage's input prepended.
//!
//! # Example
//!
//! ```rust,ignore
//! use starpipe_pipeline::{Pipeline, PipelineConfig, PipelineExecutor};
//! use starpipe_stage::StageSpec;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pipeline = Pipeline::starting_with(StageSpec::from_command_line("makeking -n 100 -w 6")?)
//!     .then(StageSpec::from_command_line("makemass -f 1 -l 0.1 -u 20")?)
//!     .then(StageSpec::from_command_line("kira -t 1 -d 0.25 -D 0.25")?)
//!     .build();
//!
//! let executor = PipelineExecutor::new(PipelineConfig::new().with_default_timeout_secs(600));
//! let trajectory = executor.run(&pipeline).await?;
//! println!("{} snapshots", trajectory.len());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod executor;
mod pipeline;
mod runner;

pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult};
pub use executor::PipelineExecutor;
pub use pipeline::{Pipeline, PipelineBuilder};
pub use runner::StageRunner;

/// Prelude for common imports
pub mod prelude {
    pub use crate::{
        Pipeline, PipelineConfig, PipelineError, PipelineExecutor, PipelineResult, StageRunner,
    };
    pub use starpipe_stage::{StageArgs, StageError, StageSpec};
    pub use starpipe_story::{Stories, StoryNode};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
