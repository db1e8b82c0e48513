//! starpipe stage invocation
//!
//! Runs one external, stateless stage process: the input story (if any) is
//! serialized into a spooled buffer and fed to the process's stdin, stdout is
//! streamed line by line into the incremental story parser, and stderr plus
//! the exit status are captured for error reporting.
//!
//! # Example
//!
//! ```rust,ignore
//! use starpipe_stage::{StageInvoker, StageSpec};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let invoker = StageInvoker::new();
//! let king = StageSpec::from_command_line("makeking -w 1.5 -n 5 -i -s 42")?;
//! let mass = StageSpec::from_command_line("makemass -i -l 0.1 -u 20 -s 42")?;
//!
//! let cluster = invoker.run(&king, None).await?.into_single().unwrap();
//! let with_masses = invoker.run(&mass, Some(&cluster)).await?;
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

pub mod args;
pub mod error;
mod input;
pub mod invoker;
pub mod spec;

pub use args::{ArgValue, ArgvBuilder, StageArgs};
pub use error::{ArgvError, StageError, StageResult};
pub use invoker::{StageInvoker, DEFAULT_SPILL_THRESHOLD, DEFAULT_STDERR_LIMIT};
pub use spec::StageSpec;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
