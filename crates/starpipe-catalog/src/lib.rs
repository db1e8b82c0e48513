//! starpipe option catalog
//!
//! A data table mapping stage names to their option schemas, plus
//! [`CatalogArgvBuilder`], an implementation of the
//! [`ArgvBuilder`](starpipe_stage::ArgvBuilder) seam that turns keyword
//! arguments into a command line. Seed options draw their default from an
//! injectable [`SeedSource`] so runs can be made reproducible.
//!
//! # Example
//!
//! ```rust
//! use starpipe_catalog::{CatalogArgvBuilder, FixedSeed};
//! use starpipe_stage::StageArgs;
//!
//! let builder = CatalogArgvBuilder::standard().with_seed_source(FixedSeed(1454677882));
//! let args = StageArgs::new().with("w", 1.5).with("n", 5_i64).with("i", true);
//! let argv = builder.argv("makeking", &args).unwrap();
//! assert_eq!(
//!     argv,
//!     vec!["makeking", "-b", "0", "-i", "-n", "5", "-s", "1454677882", "-w", "1.5"]
//! );
//! ```

#![warn(unreachable_pub)]

mod builder;
mod catalog;
pub mod error;
mod seed;
mod tables;

pub use builder::CatalogArgvBuilder;
pub use catalog::{Catalog, OptionKind, OptionSpec, StageSchema};
pub use error::CatalogError;
pub use seed::{FixedSeed, RandomSeeds, SeedSource, SequentialSeeds};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
