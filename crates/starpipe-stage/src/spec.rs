//! Stage specifications

use crate::args::{ArgvBuilder, StageArgs};
use crate::error::ArgvError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One external stage: identifier, argument vector and optional deadline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StageSpecFields")]
pub struct StageSpec {
    id: String,
    argv: Vec<String>,
    #[serde(serialize_with = "opt_secs::serialize")]
    timeout: Option<Duration>,
}

/// Deserialized form, checked through [`StageSpec::from_argv`]
#[derive(Deserialize)]
struct StageSpecFields {
    id: String,
    argv: Vec<String>,
    #[serde(default, deserialize_with = "opt_secs::deserialize")]
    timeout: Option<Duration>,
}

impl TryFrom<StageSpecFields> for StageSpec {
    type Error = ArgvError;

    fn try_from(fields: StageSpecFields) -> Result<Self, Self::Error> {
        let spec = Self::from_argv(fields.id, fields.argv)?;
        Ok(match fields.timeout {
            Some(limit) => spec.with_timeout(limit),
            None => spec,
        })
    }
}

impl StageSpec {
    /// Create from an explicit argument vector
    ///
    /// # Errors
    /// `EmptyCommand` if `argv` is empty.
    pub fn from_argv(id: impl Into<String>, argv: Vec<String>) -> Result<Self, ArgvError> {
        if argv.is_empty() {
            return Err(ArgvError::EmptyCommand);
        }
        Ok(Self {
            id: id.into(),
            argv,
            timeout: None,
        })
    }

    /// Create from a command line split on whitespace; the program is the id
    ///
    /// # Errors
    /// `EmptyCommand` if the line has no tokens.
    pub fn from_command_line(line: &str) -> Result<Self, ArgvError> {
        let argv: Vec<String> = line.split_whitespace().map(str::to_string).collect();
        let id = argv.first().cloned().ok_or(ArgvError::EmptyCommand)?;
        Self::from_argv(id, argv)
    }

    /// Create through an argument-vector builder
    ///
    /// # Errors
    /// Whatever the builder reports, or `EmptyCommand` for an empty vector.
    pub fn from_builder(
        builder: &dyn ArgvBuilder,
        id: &str,
        args: &StageArgs,
    ) -> Result<Self, ArgvError> {
        Self::from_argv(id, builder.build(id, args)?)
    }

    /// With deadline
    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Stage identifier
    #[inline]
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Full argument vector, program first
    #[inline]
    #[must_use]
    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    /// Program to execute
    #[must_use]
    pub fn program(&self) -> &str {
        // from_argv guarantees at least one token
        self.argv.first().map_or("", String::as_str)
    }

    /// Stage-specific deadline
    #[inline]
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

mod opt_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub(super) fn serialize<S: Serializer>(value: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        value.map(|d| d.as_secs_f64()).serialize(s)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        let secs = Option::<f64>::deserialize(d)?;
        secs.map(|s| Duration::try_from_secs_f64(s).map_err(serde::de::Error::custom))
            .transpose()
    }
}
