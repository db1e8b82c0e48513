//! Stage arguments and the argument-vector builder seam

use crate::error::ArgvError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One keyword argument value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgValue {
    /// Switch
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Floating-point value
    Float(f64),
    /// Free text
    Text(String),
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for ArgValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ArgValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for ArgValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for ArgValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Keyword arguments for a stage, keyed by option name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageArgs(BTreeMap<String, ArgValue>);

impl StageArgs {
    /// Create empty arguments
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With argument
    #[inline]
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Set argument, returning the previous value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ArgValue>) -> Option<ArgValue> {
        self.0.insert(key.into(), value.into())
    }

    /// Look up argument
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ArgValue> {
        self.0.get(key)
    }

    /// Argument names in order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of arguments
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no arguments are set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<ArgValue>> FromIterator<(K, V)> for StageArgs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Builds a command-line token vector for a named stage
///
/// Implemented outside the core (for example by an option catalog). The
/// returned vector starts with the program name.
pub trait ArgvBuilder: Send + Sync {
    /// Build argv for `stage` from keyword arguments
    ///
    /// # Errors
    /// Implementation-defined, e.g. unknown stage or missing required option.
    fn build(&self, stage: &str, args: &StageArgs) -> Result<Vec<String>, ArgvError>;
}

impl<F> ArgvBuilder for F
where
    F: Fn(&str, &StageArgs) -> Result<Vec<String>, ArgvError> + Send + Sync,
{
    fn build(&self, stage: &str, args: &StageArgs) -> Result<Vec<String>, ArgvError> {
        self(stage, args)
    }
}
