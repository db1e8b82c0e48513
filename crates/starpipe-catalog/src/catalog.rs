//! Option schema catalog

use crate::tables::STANDARD;
use std::fmt::Write as _;

/// How an option is resolved and rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    /// Must resolve to a value, supplied or default
    Required {
        /// Default used when the caller supplies nothing
        default: Option<&'static str>,
    },
    /// Emitted only when supplied or defaulted
    Value {
        /// Default used when the caller supplies nothing
        default: Option<&'static str>,
    },
    /// Boolean switch, off unless supplied as `true`
    Flag,
    /// Required value whose default comes from the seed source
    Seed,
}

/// One command-line option
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionSpec {
    /// Flag letter(s), without the dash
    pub flag: &'static str,
    /// Long description from the tool's help text
    pub description: &'static str,
    /// Resolution rule
    pub kind: OptionKind,
}

impl OptionSpec {
    pub(crate) const fn required(flag: &'static str, description: &'static str) -> Self {
        Self {
            flag,
            description,
            kind: OptionKind::Required { default: None },
        }
    }

    pub(crate) const fn required_or(
        flag: &'static str,
        description: &'static str,
        default: &'static str,
    ) -> Self {
        Self {
            flag,
            description,
            kind: OptionKind::Required {
                default: Some(default),
            },
        }
    }

    pub(crate) const fn value(flag: &'static str, description: &'static str) -> Self {
        Self {
            flag,
            description,
            kind: OptionKind::Value { default: None },
        }
    }

    pub(crate) const fn value_or(
        flag: &'static str,
        description: &'static str,
        default: &'static str,
    ) -> Self {
        Self {
            flag,
            description,
            kind: OptionKind::Value {
                default: Some(default),
            },
        }
    }

    pub(crate) const fn flag(flag: &'static str, description: &'static str) -> Self {
        Self {
            flag,
            description,
            kind: OptionKind::Flag,
        }
    }

    pub(crate) const fn seed(flag: &'static str) -> Self {
        Self {
            flag,
            description: "specify random seed",
            kind: OptionKind::Seed,
        }
    }

    /// Whether the option must resolve to a value
    #[must_use]
    pub fn is_required(&self) -> bool {
        matches!(self.kind, OptionKind::Required { .. } | OptionKind::Seed)
    }

    /// Help line: `-x: description [default: ..] [required]`
    #[must_use]
    pub fn help_line(&self) -> String {
        let default = match self.kind {
            OptionKind::Required { default } | OptionKind::Value { default } => {
                default.unwrap_or("none")
            }
            OptionKind::Flag => "false",
            OptionKind::Seed => "random",
        };
        let mut line = format!("-{}: {} [default: {}]", self.flag, self.description, default);
        if self.is_required() {
            line.push_str(" [required]");
        }
        line
    }
}

/// Options of one stage, in command-line order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageSchema {
    /// Program name
    pub name: &'static str,
    /// One-line summary
    pub summary: &'static str,
    /// Options in rendering order
    pub options: &'static [OptionSpec],
}

impl StageSchema {
    /// Look up option by flag
    #[must_use]
    pub fn option(&self, flag: &str) -> Option<&OptionSpec> {
        self.options.iter().find(|o| o.flag == flag)
    }
}

/// Catalog of stage schemas
#[derive(Debug, Clone, Copy)]
pub struct Catalog {
    stages: &'static [StageSchema],
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl Catalog {
    /// Catalog of the standard snapshot tools
    #[inline]
    #[must_use]
    pub fn standard() -> Self {
        Self { stages: STANDARD }
    }

    /// Catalog over a custom table
    #[inline]
    #[must_use]
    pub const fn from_table(stages: &'static [StageSchema]) -> Self {
        Self { stages }
    }

    /// Schema for a stage
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&StageSchema> {
        self.stages.iter().find(|s| s.name == name)
    }

    /// Stage names in table order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.stages.iter().map(|s| s.name)
    }

    /// Help listing for one stage
    #[must_use]
    pub fn describe(&self, name: &str) -> Option<String> {
        let schema = self.get(name)?;
        let mut out = format!("{} - {}\n Options:\n", schema.name, schema.summary);
        for option in schema.options {
            let _ = writeln!(out, "  {}", option.help_line());
        }
        Some(out)
    }
}
