//! Pipeline file loading

use anyhow::{Context, Result};
use serde::Deserialize;
use starpipe_pipeline::PipelineConfig;
use starpipe_stage::{ArgValue, ArgvBuilder, StageArgs, StageSpec};
use std::path::Path;
use std::time::Duration;

/// Contents of a pipeline TOML file
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct PipelineFile {
    #[serde(default)]
    pub(crate) pipeline: PipelineConfig,
    #[serde(default)]
    pub(crate) stages: Vec<StageEntry>,
}

/// One `[[stages]]` table
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum StageEntry {
    Command(CommandStage),
    Catalog(CatalogStage),
}

/// Raw command stage
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct CommandStage {
    command: CommandLine,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    timeout_secs: Option<f64>,
}

/// Stage built through the option catalog
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct CatalogStage {
    id: String,
    #[serde(default)]
    args: StageArgs,
    #[serde(default)]
    timeout_secs: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CommandLine {
    Line(String),
    Tokens(Vec<String>),
}

impl PipelineFile {
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read pipeline file {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("invalid pipeline file {}", path.display()))
    }

    pub(crate) fn from_toml(text: &str) -> Result<Self> {
        let file: Self = toml::from_str(text)?;
        file.pipeline.validate()?;
        Ok(file)
    }

    pub(crate) fn stage_specs(&self, builder: &dyn ArgvBuilder) -> Result<Vec<StageSpec>> {
        self.stages
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                entry
                    .to_spec(builder)
                    .with_context(|| format!("stage {index} in pipeline file"))
            })
            .collect()
    }
}

impl StageEntry {
    pub(crate) fn to_spec(&self, builder: &dyn ArgvBuilder) -> Result<StageSpec> {
        let (spec, timeout) = match self {
            Self::Command(stage) => {
                let spec = match (&stage.command, &stage.id) {
                    (CommandLine::Line(line), None) => StageSpec::from_command_line(line)?,
                    (CommandLine::Line(line), Some(id)) => StageSpec::from_argv(
                        id.clone(),
                        line.split_whitespace().map(str::to_string).collect(),
                    )?,
                    (CommandLine::Tokens(tokens), id) => {
                        let id = id
                            .clone()
                            .or_else(|| tokens.first().cloned())
                            .unwrap_or_default();
                        StageSpec::from_argv(id, tokens.clone())?
                    }
                };
                (spec, stage.timeout_secs)
            }
            Self::Catalog(stage) => (
                StageSpec::from_builder(builder, &stage.id, &stage.args)?,
                stage.timeout_secs,
            ),
        };
        match timeout {
            Some(secs) => {
                let limit = Duration::try_from_secs_f64(secs)
                    .with_context(|| format!("invalid timeout_secs {secs}"))?;
                Ok(spec.with_timeout(limit))
            }
            None => Ok(spec),
        }
    }
}

/// Parse a `KEY=VALUE` stage argument; a bare `KEY` means `KEY=true`
pub(crate) fn parse_keyword(raw: &str) -> Result<(String, ArgValue), String> {
    let (key, value) = raw.split_once('=').unwrap_or((raw, "true"));
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("expected KEY=VALUE, got '{raw}'"));
    }
    Ok((key.to_string(), typed_value(value.trim())))
}

fn typed_value(text: &str) -> ArgValue {
    match text {
        "true" => ArgValue::Bool(true),
        "false" => ArgValue::Bool(false),
        _ => text
            .parse::<i64>()
            .map(ArgValue::Int)
            .or_else(|_| text.parse::<f64>().map(ArgValue::Float))
            .unwrap_or_else(|_| ArgValue::Text(text.to_string())),
    }
}
