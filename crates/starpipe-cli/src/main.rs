//! `starpipe` command-line tool

mod config;
mod logging;

use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use config::{parse_keyword, PipelineFile};
use starpipe_catalog::{Catalog, CatalogArgvBuilder, FixedSeed};
use starpipe_pipeline::{Pipeline, PipelineConfig, PipelineExecutor};
use starpipe_stage::{ArgValue, StageArgs, StageSpec};
use starpipe_story::{parse_reader, LineNormalization, ParseOptions, Stories};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;

fn cli() -> Command {
    Command::new("starpipe")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Parse story snapshots and run pipelines of N-body snapshot tools")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .global(true)
                .value_name("FILTER")
                .help("Log filter directives (overrides RUST_LOG)"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON"),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .global(true)
                .value_parser(value_parser!(u32))
                .help("Seed for catalog stages that take one (random if omitted)"),
        )
        .subcommand(
            Command::new("parse")
                .about("Parse story text and print it in canonical form")
                .arg(
                    Arg::new("file")
                        .value_parser(value_parser!(PathBuf))
                        .help("Input file (stdin if omitted)"),
                )
                .arg(
                    Arg::new("trim")
                        .long("trim")
                        .action(ArgAction::SetTrue)
                        .help("Strip trailing whitespace from every line"),
                )
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("run")
                .about("Run a pipeline; the first stage is a generator")
                .arg(
                    Arg::new("config")
                        .long("config")
                        .short('c')
                        .value_parser(value_parser!(PathBuf))
                        .help("Pipeline TOML file"),
                )
                .arg(stage_arg().help("Stage command line, appended after config stages"))
                .arg(timeout_arg())
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("apply")
                .about("Run one stage against an existing story")
                .arg(
                    Arg::new("input")
                        .long("input")
                        .short('i')
                        .value_parser(value_parser!(PathBuf))
                        .help("Input story file (stdin if omitted)"),
                )
                .arg(
                    stage_arg()
                        .action(ArgAction::Set)
                        .conflicts_with("catalog")
                        .help("Stage command line"),
                )
                .arg(
                    Arg::new("catalog")
                        .long("catalog")
                        .value_name("STAGE")
                        .help("Catalog stage to build from --arg values"),
                )
                .arg(
                    Arg::new("arg")
                        .long("arg")
                        .short('a')
                        .value_name("KEY=VALUE")
                        .action(ArgAction::Append)
                        .value_parser(parse_keyword)
                        .requires("catalog")
                        .help("Catalog stage argument"),
                )
                .arg(timeout_arg())
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("stages")
                .about("List catalog stages, or describe one")
                .arg(Arg::new("name").help("Stage to describe")),
        )
}

fn stage_arg() -> Arg {
    Arg::new("stage")
        .long("stage")
        .short('s')
        .value_name("COMMAND")
        .action(ArgAction::Append)
}

fn timeout_arg() -> Arg {
    Arg::new("timeout")
        .long("timeout")
        .value_name("SECS")
        .value_parser(value_parser!(u64))
        .help("Deadline for stages without their own")
}

fn json_arg() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Print stories as JSON")
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    let Some((command, args)) = matches.subcommand() else {
        return Ok(());
    };

    // Global options are propagated into the subcommand's matches.
    logging::init(
        args.get_one::<String>("log-level").map(String::as_str),
        args.get_flag("log-json"),
    )?;

    let builder = match args.get_one::<u32>("seed") {
        Some(seed) => CatalogArgvBuilder::standard().with_seed_source(FixedSeed(*seed)),
        None => CatalogArgvBuilder::standard(),
    };

    match command {
        "parse" => parse(args),
        "run" => run(args, &builder).await,
        "apply" => apply(args, &builder).await,
        "stages" => stages(args, builder.catalog()),
        other => bail!("unknown command '{other}'"),
    }
}

fn parse(args: &ArgMatches) -> Result<()> {
    let normalization = if args.get_flag("trim") {
        LineNormalization::TrimTrailingWhitespace
    } else {
        LineNormalization::Terminator
    };
    let stories = read_stories(args.get_one::<PathBuf>("file"), normalization)?;
    tracing::info!(count = stories.len(), "parsed stories");
    emit(&stories, args.get_flag("json"))
}

async fn run(args: &ArgMatches, builder: &CatalogArgvBuilder) -> Result<()> {
    let file = match args.get_one::<PathBuf>("config") {
        Some(path) => PipelineFile::load(path)?,
        None => PipelineFile::default(),
    };

    let mut stages = file.stage_specs(builder)?;
    for line in args.get_many::<String>("stage").into_iter().flatten() {
        stages.push(StageSpec::from_command_line(line)?);
    }
    if stages.is_empty() {
        bail!("no stages given; use --config or --stage");
    }

    let config = with_timeout(file.pipeline, args.get_one::<u64>("timeout"));
    config.validate()?;
    let pipeline = Pipeline::from_stages(stages)?;
    tracing::info!(stages = pipeline.len(), "starting pipeline");

    let stories = PipelineExecutor::new(config).run(&pipeline).await?;
    emit(&stories, args.get_flag("json"))
}

async fn apply(args: &ArgMatches, builder: &CatalogArgvBuilder) -> Result<()> {
    let stage = match (
        args.get_one::<String>("stage"),
        args.get_one::<String>("catalog"),
    ) {
        (Some(line), _) => StageSpec::from_command_line(line)?,
        (None, Some(name)) => {
            let stage_args: StageArgs = args
                .get_many::<(String, ArgValue)>("arg")
                .into_iter()
                .flatten()
                .cloned()
                .collect();
            StageSpec::from_builder(builder, name, &stage_args)?
        }
        (None, None) => bail!("no stage given; use --stage or --catalog"),
    };

    let input = read_stories(args.get_one::<PathBuf>("input"), LineNormalization::Terminator)?
        .into_single()
        .map_err(|stories| anyhow::anyhow!("expected one input story, found {}", stories.len()))?;

    let config = with_timeout(PipelineConfig::new(), args.get_one::<u64>("timeout"));
    config.validate()?;
    let stories = PipelineExecutor::new(config).apply(&input, &stage).await?;
    emit(&stories, args.get_flag("json"))
}

fn stages(args: &ArgMatches, catalog: &Catalog) -> Result<()> {
    let mut out = io::stdout().lock();
    match args.get_one::<String>("name") {
        Some(name) => {
            let text = catalog
                .describe(name)
                .with_context(|| format!("unknown stage '{name}'"))?;
            write!(out, "{text}")?;
        }
        None => {
            for name in catalog.names() {
                let summary = catalog.get(name).map_or("", |s| s.summary);
                writeln!(out, "{name:<14} {summary}")?;
            }
        }
    }
    Ok(())
}

fn with_timeout(config: PipelineConfig, secs: Option<&u64>) -> PipelineConfig {
    match secs {
        Some(secs) => config.with_default_timeout_secs(*secs),
        None => config,
    }
}

fn read_stories(path: Option<&PathBuf>, normalization: LineNormalization) -> Result<Stories> {
    let options = ParseOptions::new().with_normalization(normalization);
    let reader: Box<dyn BufRead> = match path {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("cannot open {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };
    let source = path.map_or_else(|| "stdin".to_string(), |p| p.display().to_string());
    parse_reader(reader, options).with_context(|| format!("cannot parse stories from {source}"))
}

fn emit(stories: &Stories, json: bool) -> Result<()> {
    let mut out = BufWriter::new(io::stdout().lock());
    if json {
        serde_json::to_writer_pretty(&mut out, stories)?;
        writeln!(out)?;
    } else {
        for story in stories {
            starpipe_story::write_story(story, &mut out)?;
        }
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_definition_is_valid() {
        cli().debug_assert();
    }

    #[test]
    fn apply_stage_and_catalog_conflict() {
        let result = cli().try_get_matches_from([
            "starpipe", "apply", "--stage", "cat", "--catalog", "scale",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn catalog_args_collected() {
        let matches = cli()
            .try_get_matches_from([
                "starpipe", "--seed", "3", "apply", "--catalog", "scale", "-a", "m=1", "-a", "s",
            ])
            .unwrap();
        let (_, sub) = matches.subcommand().unwrap();
        let args: Vec<_> = sub
            .get_many::<(String, ArgValue)>("arg")
            .unwrap()
            .cloned()
            .collect();
        assert_eq!(args.len(), 2);
        assert_eq!(sub.get_one::<u32>("seed"), Some(&3));
    }
}
