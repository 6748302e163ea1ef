use crate::config::load_config;
use crate::expansion::ExpansionState;
use crate::explore::explore;
use crate::export::{to_mermaid, write_exploration_json, write_text_output};
use crate::ir::GraphData;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "gexp",
    version,
    about = "Collapse a large issue dependency graph into an explorable one"
)]
pub struct Args {
    /// Graph JSON file ({nodes, edges}) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "json")]
    pub output_format: OutputFormat,

    /// Config file (JSON5) with typeHierarchy and window sections
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Expansion state snapshot (JSON)
    #[arg(short = 's', long = "state")]
    pub state: Option<PathBuf>,

    /// Toggle the primary bucket starting at this index (repeatable)
    #[arg(long = "expand-bucket")]
    pub expand_bucket: Vec<usize>,

    /// Toggle the secondary group with this node id (repeatable)
    #[arg(long = "expand-group")]
    pub expand_group: Vec<String>,

    /// Visible primary tier count
    #[arg(long = "visible-primary")]
    pub visible_primary: Option<usize>,

    /// Secondary tier budget per primary node
    #[arg(long = "secondary-budget")]
    pub secondary_budget: Option<usize>,

    /// Tactical budget per parent
    #[arg(long = "tactical-budget")]
    pub tactical_budget: Option<usize>,

    /// Split hidden primaries into buckets of this size
    #[arg(long = "bucket-size")]
    pub bucket_size: Option<usize>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Json,
    Mermaid,
}

pub fn run() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut config = load_config(args.config.as_deref())
        .with_context(|| format!("failed to load config {:?}", args.config))?;
    if let Some(v) = args.visible_primary {
        config.window.visible_primary_tier_count = v;
    }
    if let Some(v) = args.secondary_budget {
        config.window.secondary_tier_budget = v;
    }
    if let Some(v) = args.tactical_budget {
        config.window.tactical_budget = v;
    }
    if let Some(v) = args.bucket_size {
        config.window.primary_bucket_size = Some(v);
    }

    let mut state = read_state(args.state.as_deref())?;
    for start in &args.expand_bucket {
        state.toggle_bucket(*start);
    }
    for group in &args.expand_group {
        state.toggle_group(group);
    }

    let input = read_input(args.input.as_deref())?;
    let graph: GraphData = serde_json::from_str(&input).context("input is not a graph document")?;
    let explored = explore(&graph, &config, &state);

    match args.output_format {
        OutputFormat::Json => write_exploration_json(args.output.as_deref(), &explored)?,
        OutputFormat::Mermaid => write_text_output(args.output.as_deref(), &to_mermaid(&explored))?,
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return Ok(std::fs::read_to_string(path)?);
        }
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn read_state(path: Option<&Path>) -> Result<ExpansionState> {
    let Some(path) = path else {
        return Ok(ExpansionState::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_state(&contents)
}

fn parse_state(contents: &str) -> Result<ExpansionState> {
    if contents.trim().is_empty() {
        return Ok(ExpansionState::default());
    }
    serde_json::from_str(contents).map_err(|err| anyhow::anyhow!("invalid expansion state: {err}"))
}
