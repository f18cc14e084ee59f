//! blend-cli: replay and inspect brewing cauldron behaviour from the
//! command line.
//!
//! Scenarios are JSON files of ticked inputs; every outcome is printed as one
//! JSON line on stdout. Logs go to stderr.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use blend_core::config::BlendConfig;
use blend_core::recipe::{ReagentKind, TransformKind, TransformRequest};
use blend_core::traits::Persistable;
use blend_core::types::{EffectRecord, VesselInput};
use blend_engine::merge::merge_effects;
use blend_engine::transform::TransformPipeline;
use blend_engine::vessel::Vessel;

/// Potion Blender cauldron engine tool.
#[derive(Parser)]
#[command(name = "blend-cli")]
#[command(version, about = "Mix potions without a world to mix them in.")]
struct Cli {
    /// Config file (default: platform config dir).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error). Overrides the config.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log output format ("text" or "json").
    #[arg(long, global = true, default_value = "text")]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a scenario of ticked inputs against a fresh vessel.
    Simulate(SimulateArgs),
    /// Merge (and optionally transform) a JSON list of effects.
    Merge(MergeArgs),
    /// Configuration file management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Args)]
struct SimulateArgs {
    /// Scenario JSON file.
    scenario: PathBuf,

    /// Override the configured vessel capacity.
    #[arg(long)]
    capacity: Option<usize>,

    /// Restore vessel state from this file before replaying.
    #[arg(long)]
    state_in: Option<PathBuf>,

    /// Save vessel state to this file after replaying.
    #[arg(long)]
    state_out: Option<PathBuf>,
}

#[derive(Args)]
struct MergeArgs {
    /// JSON file holding an array of effects.
    input: PathBuf,

    /// Transform applied after merging.
    #[arg(long, value_enum)]
    transform: Option<TransformArg>,

    /// Transform strength (reagent stack size).
    #[arg(long, default_value_t = 1)]
    strength: u32,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write the default config file.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
    /// Print the effective config.
    Show,
}

#[derive(Clone, Copy, ValueEnum)]
enum TransformArg {
    Dilution,
    Amplify,
    Boost,
}

impl From<TransformArg> for TransformKind {
    fn from(arg: TransformArg) -> Self {
        match arg {
            TransformArg::Dilution => TransformKind::Dilution,
            TransformArg::Amplify => TransformKind::Amplify,
            TransformArg::Boost => TransformKind::Boost,
        }
    }
}

/// One scenario entry.
#[derive(Deserialize, Debug, Clone)]
struct Step {
    tick: u64,
    action: Action,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "snake_case")]
enum Action {
    Effect(EffectRecord),
    Reagent {
        kind: ReagentKind,
        #[serde(default = "one")]
        count: u32,
    },
    CombinedArtifact,
    /// The host's "use" interaction.
    Use,
}

fn one() -> u32 {
    1
}

#[derive(Deserialize, Debug, Clone)]
struct Scenario {
    steps: Vec<Step>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(BlendConfig::default_path);
    let config = if config_path.exists() {
        BlendConfig::load(&config_path)
            .with_context(|| format!("loading config {}", config_path.display()))?
    } else {
        BlendConfig::default()
    };

    let level = cli.log_level.clone().unwrap_or_else(|| config.log_level.clone());
    init_logging(&level, &cli.log_format);

    match cli.command {
        Commands::Simulate(args) => simulate(&config, args),
        Commands::Merge(args) => merge(args),
        Commands::Config { action } => config_command(&config_path, &config, action),
    }
}

fn simulate(config: &BlendConfig, args: SimulateArgs) -> Result<()> {
    let mut config = config.clone();
    if let Some(capacity) = args.capacity {
        config.capacity = capacity;
    }
    config.validate()?;

    let json = fs::read_to_string(&args.scenario)
        .with_context(|| format!("reading scenario {}", args.scenario.display()))?;
    let scenario: Scenario = serde_json::from_str(&json).context("parsing scenario")?;

    let mut vessel = Vessel::new(&config);
    if let Some(path) = &args.state_in {
        let bytes = fs::read(path).with_context(|| format!("reading state {}", path.display()))?;
        if let Some(repair) = vessel.load(&bytes)? {
            warn!(?repair, "restored state needed repair");
        }
    }

    info!(steps = scenario.steps.len(), capacity = config.capacity, "simulating");
    for line in run_scenario(&mut vessel, &scenario.steps) {
        println!("{line}");
    }

    println!(
        "{}",
        json!({
            "final": {
                "state": vessel.state(),
                "held": vessel.held_effects(),
                "color": vessel.contents_color().to_string(),
            }
        })
    );

    if let Some(path) = &args.state_out {
        let bytes = vessel.save()?;
        fs::write(path, bytes).with_context(|| format!("writing state {}", path.display()))?;
        info!(path = %path.display(), "state saved");
    }
    Ok(())
}

/// Replay `steps` and describe each outcome as a JSON value.
fn run_scenario(vessel: &mut Vessel, steps: &[Step]) -> Vec<Value> {
    steps
        .iter()
        .map(|step| {
            let result = match step.action.clone() {
                Action::Use => vessel
                    .use_vessel(step.tick)
                    .map(|dumped| json!({ "dumped": dumped })),
                Action::Effect(record) => vessel
                    .on_input(step.tick, VesselInput::Effect(record))
                    .map(|o| json!(o)),
                Action::Reagent { kind, count } => vessel
                    .on_input(step.tick, VesselInput::Reagent { kind, count })
                    .map(|o| json!(o)),
                Action::CombinedArtifact => vessel
                    .on_input(step.tick, VesselInput::CombinedArtifact)
                    .map(|o| json!(o)),
            };
            match result {
                Ok(outcome) => json!({ "tick": step.tick, "outcome": outcome }),
                Err(e) => json!({ "tick": step.tick, "rejected": e.to_string() }),
            }
        })
        .collect()
}

fn merge(args: MergeArgs) -> Result<()> {
    let json = fs::read_to_string(&args.input)
        .with_context(|| format!("reading effects {}", args.input.display()))?;
    let effects: Vec<EffectRecord> = serde_json::from_str(&json).context("parsing effects")?;
    if effects.is_empty() {
        bail!("no effects to merge");
    }

    let merged = merge_effects(&effects);
    let out = match args.transform {
        Some(kind) => TransformPipeline::new()
            .apply(TransformRequest::new(kind.into(), args.strength), &merged),
        None => merged,
    };
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn config_command(path: &Path, config: &BlendConfig, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Init { force } => {
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            BlendConfig::default().save(path)?;
            println!("wrote {}", path.display());
        }
        ConfigAction::Show => {
            println!("{}", config.to_json_pretty()?);
        }
    }
    Ok(())
}

/// Initialize tracing subscriber with the given log level and output format.
///
/// Pass `format = "json"` for structured JSON output. Any other value
/// defaults to human-readable text. Logs are written to stderr so stdout
/// stays machine-readable.
fn init_logging(level_str: &str, format: &str) {
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level_str));

    if format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_level(true).with_writer(std::io::stderr))
            .init();
    }
}
