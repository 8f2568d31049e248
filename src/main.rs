use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use gapsim::{
    engine::{Engine, EngineSettings},
    report::{OutputFormat, ReportWriter},
    scenario::{Scenario, ScenarioLoader},
};

#[derive(Debug, Parser)]
#[command(author, version, about = "JABOWA-style forest gap model")]
struct Cli {
    /// Path to a scenario YAML file (built-in Hubbard Brook setup when omitted)
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Override the number of simulated years
    #[arg(long)]
    years: Option<u64>,

    /// Override the number of plots
    #[arg(long)]
    plots: Option<usize>,

    /// Override the random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override the years between plot records (0 disables them)
    #[arg(long)]
    output_interval: Option<u64>,

    /// Write records to this file instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Advance plots on a single thread
    #[arg(long)]
    sequential: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut scenario = match &cli.scenario {
        Some(path) => ScenarioLoader::new(".").load(path)?,
        None => Scenario::default(),
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&scenario.logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    if let Some(plots) = cli.plots {
        scenario.plots = plots;
    }
    if let Some(seed) = cli.seed {
        scenario.seed = seed;
    }
    if let Some(interval) = cli.output_interval {
        scenario.output_interval = interval;
    }
    if cli.sequential {
        scenario.parallel = false;
    }
    let years = scenario.years(cli.years);

    let forest = scenario.build_forest()?;
    let mut engine = Engine::new(forest, EngineSettings::from_scenario(&scenario));

    let out: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    let mut writer = ReportWriter::new(out, cli.format);
    engine.run(years, &mut writer)?;
    Ok(())
}
