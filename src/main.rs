use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::warn;

use mcvary::config::{AmbiguityPolicy, SamplingMode, VaryConfig};
use mcvary::lines::parse_name_list;
use mcvary::run::{run_batch, table_names};
use mcvary::telemetry::init_tracing;

#[derive(Debug, Parser)]
#[command(name = "mcvary")]
#[command(version, about = "Monte Carlo variation of fixed-column simulation input files")]
struct Cli {
    /// Scalar file prefixes (`<prefix>_mc0.inp`), delimited by anything other
    /// than letters, digits, underscores or apostrophes. Tables come from the
    /// table list file or `--tables`
    names: String,

    /// Test simulation with no variation (all coefficients zero)
    #[arg(short = 'z', long)]
    zero_run: bool,

    /// Accepted for compatibility; has no effect
    #[arg(short = 's', long)]
    save: bool,

    /// Seed for reproducible random runs
    #[arg(long, conflicts_with = "zero_run")]
    seed: Option<u64>,

    /// Table names, overriding the table list file
    #[arg(long)]
    tables: Option<String>,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory all input and output paths are resolved against
    #[arg(long)]
    root: Option<PathBuf>,

    /// Leave lines matched by several keys unchanged instead of aborting
    #[arg(long)]
    skip_ambiguous: bool,

    /// Debug-level logging unless MCVARY_LOG is set
    #[arg(short, long)]
    verbose: bool,
}

fn resolve_config(cli: &Cli) -> Result<VaryConfig> {
    let mut cfg = match &cli.config {
        Some(path) => VaryConfig::from_toml_file(path)
            .with_context(|| format!("failed to load config: {}", path.display()))?,
        None => VaryConfig::default(),
    };

    if let Some(root) = &cli.root {
        cfg.root = root.clone();
    }
    if cli.zero_run {
        cfg.sampling = SamplingMode::Zero;
    } else if let Some(seed) = cli.seed {
        cfg.sampling = SamplingMode::Normal { seed: Some(seed) };
    }
    if cli.skip_ambiguous {
        cfg.on_ambiguous_key = AmbiguityPolicy::Skip;
    }

    cfg.validate()?;
    Ok(cfg)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.save {
        warn!("--save has no effect and is ignored");
    }

    let cfg = resolve_config(&cli)?;
    let tables = match &cli.tables {
        Some(raw) => parse_name_list(raw),
        None => table_names(&cfg).context("failed to read the table list")?,
    };
    let scalars = parse_name_list(&cli.names);

    let summary = run_batch(&cfg, &tables, &scalars).context("variation run aborted")?;

    for report in summary.tables.iter().chain(&summary.scalars) {
        println!(
            "{}: {} lines varied -> {}",
            report.name,
            report.varied_lines,
            report.output.display()
        );
    }
    println!(
        "Varied {} table(s) and {} scalar file(s)",
        summary.tables.len(),
        summary.scalars.len()
    );

    Ok(())
}
