//! ANOSIM CLI — run a permutation test on a distance matrix.
//!
//! ```text
//! anosim -d d1.txt -g gd.txt -p 10000
//! anosim --config run.toml --strategy random --seed 7 --json
//! ```
//!
//! Flags override values from `--config`.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};

use anosim_runner::export::{export_json, save_artifacts};
use anosim_runner::{
    profiling, run_anosim, AnosimConfig, AnosimResult, HistoryEntry, RunHistory, StrategyKind,
};

#[derive(Parser)]
#[command(
    name = "anosim",
    about = "ANOSIM — analysis of similarities permutation test",
    version
)]
struct Cli {
    /// Distance matrix file (header ending in N, then N labelled rows).
    #[arg(short = 'd', long = "matrix", value_name = "SAMPLE_FILE")]
    matrix: Option<PathBuf>,

    /// Group label file (N integers).
    #[arg(short = 'g', long = "labels", value_name = "GROUP_LABEL_FILE")]
    labels: Option<PathBuf>,

    /// Maximum number of permutations, the observed labeling included.
    #[arg(short = 'p', long = "permutations", value_name = "N")]
    permutations: Option<u64>,

    /// TOML run configuration.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum)]
    strategy: Option<StrategyArg>,

    /// Seed for the random strategy.
    #[arg(long)]
    seed: Option<u64>,

    /// Worker threads (0 = rayon default).
    #[arg(long)]
    threads: Option<usize>,

    /// Evaluate trials on the calling thread only.
    #[arg(long, default_value_t = false)]
    sequential: bool,

    /// Print the full result as JSON.
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Save manifest.json, ranks.csv and report.md under this directory.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Append the run to a JSONL history file.
    #[arg(long)]
    history: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    Lexicographic,
    Random,
}

impl From<StrategyArg> for StrategyKind {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Lexicographic => StrategyKind::Lexicographic,
            StrategyArg::Random => StrategyKind::Random,
        }
    }
}

fn main() -> Result<()> {
    profiling::init();
    let cli = Cli::parse();

    let config = build_config(&cli)?;
    let run = run_anosim(&config)?;
    let result = &run.result;

    for warning in &result.data_quality_warnings {
        eprintln!("WARNING: {warning}");
    }

    if cli.json {
        println!("{}", export_json(result)?);
    } else {
        write_report(&mut io::stdout().lock(), result)?;
    }

    if let Some(ref dir) = cli.output_dir {
        let run_dir = save_artifacts(&run, dir)?;
        eprintln!("Artifacts saved to: {}", run_dir.display());
    }

    if let Some(ref path) = cli.history {
        RunHistory::new(path.clone())
            .append(&HistoryEntry::from(result))
            .with_context(|| format!("failed to append history: {}", path.display()))?;
    }

    Ok(())
}

/// Merge `--config` (if any) with command-line overrides.
fn build_config(cli: &Cli) -> Result<AnosimConfig> {
    let mut config = match (&cli.config, &cli.matrix, &cli.labels) {
        (Some(path), _, _) => AnosimConfig::load(path)
            .with_context(|| format!("failed to load config: {}", path.display()))?,
        (None, Some(matrix), Some(labels)) => AnosimConfig::new(matrix, labels),
        (None, _, _) => {
            bail!("either --config or both -d <sample_filename> and -g <group_label_filename> are required")
        }
    };

    if let Some(ref matrix) = cli.matrix {
        config.input.matrix = matrix.clone();
    }
    if let Some(ref labels) = cli.labels {
        config.input.labels = labels.clone();
    }

    let search = &mut config.search;
    if let Some(k) = cli.permutations {
        search.max_permutations = k;
    }
    if let Some(strategy) = cli.strategy {
        search.strategy = strategy.into();
    }
    if let Some(seed) = cli.seed {
        search.seed = seed;
    }
    if let Some(threads) = cli.threads {
        search.threads = threads;
    }
    if cli.sequential {
        search.parallel = false;
    }
    search.validate()?;

    Ok(config)
}

/// Plain three-line report.
fn write_report(out: &mut impl Write, result: &AnosimResult) -> io::Result<()> {
    writeln!(out, "R_true = {}", result.r_true)?;
    writeln!(out, "no of permutations = {}", result.permutations)?;
    writeln!(out, "p-value = {}", result.p_value)
}
