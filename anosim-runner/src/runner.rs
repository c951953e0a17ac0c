//! ANOSIM runner — wires together loading, ranking, and the permutation search.
//!
//! Two entry points:
//! - `run_anosim()`: loads the input files named by an `AnosimConfig`, then runs.
//!   Used by the CLI.
//! - `run_from_data()`: takes an in-memory matrix and labels. No I/O.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use anosim_core::domain::{DistanceMatrix, LabelAssignment};
use anosim_core::fingerprint::RunFingerprint;
use anosim_core::permutation::{distinct_arrangements, PermutationSearch, SearchError};
use anosim_core::ranking::RankedPairList;
use anosim_core::statistic::RStatistic;

use crate::config::{AnosimConfig, ConfigError, SearchConfig};
use crate::data_loader::{load_inputs, LoadError};
use crate::profiling::ProfileScope;

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("search error: {0}")]
    Search(#[from] SearchError),
    #[error("failed to build thread pool: {0}")]
    ThreadPool(String),
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete, serializable result of one ANOSIM run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnosimResult {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub fingerprint: RunFingerprint,
    /// R for the observed labels.
    pub r_true: f64,
    pub statistic: RStatistic,
    /// Trials evaluated, the observed assignment included.
    pub permutations: u64,
    pub bigger: u64,
    pub degenerate_skipped: u64,
    pub p_value: f64,
    /// Lexicographic sequence ran out before the cap.
    pub exhausted: bool,
    /// Distinct label arrangements; None when larger than u64.
    pub distinct_arrangements: Option<u64>,
    pub tie_groups: usize,
    pub matrix_path: Option<String>,
    pub labels_path: Option<String>,
    pub data_quality_warnings: Vec<String>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// A result together with the ranked pairs it was computed from.
#[derive(Debug, Clone)]
pub struct AnosimRun {
    pub result: AnosimResult,
    pub ranked: RankedPairList,
}

/// Run ANOSIM on the files named in `config`.
pub fn run_anosim(config: &AnosimConfig) -> Result<AnosimRun, RunError> {
    config.search.validate()?;

    let loaded = {
        let _scope = ProfileScope::new("load_inputs");
        load_inputs(&config.input.matrix, &config.input.labels)?
    };

    let mut run = run_from_data(&loaded.matrix, &loaded.labels, &config.search)?;
    run.result.matrix_path = Some(loaded.matrix_path.display().to_string());
    run.result.labels_path = Some(loaded.labels_path.display().to_string());
    run.result.data_quality_warnings = loaded.warnings;
    Ok(run)
}

/// Run ANOSIM with pre-loaded data — no I/O.
pub fn run_from_data(
    matrix: &DistanceMatrix,
    labels: &LabelAssignment,
    search: &SearchConfig,
) -> Result<AnosimRun, RunError> {
    search.validate()?;
    let strategy = search.permutation_strategy();

    let ranked = {
        let _scope = ProfileScope::new("rank_transform");
        RankedPairList::from_matrix(matrix)
    };

    let engine = PermutationSearch::new(&ranked, search.max_permutations)
        .with_strategy(strategy)
        .with_parallelism(search.parallel)
        .with_batch_size(search.batch_size);

    let outcome = {
        let _scope = ProfileScope::new("permutation_search");
        if search.parallel && search.threads > 0 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(search.threads)
                .thread_name(|i| format!("anosim-pool-{i}"))
                .build()
                .map_err(|e| RunError::ThreadPool(e.to_string()))?;
            pool.install(|| engine.run(labels))?
        } else {
            engine.run(labels)?
        }
    };

    let fingerprint = RunFingerprint::new(
        matrix,
        labels,
        strategy,
        search.max_permutations,
        search.batch_size,
    );
    let result = AnosimResult {
        schema_version: SCHEMA_VERSION,
        fingerprint,
        r_true: outcome.r_true.r,
        statistic: outcome.r_true,
        permutations: outcome.permutations,
        bigger: outcome.bigger,
        degenerate_skipped: outcome.degenerate_skipped,
        p_value: outcome.p_value,
        exhausted: outcome.exhausted,
        distinct_arrangements: distinct_arrangements(labels.as_slice())
            .and_then(|n| u64::try_from(n).ok()),
        tie_groups: ranked.tie_groups(),
        matrix_path: None,
        labels_path: None,
        data_quality_warnings: Vec::new(),
    };

    Ok(AnosimRun { result, ranked })
}
