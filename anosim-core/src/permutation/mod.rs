//! Permutation test driver.
//!
//! Computes R for the observed labels, then re-evaluates R over up to
//! `max_permutations − 1` relabelings and reports
//! `p = (# trials with R > R_true) / (trials evaluated, observed included)`.
//!
//! Two sampling strategies:
//! - `Lexicographic`: successive arrangements after the observed one, stopping
//!   at the cap or when the sequence would wrap to ascending order.
//! - `Random { seed }`: independent uniform shuffles from a seeded generator.
//!
//! In parallel mode trials are cut into fixed-size consecutive batches that
//! rayon evaluates independently; counters are summed. Batch boundaries do not
//! depend on the thread count, so parallel and sequential runs agree exactly.

pub mod lexicographic;
pub mod random;

pub use lexicographic::{distinct_arrangements, next_permutation};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{LabelAssignment, LabelError};
use crate::ranking::RankedPairList;
use crate::rng::RngHierarchy;
use crate::statistic::{self, RStatistic, StatisticError};

/// Permutation cap used when none is configured.
pub const DEFAULT_MAX_PERMUTATIONS: u64 = 1_000_000;

/// Trials per batch in parallel mode and per RNG sub-stream.
pub const DEFAULT_BATCH_SIZE: usize = 4096;

/// How relabelings are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PermutationStrategy {
    #[default]
    Lexicographic,
    Random {
        seed: u64,
    },
}

impl PermutationStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            PermutationStrategy::Lexicographic => "lexicographic",
            PermutationStrategy::Random { .. } => "random",
        }
    }

    pub fn seed(&self) -> Option<u64> {
        match self {
            PermutationStrategy::Lexicographic => None,
            PermutationStrategy::Random { seed } => Some(*seed),
        }
    }
}

/// Errors that stop a search before any trial runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("permutation cap must be at least 1")]
    ZeroCap,

    #[error("batch size must be at least 1")]
    ZeroBatchSize,

    #[error("invalid label assignment: {0}")]
    Labels(#[from] LabelError),

    #[error("observed statistic undefined: {0}")]
    Statistic(#[from] StatisticError),
}

/// Result of a permutation search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOutcome {
    /// R for the observed labels.
    pub r_true: RStatistic,
    /// Trials evaluated, the observed assignment included (≥ 1).
    pub permutations: u64,
    /// Trials whose R was strictly greater than `r_true.r`.
    pub bigger: u64,
    /// Trials skipped because R was undefined. Excluded from `permutations`.
    pub degenerate_skipped: u64,
    /// `bigger / permutations`.
    pub p_value: f64,
    /// True when the lexicographic sequence ran out before the cap.
    pub exhausted: bool,
    pub strategy: PermutationStrategy,
}

/// Counters of evaluated trials. Combined by summation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Tally {
    evaluated: u64,
    bigger: u64,
    degenerate: u64,
}

impl Tally {
    fn merge(self, other: Tally) -> Tally {
        Tally {
            evaluated: self.evaluated + other.evaluated,
            bigger: self.bigger + other.bigger,
            degenerate: self.degenerate + other.degenerate,
        }
    }

    /// `labels` is a reordering of the validated observed assignment, so its
    /// length always matches; only a degenerate split can leave R undefined.
    fn record(&mut self, ranked: &RankedPairList, labels: &LabelAssignment, r_true: f64) {
        match statistic::trial_r(ranked, labels) {
            Some(r) => {
                self.evaluated += 1;
                if r > r_true {
                    self.bigger += 1;
                }
            }
            None => self.degenerate += 1,
        }
    }
}

/// Permutation test over a ranked pair list.
///
/// ```
/// use anosim_core::domain::{DistanceMatrix, LabelAssignment};
/// use anosim_core::permutation::PermutationSearch;
/// use anosim_core::ranking::RankedPairList;
///
/// let matrix = DistanceMatrix::from_rows(&[
///     vec![0.0, 0.1, 0.5, 0.6],
///     vec![0.1, 0.0, 0.7, 0.8],
///     vec![0.5, 0.7, 0.0, 0.2],
///     vec![0.6, 0.8, 0.2, 0.0],
/// ])
/// .unwrap();
/// let ranked = RankedPairList::from_matrix(&matrix);
/// let labels = LabelAssignment::new(vec![1, 1, 2, 2]);
///
/// let outcome = PermutationSearch::new(&ranked, 1).run(&labels).unwrap();
/// assert_eq!(outcome.r_true.r, 1.0);
/// assert_eq!(outcome.permutations, 1);
/// assert_eq!(outcome.p_value, 0.0);
/// ```
pub struct PermutationSearch<'a> {
    ranked: &'a RankedPairList,
    max_permutations: u64,
    strategy: PermutationStrategy,
    parallel: bool,
    batch_size: usize,
}

impl<'a> PermutationSearch<'a> {
    /// Lexicographic, sequential search capped at `max_permutations` trials.
    pub fn new(ranked: &'a RankedPairList, max_permutations: u64) -> Self {
        Self {
            ranked,
            max_permutations,
            strategy: PermutationStrategy::Lexicographic,
            parallel: false,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_strategy(mut self, strategy: PermutationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Enables or disables rayon batch evaluation.
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Validate `labels`, compute R_true, and run the permutation trials.
    pub fn run(&self, labels: &LabelAssignment) -> Result<SearchOutcome, SearchError> {
        if self.max_permutations == 0 {
            return Err(SearchError::ZeroCap);
        }
        if self.batch_size == 0 {
            return Err(SearchError::ZeroBatchSize);
        }
        labels.validate_for(self.ranked.sample_count())?;
        let r_true = statistic::evaluate(self.ranked, labels)?;

        let budget = self.max_permutations - 1;
        let (tally, exhausted) = match self.strategy {
            PermutationStrategy::Lexicographic if self.parallel => {
                self.lexicographic_batched(labels, budget, r_true.r)
            }
            PermutationStrategy::Lexicographic => {
                self.lexicographic_sequential(labels, budget, r_true.r)
            }
            PermutationStrategy::Random { seed } => {
                (self.random(labels, budget, r_true.r, seed), false)
            }
        };

        let permutations = tally.evaluated + 1;
        Ok(SearchOutcome {
            r_true,
            permutations,
            bigger: tally.bigger,
            degenerate_skipped: tally.degenerate,
            p_value: tally.bigger as f64 / permutations as f64,
            exhausted,
            strategy: self.strategy,
        })
    }

    fn lexicographic_sequential(
        &self,
        labels: &LabelAssignment,
        budget: u64,
        r_true: f64,
    ) -> (Tally, bool) {
        let mut cursor = labels.clone();
        let mut tally = Tally::default();
        let mut produced = 0u64;

        while produced < budget {
            if !next_permutation(cursor.as_mut_slice()) {
                return (tally, true);
            }
            produced += 1;
            tally.record(self.ranked, &cursor, r_true);
        }
        (tally, false)
    }

    /// Generate arrangements on the calling thread, evaluate each batch in parallel.
    fn lexicographic_batched(
        &self,
        labels: &LabelAssignment,
        budget: u64,
        r_true: f64,
    ) -> (Tally, bool) {
        let mut cursor = labels.clone();
        let mut tally = Tally::default();
        let mut produced = 0u64;
        let mut exhausted = false;
        let mut batch: Vec<LabelAssignment> = Vec::with_capacity(self.batch_size);

        while produced < budget && !exhausted {
            batch.clear();
            while produced < budget && batch.len() < self.batch_size {
                if !next_permutation(cursor.as_mut_slice()) {
                    exhausted = true;
                    break;
                }
                produced += 1;
                batch.push(cursor.clone());
            }

            let batch_tally = batch
                .par_iter()
                .map(|trial| {
                    let mut t = Tally::default();
                    t.record(self.ranked, trial, r_true);
                    t
                })
                .reduce(Tally::default, Tally::merge);
            tally = tally.merge(batch_tally);
        }
        (tally, exhausted)
    }

    /// Batch `b` covers trials `[b·size, (b+1)·size)` and draws from sub-stream `b`.
    fn random(&self, labels: &LabelAssignment, budget: u64, r_true: f64, seed: u64) -> Tally {
        let hierarchy = RngHierarchy::new(seed);
        let size = self.batch_size as u64;
        let batches = budget.div_ceil(size);

        let run_batch = |b: u64| -> Tally {
            let mut rng = hierarchy.rng_for(b);
            let trials = size.min(budget - b * size);
            let mut scratch = labels.clone();
            let mut t = Tally::default();
            for _ in 0..trials {
                random::reshuffle(labels, &mut scratch, &mut rng);
                t.record(self.ranked, &scratch, r_true);
            }
            t
        };

        if self.parallel {
            (0..batches)
                .into_par_iter()
                .map(run_batch)
                .reduce(Tally::default, Tally::merge)
        } else {
            (0..batches).map(run_batch).fold(Tally::default(), Tally::merge)
        }
    }
}
