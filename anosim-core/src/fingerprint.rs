//! Run fingerprinting — deterministic identification of an ANOSIM run.
//!
//! - `DatasetHash`: content hash of the upper triangle + labels.
//! - `RunId`: dataset hash + strategy + cap, plus seed and batch size for
//!   random sampling.
//! - `RunFingerprint`: complete record persisted alongside every result.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{DatasetHash, DistanceMatrix, GroupLabel, LabelAssignment, RunId};
use crate::permutation::{PermutationStrategy, DEFAULT_BATCH_SIZE};

/// Complete fingerprint of a single run.
///
/// Two fingerprints with the same `run_hash` describe runs that must produce
/// identical R and p-values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunFingerprint {
    // ── Identity ──
    pub run_id: RunId,
    pub run_hash: String,
    pub timestamp: chrono::NaiveDateTime,

    // ── Inputs ──
    pub sample_count: usize,
    pub pair_count: usize,
    pub group_sizes: BTreeMap<GroupLabel, usize>,

    // ── Search ──
    pub strategy: PermutationStrategy,
    pub max_permutations: u64,
    /// Trials per batch; each random batch has its own RNG sub-stream.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

impl RunFingerprint {
    pub fn new(
        matrix: &DistanceMatrix,
        labels: &LabelAssignment,
        strategy: PermutationStrategy,
        max_permutations: u64,
        batch_size: usize,
    ) -> Self {
        let dataset_hash = DatasetHash::compute(matrix, labels);
        // Lexicographic results do not depend on batching.
        let batch_key = strategy.seed().map(|_| batch_size as u64);
        let run_id = RunId::new(
            dataset_hash,
            strategy.name(),
            max_permutations,
            strategy.seed(),
            batch_key,
        );
        let run_hash = run_id.hash();

        Self {
            run_id,
            run_hash,
            timestamp: chrono::Utc::now().naive_utc(),
            sample_count: matrix.sample_count(),
            pair_count: matrix.pair_count(),
            group_sizes: labels.group_sizes(),
            strategy,
            max_permutations,
            batch_size,
        }
    }

    pub fn dataset_hash(&self) -> &DatasetHash {
        &self.run_id.dataset_hash
    }
}
