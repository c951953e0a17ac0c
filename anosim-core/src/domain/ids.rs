use serde::{Deserialize, Serialize};
use std::fmt;

use super::{DistanceMatrix, LabelAssignment};

/// Content hash of the analysed inputs (distance matrix + initial labels).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetHash(pub String);

impl DatasetHash {
    pub fn from_hash(hash: &str) -> Self {
        Self(hash.to_string())
    }

    /// Hash the matrix dimension, its upper triangle, and the label sequence.
    ///
    /// The lower triangle is excluded because the engine never reads it: two
    /// files that differ only below the diagonal produce identical results and
    /// therefore share a hash.
    pub fn compute(matrix: &DistanceMatrix, labels: &LabelAssignment) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&(matrix.sample_count() as u64).to_le_bytes());
        for (_, _, d) in matrix.upper_triangle() {
            hasher.update(&d.to_le_bytes());
        }
        hasher.update(&(labels.len() as u64).to_le_bytes());
        for &label in labels.as_slice() {
            hasher.update(&label.to_le_bytes());
        }
        Self(hasher.finalize().to_hex().to_string())
    }
}

impl fmt::Display for DatasetHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Deterministic run ID (dataset + search settings).
///
/// `seed` and `batch_size` are set only for random sampling, where each batch
/// draws from its own RNG sub-stream and so both shape the outcome.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId {
    pub dataset_hash: DatasetHash,
    pub strategy: String,
    pub max_permutations: u64,
    pub seed: Option<u64>,
    #[serde(default)]
    pub batch_size: Option<u64>,
}

impl RunId {
    pub fn new(
        dataset_hash: DatasetHash,
        strategy: impl Into<String>,
        max_permutations: u64,
        seed: Option<u64>,
        batch_size: Option<u64>,
    ) -> Self {
        Self {
            dataset_hash,
            strategy: strategy.into(),
            max_permutations,
            seed,
            batch_size,
        }
    }

    /// Generate deterministic run hash
    pub fn hash(&self) -> String {
        use serde_json::json;

        let canonical = json!({
            "batch_size": self.batch_size,
            "dataset_hash": &self.dataset_hash.0,
            "max_permutations": self.max_permutations,
            "seed": self.seed,
            "strategy": &self.strategy,
        });

        blake3::hash(canonical.to_string().as_bytes())
            .to_hex()
            .to_string()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.dataset_hash, self.strategy, self.max_permutations
        )?;
        if let Some(seed) = self.seed {
            write!(f, ":{seed}")?;
        }
        if let Some(batch_size) = self.batch_size {
            write!(f, ":b{batch_size}")?;
        }
        Ok(())
    }
}
