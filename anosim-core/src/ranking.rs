//! Rank transform of the upper-triangular distances.
//!
//! Every pair `row < column` becomes a [`PairEntry`]. Entries are sorted by
//! distance and their values replaced by mid-ranks: a run of `k` equal
//! distances occupying raw ranks `a..=a+k-1` all receive `a + (k-1)/2`.

use serde::{Deserialize, Serialize};

use crate::domain::DistanceMatrix;

/// One upper-triangular cell.
///
/// `value` holds the tie-corrected rank once the owning [`RankedPairList`]
/// has been built; `distance` keeps the raw input for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PairEntry {
    pub row: usize,
    pub column: usize,
    pub distance: f64,
    pub value: f64,
}

/// Upper-triangular pairs sorted by distance, carrying mid-ranks in `[1, M]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedPairList {
    sample_count: usize,
    entries: Vec<PairEntry>,
}

impl RankedPairList {
    /// Extract, sort, and rank the upper triangle of `matrix`.
    pub fn from_matrix(matrix: &DistanceMatrix) -> Self {
        let mut entries: Vec<PairEntry> = matrix
            .upper_triangle()
            .map(|(row, column, distance)| PairEntry {
                row,
                column,
                distance,
                value: distance,
            })
            .collect();

        // Distances are validated finite by DistanceMatrix, so total_cmp agrees
        // with the numeric order.
        entries.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        assign_mid_ranks(&mut entries);

        Self {
            sample_count: matrix.sample_count(),
            entries,
        }
    }

    /// Ranked entries in ascending distance order.
    pub fn entries(&self) -> &[PairEntry] {
        &self.entries
    }

    /// Number of pairs (M).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of samples (N) of the source matrix.
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// Sum of all ranks; equals M·(M+1)/2 for any input.
    pub fn rank_sum(&self) -> f64 {
        self.entries.iter().map(|e| e.value).sum()
    }

    /// Number of runs of two or more tied distances.
    pub fn tie_groups(&self) -> usize {
        let mut groups = 0;
        let mut start = 0;
        while start < self.entries.len() {
            let end = run_end(&self.entries, start);
            if end - start > 1 {
                groups += 1;
            }
            start = end;
        }
        groups
    }
}

/// Exclusive end of the run of equal distances that starts at `start`.
fn run_end(entries: &[PairEntry], start: usize) -> usize {
    let distance = entries[start].distance;
    start
        + entries[start..]
            .iter()
            .take_while(|e| e.distance == distance)
            .count()
}

/// Replace each entry's value with its mid-rank. `entries` must be sorted.
///
/// Runs are consumed back to back, so every index (including a trailing
/// singleton) lands in exactly one run.
fn assign_mid_ranks(entries: &mut [PairEntry]) {
    let mut start = 0;
    while start < entries.len() {
        let end = run_end(entries, start);
        // raw ranks start+1 ..= end
        let mid_rank = (start + 1 + end) as f64 / 2.0;
        for entry in &mut entries[start..end] {
            entry.value = mid_rank;
        }
        start = end;
    }
}
