//! ANOSIM R statistic.
//!
//! `R = (mean_between − mean_within) / (M / 2)` where the means are taken over
//! the ranks of pairs whose samples do / do not share a group label.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::LabelAssignment;
use crate::ranking::RankedPairList;

/// Errors from evaluating R.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatisticError {
    #[error("label assignment has {actual} labels but ranks cover {expected} samples")]
    LengthMismatch { expected: usize, actual: usize },

    #[error(
        "degenerate assignment: {within_pairs} within-group and {between_pairs} between-group pairs"
    )]
    DegenerateAssignment {
        within_pairs: usize,
        between_pairs: usize,
    },
}

/// R together with the components it was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RStatistic {
    pub r: f64,
    pub mean_within: f64,
    pub mean_between: f64,
    pub within_pairs: usize,
    pub between_pairs: usize,
}

/// Compute R for `labels` over the ranked pairs.
///
/// Fails with [`StatisticError::DegenerateAssignment`] when either class of
/// pairs is empty, because one of the two means is then undefined.
pub fn evaluate(
    ranked: &RankedPairList,
    labels: &LabelAssignment,
) -> Result<RStatistic, StatisticError> {
    if labels.len() != ranked.sample_count() {
        return Err(StatisticError::LengthMismatch {
            expected: ranked.sample_count(),
            actual: labels.len(),
        });
    }

    let stat = split_ranks(ranked, labels);
    if stat.within_pairs == 0 || stat.between_pairs == 0 {
        return Err(StatisticError::DegenerateAssignment {
            within_pairs: stat.within_pairs,
            between_pairs: stat.between_pairs,
        });
    }
    Ok(stat)
}

/// R for one permutation trial, or `None` when the split is degenerate.
///
/// Skips the length check: trials are reorderings of an assignment that
/// [`evaluate`] already accepted.
pub(crate) fn trial_r(ranked: &RankedPairList, labels: &LabelAssignment) -> Option<f64> {
    let stat = split_ranks(ranked, labels);
    (stat.within_pairs > 0 && stat.between_pairs > 0).then_some(stat.r)
}

/// Sum ranks by class. Means and R are NaN for an empty class.
fn split_ranks(ranked: &RankedPairList, labels: &LabelAssignment) -> RStatistic {
    let mut within_sum = 0.0;
    let mut between_sum = 0.0;
    let mut within_pairs = 0usize;
    let mut between_pairs = 0usize;

    for entry in ranked.entries() {
        if labels.label(entry.row) == labels.label(entry.column) {
            within_sum += entry.value;
            within_pairs += 1;
        } else {
            between_sum += entry.value;
            between_pairs += 1;
        }
    }

    let mean_within = within_sum / within_pairs as f64;
    let mean_between = between_sum / between_pairs as f64;
    let half_pairs = ranked.len() as f64 / 2.0;

    RStatistic {
        r: (mean_between - mean_within) / half_pairs,
        mean_within,
        mean_between,
        within_pairs,
        between_pairs,
    }
}

/// Shorthand for [`evaluate`] returning only R.
pub fn r_value(ranked: &RankedPairList, labels: &LabelAssignment) -> Result<f64, StatisticError> {
    evaluate(ranked, labels).map(|s| s.r)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DistanceMatrix;

    /// Ranks: (0,1)=6 (0,2)=2 (0,3)=5 (1,2)=4 (1,3)=1 (2,3)=3
    fn ranked() -> RankedPairList {
        let m = DistanceMatrix::from_rows(&[
            vec![0.0, 0.6, 0.2, 0.5],
            vec![0.6, 0.0, 0.4, 0.1],
            vec![0.2, 0.4, 0.0, 0.3],
            vec![0.5, 0.1, 0.3, 0.0],
        ])
        .unwrap();
        RankedPairList::from_matrix(&m)
    }

    #[test]
    fn hand_computed_r() {
        // within: (0,1)=6, (2,3)=3 → 4.5
        // between: 2, 5, 4, 1 → 3.0
        // R = (3.0 − 4.5) / 3 = −0.5
        let stat = evaluate(&ranked(), &LabelAssignment::new(vec![1, 1, 2, 2])).unwrap();
        assert_eq!(stat.within_pairs, 2);
        assert_eq!(stat.between_pairs, 4);
        assert_eq!(stat.mean_within, 4.5);
        assert_eq!(stat.mean_between, 3.0);
        assert_eq!(stat.r, -0.5);
    }

    #[test]
    fn perfect_separation_gives_r_one() {
        let m = DistanceMatrix::from_rows(&[
            vec![0.0, 0.1, 0.5, 0.6],
            vec![0.1, 0.0, 0.7, 0.8],
            vec![0.5, 0.7, 0.0, 0.2],
            vec![0.6, 0.8, 0.2, 0.0],
        ])
        .unwrap();
        let ranked = RankedPairList::from_matrix(&m);
        let r = r_value(&ranked, &LabelAssignment::new(vec![1, 1, 2, 2])).unwrap();
        assert_eq!(r, 1.0);
    }

    #[test]
    fn single_group_is_degenerate() {
        let err = evaluate(&ranked(), &LabelAssignment::new(vec![1, 1, 1, 1])).unwrap_err();
        assert_eq!(
            err,
            StatisticError::DegenerateAssignment {
                within_pairs: 6,
                between_pairs: 0
            }
        );
    }

    #[test]
    fn all_singletons_are_degenerate() {
        let err = evaluate(&ranked(), &LabelAssignment::new(vec![1, 2, 3, 4])).unwrap_err();
        assert!(matches!(
            err,
            StatisticError::DegenerateAssignment { within_pairs: 0, .. }
        ));
    }

    #[test]
    fn relabeling_groups_preserves_r() {
        let a = r_value(&ranked(), &LabelAssignment::new(vec![1, 2, 1, 2])).unwrap();
        let b = r_value(&ranked(), &LabelAssignment::new(vec![-7, 40, -7, 40])).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let err = evaluate(&ranked(), &LabelAssignment::new(vec![1, 2])).unwrap_err();
        assert_eq!(
            err,
            StatisticError::LengthMismatch {
                expected: 4,
                actual: 2
            }
        );
    }

    #[test]
    fn odd_pair_count_uses_fractional_half() {
        // N = 3 → M = 3, divisor 1.5
        let m = DistanceMatrix::from_rows(&[
            vec![0.0, 1.0, 2.0],
            vec![1.0, 0.0, 3.0],
            vec![2.0, 3.0, 0.0],
        ])
        .unwrap();
        let ranked = RankedPairList::from_matrix(&m);
        // within (0,1)=1; between (0,2)=2, (1,2)=3 → 2.5
        let r = r_value(&ranked, &LabelAssignment::new(vec![1, 1, 2])).unwrap();
        assert!((r - 1.0).abs() < 1e-12);
    }
}
