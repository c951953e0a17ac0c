use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Group label of a single sample.
pub type GroupLabel = i64;

/// Errors from label assignment validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LabelError {
    #[error("label assignment has {actual} labels but the matrix has {expected} samples")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("label assignment has {groups} distinct group(s); at least 2 are required")]
    TooFewGroups { groups: usize },

    #[error("every group has a single member, so there are no within-group pairs")]
    NoWithinGroupPairs,
}

/// One group label per sample, in sample-index order.
///
/// This is the only state that changes during a permutation search. Every
/// trial is a reordering of the same values, so group sizes never change.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LabelAssignment {
    labels: Vec<GroupLabel>,
}

impl LabelAssignment {
    pub fn new(labels: Vec<GroupLabel>) -> Self {
        Self { labels }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn as_slice(&self) -> &[GroupLabel] {
        &self.labels
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [GroupLabel] {
        &mut self.labels
    }

    /// Label of sample `index`.
    #[inline]
    pub fn label(&self, index: usize) -> GroupLabel {
        self.labels[index]
    }

    /// Member count per label, ordered by label.
    pub fn group_sizes(&self) -> BTreeMap<GroupLabel, usize> {
        let mut sizes = BTreeMap::new();
        for &label in &self.labels {
            *sizes.entry(label).or_insert(0) += 1;
        }
        sizes
    }

    pub fn group_count(&self) -> usize {
        self.group_sizes().len()
    }

    /// Number of sample pairs sharing a label: Σ size·(size−1)/2.
    ///
    /// Depends only on group sizes, so it is the same for every permutation.
    pub fn within_pair_count(&self) -> usize {
        self.group_sizes().values().map(|&s| s * (s - 1) / 2).sum()
    }

    /// Check this assignment is usable against a matrix of `n` samples.
    pub fn validate_for(&self, n: usize) -> Result<(), LabelError> {
        if self.labels.len() != n {
            return Err(LabelError::LengthMismatch {
                expected: n,
                actual: self.labels.len(),
            });
        }
        let groups = self.group_count();
        if groups < 2 {
            return Err(LabelError::TooFewGroups { groups });
        }
        if self.within_pair_count() == 0 {
            return Err(LabelError::NoWithinGroupPairs);
        }
        Ok(())
    }
}

impl From<Vec<GroupLabel>> for LabelAssignment {
    fn from(labels: Vec<GroupLabel>) -> Self {
        Self::new(labels)
    }
}
