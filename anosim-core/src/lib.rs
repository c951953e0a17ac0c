//! ANOSIM Core — rank transform, R statistic, and permutation search.
//!
//! This crate contains the statistical engine and no I/O:
//! - Domain types (distance matrix, label assignment, content hashes)
//! - Upper-triangle extraction with mid-rank tie correction
//! - The R statistic from within/between-group mean ranks
//! - Lexicographic and seeded random permutation search, optionally rayon-batched
//! - Deterministic RNG hierarchy and run fingerprints

pub mod domain;
pub mod fingerprint;
pub mod permutation;
pub mod ranking;
pub mod rng;
pub mod statistic;

pub use domain::{DistanceMatrix, GroupLabel, LabelAssignment};
pub use permutation::{PermutationSearch, PermutationStrategy, SearchError, SearchOutcome};
pub use ranking::{PairEntry, RankedPairList};
pub use statistic::{RStatistic, StatisticError};
