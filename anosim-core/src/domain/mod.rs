//! Domain types: the distance matrix, the label assignment, and content IDs.

pub mod ids;
pub mod labels;
pub mod matrix;

pub use ids::{DatasetHash, RunId};
pub use labels::{GroupLabel, LabelAssignment, LabelError};
pub use matrix::{DistanceMatrix, MatrixError};
