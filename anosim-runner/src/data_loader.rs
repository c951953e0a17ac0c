//! Matrix and label file loading.
//!
//! Matrix file layout:
//! - First line: any header; its last whitespace-separated token is N.
//! - Body: N rows of N+1 tokens. The first token of each row is a row label
//!   and is discarded; the remaining N are distances.
//!
//! The body is read as one whitespace-separated token stream, so line breaks
//! inside it carry no meaning.
//!
//! Label file layout: N whitespace-separated integers in sample order.
//!
//! Anything after the required tokens is ignored and reported as a warning.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use anosim_core::domain::{DistanceMatrix, GroupLabel, LabelAssignment, MatrixError};

/// Errors from the input loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not open {what} file '{}': {source}", .path.display())]
    InputUnavailable {
        what: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("insufficient data in {what}: expected {expected} values, found {found}")]
    InsufficientData {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("matrix header is empty; its last token must be the sample count")]
    MissingDimension,

    #[error("matrix header token '{0}' is not a sample count")]
    InvalidDimension(String),

    #[error("{what} value #{index} is not a number: '{token}'")]
    InvalidNumber {
        what: &'static str,
        index: usize,
        token: String,
    },

    #[error("matrix error: {0}")]
    Matrix(#[from] MatrixError),
}

/// Both inputs plus provenance and non-fatal warnings.
#[derive(Debug, Clone)]
pub struct LoadedInputs {
    pub matrix: DistanceMatrix,
    pub labels: LabelAssignment,
    pub matrix_path: PathBuf,
    pub labels_path: PathBuf,
    pub warnings: Vec<String>,
}

/// Parsed matrix plus warnings raised while reading it.
#[derive(Debug, Clone)]
pub struct ParsedMatrix {
    pub matrix: DistanceMatrix,
    pub warnings: Vec<String>,
}

/// Parsed labels plus warnings raised while reading them.
#[derive(Debug, Clone)]
pub struct ParsedLabels {
    pub labels: LabelAssignment,
    pub warnings: Vec<String>,
}

/// Load the matrix, then the labels sized by the matrix dimension.
///
/// This is the primary entry point for the runner to get input data.
pub fn load_inputs(matrix_path: &Path, labels_path: &Path) -> Result<LoadedInputs, LoadError> {
    let matrix_text = read_input("sample", matrix_path)?;
    let labels_text = read_input("group label", labels_path)?;

    let parsed_matrix = parse_matrix(&matrix_text)?;
    let n = parsed_matrix.matrix.sample_count();
    let parsed_labels = parse_labels(&labels_text, n)?;

    let mut warnings = parsed_matrix.warnings;
    warnings.extend(parsed_labels.warnings);

    let asymmetry = parsed_matrix.matrix.asymmetry();
    if asymmetry > 0.0 {
        warnings.push(format!(
            "distance matrix is not symmetric (max |d[i][j] - d[j][i]| = {asymmetry}); \
             only the upper triangle is used"
        ));
    }

    Ok(LoadedInputs {
        matrix: parsed_matrix.matrix,
        labels: parsed_labels.labels,
        matrix_path: matrix_path.to_path_buf(),
        labels_path: labels_path.to_path_buf(),
        warnings,
    })
}

fn read_input(what: &'static str, path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::InputUnavailable {
        what,
        path: path.to_path_buf(),
        source,
    })
}

/// Parse matrix text in the header + labelled-rows layout.
pub fn parse_matrix(text: &str) -> Result<ParsedMatrix, LoadError> {
    let (header, body) = text.split_once('\n').unwrap_or((text, ""));
    let dimension_token = header
        .split_whitespace()
        .last()
        .ok_or(LoadError::MissingDimension)?;
    let n: usize = dimension_token
        .parse()
        .map_err(|_| LoadError::InvalidDimension(dimension_token.to_string()))?;
    if n < 2 {
        return Err(MatrixError::TooFewSamples(n).into());
    }

    let row_width = n
        .checked_add(1)
        .ok_or_else(|| LoadError::InvalidDimension(dimension_token.to_string()))?;
    let expected = n
        .checked_mul(row_width)
        .ok_or_else(|| LoadError::InvalidDimension(dimension_token.to_string()))?;

    // Check the body against the header before sizing anything by N.
    let body: Vec<&str> = body.split_whitespace().collect();
    if body.len() < expected {
        return Err(LoadError::InsufficientData {
            what: "distance matrix",
            expected,
            found: body.len(),
        });
    }

    let mut values = Vec::with_capacity(n * n);
    for (index, token) in body[..expected].iter().enumerate() {
        if index % row_width == 0 {
            continue; // row label
        }
        let value: f64 = token.parse().map_err(|_| LoadError::InvalidNumber {
            what: "distance matrix",
            index,
            token: token.to_string(),
        })?;
        values.push(value);
    }

    let mut warnings = Vec::new();
    let extra = body.len() - expected;
    if extra > 0 {
        warnings.push(format!(
            "ignored {extra} trailing token(s) after the {n}x{n} distance matrix"
        ));
    }

    Ok(ParsedMatrix {
        matrix: DistanceMatrix::new(n, values)?,
        warnings,
    })
}

/// Parse `n` integer labels from whitespace-separated text.
pub fn parse_labels(text: &str, n: usize) -> Result<ParsedLabels, LoadError> {
    let mut tokens = text.split_whitespace();
    let mut labels: Vec<GroupLabel> = Vec::new();

    for index in 0..n {
        let token = tokens.next().ok_or(LoadError::InsufficientData {
            what: "group labels",
            expected: n,
            found: index,
        })?;
        let label = token.parse().map_err(|_| LoadError::InvalidNumber {
            what: "group labels",
            index,
            token: token.to_string(),
        })?;
        labels.push(label);
    }

    let mut warnings = Vec::new();
    let extra = tokens.count();
    if extra > 0 {
        warnings.push(format!(
            "ignored {extra} group label(s) beyond the {n} samples"
        ));
    }

    Ok(ParsedLabels {
        labels: LabelAssignment::new(labels),
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MATRIX: &str = "\
s1 s2 s3 3
s1 0.0 0.4 0.9
s2 0.4 0.0 0.2
s3 0.9 0.2 0.0
";

    #[test]
    fn parses_header_dimension_and_drops_row_labels() {
        let parsed = parse_matrix(MATRIX).unwrap();
        let m = parsed.matrix;
        assert_eq!(m.sample_count(), 3);
        assert_eq!(m.get(0, 1), Some(0.4));
        assert_eq!(m.get(1, 2), Some(0.2));
        assert_eq!(m.get(2, 0), Some(0.9));
        assert!(parsed.warnings.is_empty());
    }

    #[test]
    fn numeric_row_index_column_is_discarded() {
        let text = "2\n1 0 5\n2 5 0\n";
        let m = parse_matrix(text).unwrap().matrix;
        assert_eq!(m.get(0, 1), Some(5.0));
    }

    #[test]
    fn body_line_breaks_are_not_significant() {
        let text = "x 2\n1 0\n5 2 5 0";
        let m = parse_matrix(text).unwrap().matrix;
        assert_eq!(m.get(0, 1), Some(5.0));
        assert_eq!(m.get(1, 0), Some(5.0));
    }

    #[test]
    fn truncated_matrix_is_insufficient() {
        let text = "3\na 0 1 2\nb 1 0 3\nc 2 3";
        let err = parse_matrix(text).unwrap_err();
        assert!(matches!(
            err,
            LoadError::InsufficientData { expected: 12, found: 11, .. }
        ));
    }

    #[test]
    fn huge_dimension_over_short_body_is_insufficient() {
        let err = parse_matrix("200000\na 0 1\n").unwrap_err();
        assert!(matches!(
            err,
            LoadError::InsufficientData { expected: 40_000_200_000, found: 3, .. }
        ));
    }

    #[test]
    fn overflowing_dimension_is_rejected() {
        let err = parse_matrix("5000000000\na 0 1\n").unwrap_err();
        assert!(matches!(err, LoadError::InvalidDimension(t) if t == "5000000000"));
    }

    #[test]
    fn huge_label_count_over_short_file_is_insufficient() {
        let err = parse_labels("1 2", usize::MAX).unwrap_err();
        assert!(matches!(err, LoadError::InsufficientData { found: 2, .. }));
    }

    #[test]
    fn non_numeric_header_dimension() {
        let err = parse_matrix("a b c\n").unwrap_err();
        assert!(matches!(err, LoadError::InvalidDimension(t) if t == "c"));
    }

    #[test]
    fn empty_file_has_no_dimension() {
        assert!(matches!(parse_matrix(""), Err(LoadError::MissingDimension)));
    }

    #[test]
    fn dimension_below_two_is_rejected() {
        let err = parse_matrix("1\na 0\n").unwrap_err();
        assert!(matches!(err, LoadError::Matrix(MatrixError::TooFewSamples(1))));
    }

    #[test]
    fn non_numeric_distance_is_reported() {
        let err = parse_matrix("2\na 0 x\nb 1 0\n").unwrap_err();
        assert!(matches!(
            err,
            LoadError::InvalidNumber { index: 2, ref token, .. } if token == "x"
        ));
    }

    #[test]
    fn trailing_matrix_tokens_warn() {
        let parsed = parse_matrix("2\na 0 1\nb 1 0\nextra\n").unwrap();
        assert_eq!(parsed.warnings.len(), 1);
    }

    #[test]
    fn labels_parse_in_order() {
        let parsed = parse_labels("1 1\n2 2", 4).unwrap();
        assert_eq!(parsed.labels.as_slice(), &[1, 1, 2, 2]);
    }

    #[test]
    fn too_few_labels_is_insufficient() {
        let err = parse_labels("1 2", 3).unwrap_err();
        assert!(matches!(
            err,
            LoadError::InsufficientData { expected: 3, found: 2, .. }
        ));
    }

    #[test]
    fn non_integer_label_is_reported() {
        let err = parse_labels("1 a 2", 3).unwrap_err();
        assert!(matches!(err, LoadError::InvalidNumber { index: 1, .. }));
    }

    #[test]
    fn extra_labels_warn() {
        let parsed = parse_labels("1 1 2 2 3", 4).unwrap();
        assert_eq!(parsed.labels.len(), 4);
        assert_eq!(parsed.warnings.len(), 1);
    }
}
