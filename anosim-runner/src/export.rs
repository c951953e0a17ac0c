//! Result export — JSON, CSV, and Markdown artifact generation.
//!
//! - **JSON**: full round-trip serialization with schema versioning
//! - **CSV**: the ranked upper triangle for external analysis tools
//! - **Markdown**: a human-readable single-run report
//!
//! Persisted manifests carry a `schema_version`. Newer versions are rejected
//! on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use anosim_core::ranking::RankedPairList;

use crate::runner::{AnosimResult, AnosimRun, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize an `AnosimResult` to pretty JSON.
pub fn export_json(result: &AnosimResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize AnosimResult to JSON")
}

/// Deserialize an `AnosimResult` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<AnosimResult> {
    let result: AnosimResult =
        serde_json::from_str(json).context("failed to deserialize AnosimResult from JSON")?;
    if result.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            result.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(result)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export the ranked pairs as CSV, in ascending distance order.
///
/// Columns: row, column, distance, rank
pub fn export_ranks_csv(ranked: &RankedPairList) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["row", "column", "distance", "rank"])?;

    for e in ranked.entries() {
        wtr.write_record([
            &e.row.to_string(),
            &e.column.to_string(),
            &e.distance.to_string(),
            &e.value.to_string(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for one run.
///
/// Creates `anosim_{hash8}_{timestamp}/` under `output_dir` containing:
/// - `manifest.json` — the full `AnosimResult`
/// - `ranks.csv` — ranked upper triangle
/// - `report.md` — Markdown summary
///
/// Returns the path to the created directory.
pub fn save_artifacts(run: &AnosimRun, output_dir: &Path) -> Result<PathBuf> {
    let hash = &run.result.fingerprint.dataset_hash().0;
    let dirname = format!(
        "anosim_{}_{}",
        &hash[..hash.len().min(8)],
        run.result.fingerprint.timestamp.format("%Y%m%d_%H%M%S")
    );
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    std::fs::write(run_dir.join("manifest.json"), export_json(&run.result)?)?;
    std::fs::write(run_dir.join("ranks.csv"), export_ranks_csv(&run.ranked)?)?;
    std::fs::write(run_dir.join("report.md"), generate_report(&run.result))?;

    Ok(run_dir)
}

/// Load an `AnosimResult` from an artifact directory's manifest.json.
pub fn load_artifacts(dir: &Path) -> Result<AnosimResult> {
    let manifest_path = dir.join("manifest.json");
    let json = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("failed to read {}", manifest_path.display()))?;
    import_json(&json)
}

// ─── Markdown report ────────────────────────────────────────────────

/// Generate a Markdown report for one run.
pub fn generate_report(result: &AnosimResult) -> String {
    let mut md = String::with_capacity(1024);
    let fp = &result.fingerprint;

    md.push_str("# ANOSIM Report\n\n");

    md.push_str("## Metadata\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    if let Some(ref path) = result.matrix_path {
        md.push_str(&format!("| Matrix | {path} |\n"));
    }
    if let Some(ref path) = result.labels_path {
        md.push_str(&format!("| Labels | {path} |\n"));
    }
    md.push_str(&format!("| Samples | {} |\n", fp.sample_count));
    md.push_str(&format!("| Pairs | {} |\n", fp.pair_count));
    md.push_str(&format!("| Tie Groups | {} |\n", result.tie_groups));
    let groups: Vec<String> = fp
        .group_sizes
        .iter()
        .map(|(label, size)| format!("{label}: {size}"))
        .collect();
    md.push_str(&format!("| Groups | {} |\n", groups.join(", ")));
    md.push_str(&format!("| Dataset Hash | {} |\n", fp.dataset_hash()));
    md.push_str(&format!("| Run Hash | {} |\n", fp.run_hash));
    md.push('\n');

    md.push_str("## Search\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Strategy | {} |\n", fp.strategy.name()));
    if let Some(seed) = fp.strategy.seed() {
        md.push_str(&format!("| Seed | {seed} |\n"));
    }
    md.push_str(&format!("| Cap | {} |\n", fp.max_permutations));
    match result.distinct_arrangements {
        Some(n) => md.push_str(&format!("| Distinct Arrangements | {n} |\n")),
        None => md.push_str("| Distinct Arrangements | > 2^64 |\n"),
    }
    md.push_str(&format!("| Exhausted | {} |\n", result.exhausted));
    md.push('\n');

    let s = &result.statistic;
    md.push_str("## Result\n\n");
    md.push_str("| Metric | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| R | {:.6} |\n", result.r_true));
    md.push_str(&format!(
        "| Mean Within Rank | {:.3} ({} pairs) |\n",
        s.mean_within, s.within_pairs
    ));
    md.push_str(&format!(
        "| Mean Between Rank | {:.3} ({} pairs) |\n",
        s.mean_between, s.between_pairs
    ));
    md.push_str(&format!("| Permutations | {} |\n", result.permutations));
    md.push_str(&format!("| Bigger | {} |\n", result.bigger));
    if result.degenerate_skipped > 0 {
        md.push_str(&format!(
            "| Degenerate Skipped | {} |\n",
            result.degenerate_skipped
        ));
    }
    md.push_str(&format!("| p-value | {:.6} |\n", result.p_value));
    md.push('\n');

    if !result.data_quality_warnings.is_empty() {
        md.push_str("## Data Quality\n\n");
        for warn in &result.data_quality_warnings {
            md.push_str(&format!("- {warn}\n"));
        }
        md.push('\n');
    }

    md
}
