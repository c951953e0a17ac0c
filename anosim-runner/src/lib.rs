//! ANOSIM Runner — input loading, run orchestration, export, history.
//!
//! This crate builds on `anosim-core` to provide:
//! - Matrix and label file loaders with data-quality warnings
//! - TOML run configuration
//! - The run orchestrator (optional private rayon pool)
//! - JSON / CSV / Markdown artifacts and JSONL run history
//! - Env-gated phase profiling

pub mod config;
pub mod data_loader;
pub mod export;
pub mod history;
pub mod profiling;
pub mod runner;

pub use config::{AnosimConfig, ConfigError, InputConfig, SearchConfig, StrategyKind};
pub use data_loader::{load_inputs, LoadError, LoadedInputs};
pub use history::{HistoryEntry, RunHistory};
pub use runner::{run_anosim, run_from_data, AnosimResult, AnosimRun, RunError};
