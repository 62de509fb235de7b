//! mcvary - Monte Carlo variation of simulation input files
//!
//! Produces perturbed copies of fixed-column numeric input decks for
//! sensitivity analysis. Two independent pipelines are provided:
//!
//! * block-structured tables (`.dat`), perturbed additively by a
//!   standard-deviation table and a per-block coefficient matrix;
//! * scalar parameter files (`.inp`), perturbed multiplicatively by
//!   coefficients looked up through unique key matches.

pub mod blocks;
pub mod config;
pub mod effects;
pub mod format;
pub mod lines;
pub mod run;
pub mod sampler;
pub mod scalar;
pub mod table;
pub mod telemetry;

use std::path::PathBuf;

use thiserror::Error;

pub use blocks::{BlockIndex, PerturbationMatrix, StdTable, LINES_PER_BLOCK};
pub use config::{AmbiguityPolicy, FileLayout, SamplingMode, ScalarField, VaryConfig};
pub use effects::{KeyEffect, UniqueKeyEffectsTable};
pub use format::FormatTemplate;
pub use run::{run_batch, RunSummary};
pub use sampler::{CoefficientSource, NormalSampler, ZeroSource};
pub use scalar::KeyedLineVarier;
pub use table::BlockDataVarier;

#[derive(Debug, Error)]
pub enum VaryError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}:{line}: invalid UTF-8")]
    InvalidUtf8 { path: PathBuf, line: usize },
    #[error("invalid format descriptor for table '{table}': {reason}")]
    FormatParse { table: String, reason: String },
    #[error("standard-deviation table {path} has no numeric data lines")]
    EmptyTable { path: PathBuf },
    #[error("keys overlap on line '{line}': {} (keys must be unique substrings)", .keys.join(", "))]
    AmbiguousKey { line: String, keys: Vec<String> },
    #[error("{path}:{line}: cannot parse '{token}' as a number")]
    InvalidNumber {
        path: PathBuf,
        line: usize,
        token: String,
    },
    #[error("{path}:{line}: {reason}")]
    InvalidEffectRow {
        path: PathBuf,
        line: usize,
        reason: String,
    },
    #[error("csv error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("line {line} of {path} has no matching standard-deviation row")]
    MissingStdRow { path: PathBuf, line: usize },
    #[error("line {line} of {path} has {got} columns, perturbation matrix has {expected}")]
    ColumnMismatch {
        path: PathBuf,
        line: usize,
        expected: usize,
        got: usize,
    },
    #[error("block {block} needs a perturbation row but the matrix has {rows} rows")]
    MissingPerturbationRow { block: usize, rows: usize },
    #[error("{got} values exceed the {capacity} fields of the line layout")]
    TooManyValues { capacity: usize, got: usize },
    #[error("failed to parse config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl VaryError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, VaryError>;
