//! Block indexing and perturbation coefficients for block-structured tables.
//!
//! Data lines are grouped six at a time into blocks. A table with `B` full
//! blocks gets a coefficient matrix of `B / 2` rows by one column per data
//! field; block `b` reads row `(b % 2) % rows`, so consecutive block pairs
//! alternate between the first two rows and a single-row matrix is shared by
//! every block.

use std::path::{Path, PathBuf};

use nalgebra::DMatrix;
use tracing::debug;

use crate::lines::{is_data_line, parse_values, read_lines};
use crate::sampler::CoefficientSource;
use crate::{Result, VaryError};

/// Data lines per block.
pub const LINES_PER_BLOCK: usize = 6;

/// Block number of every line of one file, `None` for non-data lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockIndex {
    blocks: Vec<Option<usize>>,
    data_lines: usize,
}

impl BlockIndex {
    pub fn build<S: AsRef<str>>(lines: &[S]) -> Self {
        let mut data_lines = 0;
        let blocks = lines
            .iter()
            .map(|line| {
                if is_data_line(line.as_ref()) {
                    let block = data_lines / LINES_PER_BLOCK;
                    data_lines += 1;
                    Some(block)
                } else {
                    None
                }
            })
            .collect();

        Self { blocks, data_lines }
    }

    pub fn block_of(&self, line_idx: usize) -> Option<usize> {
        self.blocks.get(line_idx).copied().flatten()
    }

    pub fn data_lines(&self) -> usize {
        self.data_lines
    }

    /// Number of complete blocks; a trailing partial block is not counted.
    pub fn block_count(&self) -> usize {
        self.data_lines / LINES_PER_BLOCK
    }
}

/// Coefficients drawn once per table, `block_count / 2` rows by `columns`.
///
/// A matrix drawn from a deterministic source is all zeros whatever its
/// shape, so it also answers for blocks that have no row.
#[derive(Debug, Clone, PartialEq)]
pub struct PerturbationMatrix {
    coefficients: DMatrix<f64>,
    deterministic: bool,
}

impl PerturbationMatrix {
    /// Draw a matrix for `block_count` blocks, row-major.
    pub fn generate(
        block_count: usize,
        columns: usize,
        source: &mut dyn CoefficientSource,
    ) -> Self {
        let rows = block_count / 2;
        let draws: Vec<f64> = (0..rows * columns)
            .map(|_| source.next_coefficient())
            .collect();

        Self {
            coefficients: DMatrix::from_row_slice(rows, columns, &draws),
            deterministic: source.is_deterministic(),
        }
    }

    pub fn is_deterministic(&self) -> bool {
        self.deterministic
    }

    pub fn rows(&self) -> usize {
        self.coefficients.nrows()
    }

    pub fn columns(&self) -> usize {
        self.coefficients.ncols()
    }

    /// Row read by `block`.
    pub fn row_for_block(&self, block: usize) -> Result<usize> {
        let rows = self.rows();
        if rows == 0 {
            return Err(VaryError::MissingPerturbationRow { block, rows });
        }
        Ok((block % 2) % rows)
    }

    pub fn coefficient(&self, row: usize, column: usize) -> f64 {
        self.coefficients[(row, column)]
    }
}

/// Standard-deviation table: raw lines, their block index and the matrix
/// drawn for them.
#[derive(Debug, Clone)]
pub struct StdTable {
    path: PathBuf,
    lines: Vec<String>,
    index: BlockIndex,
    matrix: PerturbationMatrix,
}

impl StdTable {
    pub fn load(path: &Path, source: &mut dyn CoefficientSource) -> Result<Self> {
        let lines = read_lines(path)?;
        Self::from_lines(path.to_path_buf(), lines, source)
    }

    pub fn from_lines(
        path: PathBuf,
        lines: Vec<String>,
        source: &mut dyn CoefficientSource,
    ) -> Result<Self> {
        let index = BlockIndex::build(&lines);

        // The first field of a data line is its label.
        let columns = lines
            .iter()
            .find(|line| is_data_line(line))
            .map(|line| line.split_whitespace().count() - 1)
            .ok_or_else(|| VaryError::EmptyTable { path: path.clone() })?;

        let matrix = PerturbationMatrix::generate(index.block_count(), columns, source);
        debug!(
            path = %path.display(),
            data_lines = index.data_lines(),
            blocks = index.block_count(),
            rows = matrix.rows(),
            columns,
            "indexed standard-deviation table"
        );

        Ok(Self {
            path,
            lines,
            index,
            matrix,
        })
    }

    pub fn index(&self) -> &BlockIndex {
        &self.index
    }

    pub fn matrix(&self) -> &PerturbationMatrix {
        &self.matrix
    }

    /// Standard deviations of line `line_idx` scaled by the coefficients of
    /// the row selected for `block`.
    pub fn scaled_deviations(&self, line_idx: usize, block: usize) -> Result<Vec<f64>> {
        let line = self
            .lines
            .get(line_idx)
            .filter(|line| is_data_line(line))
            .ok_or_else(|| VaryError::MissingStdRow {
                path: self.path.clone(),
                line: line_idx + 1,
            })?;

        let deviations = parse_values(line, &self.path, line_idx)?;
        if deviations.len() > self.matrix.columns() {
            return Err(VaryError::ColumnMismatch {
                path: self.path.clone(),
                line: line_idx + 1,
                expected: self.matrix.columns(),
                got: deviations.len(),
            });
        }

        if self.matrix.is_deterministic() {
            return Ok(vec![0.0; deviations.len()]);
        }

        let row = self.matrix.row_for_block(block)?;
        Ok(deviations
            .iter()
            .enumerate()
            .map(|(col, sd)| sd * self.matrix.coefficient(row, col))
            .collect())
    }
}
