//! Additive variation of block-structured tables.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::blocks::{BlockIndex, StdTable};
use crate::format::FormatTemplate;
use crate::lines::{parse_values, read_lines, VariedLines};
use crate::{Result, VaryError};

/// Baseline table together with the layout and standard-deviation table
/// that perturb it.
#[derive(Debug, Clone)]
pub struct BlockDataVarier {
    path: PathBuf,
    lines: Vec<String>,
    template: FormatTemplate,
    std_table: StdTable,
}

impl BlockDataVarier {
    pub fn new(
        path: PathBuf,
        lines: Vec<String>,
        template: FormatTemplate,
        std_table: StdTable,
    ) -> Self {
        Self {
            path,
            lines,
            template,
            std_table,
        }
    }

    pub fn load(path: &Path, template: FormatTemplate, std_table: StdTable) -> Result<Self> {
        let lines = read_lines(path)?;
        Ok(Self::new(path.to_path_buf(), lines, template, std_table))
    }

    /// Offset every data line by its scaled standard deviations.
    ///
    /// Non-data lines are copied unchanged. Block numbers come from this
    /// file's own data-line ordinals; deviations come from the
    /// standard-deviation row at the same line index.
    pub fn vary(&self) -> Result<VariedLines> {
        let index = BlockIndex::build(&self.lines);
        let mut out = Vec::with_capacity(self.lines.len());
        let mut varied = 0;

        for (line_idx, line) in self.lines.iter().enumerate() {
            let Some(block) = index.block_of(line_idx) else {
                out.push(line.clone());
                continue;
            };

            let means = parse_values(line, &self.path, line_idx)?;
            let deviations = self.std_table.scaled_deviations(line_idx, block)?;
            if means.len() != deviations.len() {
                return Err(VaryError::ColumnMismatch {
                    path: self.path.clone(),
                    line: line_idx + 1,
                    expected: deviations.len(),
                    got: means.len(),
                });
            }

            let values: Vec<f64> = means
                .iter()
                .zip(&deviations)
                .map(|(mean, sd)| mean + sd)
                .collect();
            let rendered = self.template.render(&values).map_err(|_| {
                VaryError::ColumnMismatch {
                    path: self.path.clone(),
                    line: line_idx + 1,
                    expected: self.template.repeat_count,
                    got: values.len(),
                }
            })?;

            out.push(rendered);
            varied += 1;
        }

        debug!(path = %self.path.display(), varied, "varied table lines");
        Ok(VariedLines { lines: out, varied })
    }
}
