//! Multiplicative variation of scalar parameter files.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::config::{AmbiguityPolicy, ScalarField};
use crate::effects::UniqueKeyEffectsTable;
use crate::format::FormatTemplate;
use crate::lines::{parse_number, read_lines, VariedLines};
use crate::{Result, VaryError};

#[derive(Debug, Clone)]
pub struct KeyedLineVarier {
    path: PathBuf,
    lines: Vec<String>,
    effects: UniqueKeyEffectsTable,
    template: FormatTemplate,
    policy: AmbiguityPolicy,
}

impl KeyedLineVarier {
    pub fn new(
        path: PathBuf,
        lines: Vec<String>,
        effects: UniqueKeyEffectsTable,
        field: ScalarField,
        policy: AmbiguityPolicy,
    ) -> Self {
        Self {
            path,
            lines,
            effects,
            template: FormatTemplate::single_field(field.width, field.precision),
            policy,
        }
    }

    pub fn load(
        path: &Path,
        effects: UniqueKeyEffectsTable,
        field: ScalarField,
        policy: AmbiguityPolicy,
    ) -> Result<Self> {
        let lines = read_lines(path)?;
        Ok(Self::new(path.to_path_buf(), lines, effects, field, policy))
    }

    /// Scale the leading value of every key-matched line by
    /// `1 + coefficient`; the line is replaced by the rendered value alone.
    pub fn vary(&self) -> Result<VariedLines> {
        let mut out = Vec::with_capacity(self.lines.len());
        let mut varied = 0;

        for (line_idx, line) in self.lines.iter().enumerate() {
            let coefficient = match self.effects.lookup(line) {
                Ok(Some(coefficient)) => coefficient,
                Ok(None) => {
                    out.push(line.clone());
                    continue;
                }
                Err(VaryError::AmbiguousKey { keys, .. })
                    if self.policy == AmbiguityPolicy::Skip =>
                {
                    warn!(
                        path = %self.path.display(),
                        line = line_idx + 1,
                        keys = %keys.join(","),
                        "skipping line matched by several keys"
                    );
                    out.push(line.clone());
                    continue;
                }
                Err(err) => return Err(err),
            };

            let token = line.split_whitespace().next().unwrap_or_default();
            let mean = parse_number(token, &self.path, line_idx)?;
            out.push(self.template.render(&[mean + coefficient * mean])?);
            varied += 1;
        }

        Ok(VariedLines { lines: out, varied })
    }
}
