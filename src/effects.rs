//! Key-matched scalar coefficients.
//!
//! The effects table is a header line followed by `key,standard_deviation`
//! rows. Each row draws one coefficient at load time. A line is matched by
//! every key that occurs in it as a substring; keys are scanned in declared
//! order and a line matched by more than one key is rejected.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, Trim};

use crate::sampler::CoefficientSource;
use crate::{Result, VaryError};

#[derive(Debug, Clone, PartialEq)]
pub struct KeyEffect {
    pub key: String,
    pub coefficient: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UniqueKeyEffectsTable {
    effects: Vec<KeyEffect>,
}

impl UniqueKeyEffectsTable {
    pub fn load(path: &Path, source: &mut dyn CoefficientSource) -> Result<Self> {
        let file = File::open(path).map_err(|e| VaryError::io(path, e))?;
        Self::from_reader(path, file, source)
    }

    /// Parse a table from `reader`; `path` only labels errors.
    pub fn from_reader<R: Read>(
        path: &Path,
        reader: R,
        source: &mut dyn CoefficientSource,
    ) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::None)
            .from_reader(reader);

        let mut table = Self::default();
        for record in rdr.records() {
            let record = record.map_err(|source| VaryError::Csv {
                path: path.to_path_buf(),
                source,
            })?;
            let line = record.position().map_or(0, |p| p.line() as usize);
            let row_error = |reason: String| VaryError::InvalidEffectRow {
                path: path.to_path_buf(),
                line,
                reason,
            };

            if record.len() != 2 {
                return Err(row_error(format!(
                    "expected key,standard_deviation but found {} fields",
                    record.len()
                )));
            }

            let key = &record[0];
            if key.is_empty() {
                return Err(row_error("key must not be empty".to_string()));
            }
            let sd: f64 = record[1].trim().parse().map_err(|_| {
                row_error(format!("cannot parse '{}' as a standard deviation", &record[1]))
            })?;

            table.insert(key, sd * source.next_coefficient());
        }

        Ok(table)
    }

    /// Build from already-scaled coefficients.
    pub fn from_coefficients<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        let mut table = Self::default();
        for (key, coefficient) in pairs {
            let key: String = key.into();
            table.insert(&key, coefficient);
        }
        table
    }

    // A repeated key keeps its first position and takes the newer value.
    fn insert(&mut self, key: &str, coefficient: f64) {
        match self.effects.iter_mut().find(|effect| effect.key == key) {
            Some(effect) => effect.coefficient = coefficient,
            None => self.effects.push(KeyEffect {
                key: key.to_string(),
                coefficient,
            }),
        }
    }

    pub fn effects(&self) -> &[KeyEffect] {
        &self.effects
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Coefficient of the single key contained in `line`.
    ///
    /// `Ok(None)` when no key matches; `AmbiguousKey` when several do.
    pub fn lookup(&self, line: &str) -> Result<Option<f64>> {
        let mut matches = self.effects.iter().filter(|effect| line.contains(&effect.key));
        let Some(first) = matches.next() else {
            return Ok(None);
        };

        let others: Vec<&KeyEffect> = matches.collect();
        if !others.is_empty() {
            let keys = std::iter::once(first)
                .chain(others)
                .map(|effect| effect.key.clone())
                .collect();
            return Err(VaryError::AmbiguousKey {
                line: line.to_string(),
                keys,
            });
        }

        Ok(Some(first.coefficient))
    }
}
