//! Batch driver: one pass over every requested table and scalar file.

use std::path::PathBuf;

use tracing::info;

use crate::blocks::StdTable;
use crate::config::VaryConfig;
use crate::effects::UniqueKeyEffectsTable;
use crate::format::FormatTemplate;
use crate::lines::read_name_file;
use crate::sampler::{source_for, CoefficientSource};
use crate::scalar::KeyedLineVarier;
use crate::table::BlockDataVarier;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub name: String,
    pub output: PathBuf,
    pub varied_lines: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub tables: Vec<FileReport>,
    pub scalars: Vec<FileReport>,
}

impl RunSummary {
    pub fn files_written(&self) -> usize {
        self.tables.len() + self.scalars.len()
    }
}

/// Table names from the configured list file.
pub fn table_names(config: &VaryConfig) -> Result<Vec<String>> {
    read_name_file(&config.root.join(&config.layout.table_list))
}

/// Vary one block-structured table and write its perturbed copy.
pub fn vary_table(
    config: &VaryConfig,
    name: &str,
    source: &mut dyn CoefficientSource,
) -> Result<FileReport> {
    let layout = &config.layout;
    let root = &config.root;

    let template =
        FormatTemplate::from_descriptor_file(name, &layout.descriptor_path(root, name))?;
    let std_table = StdTable::load(&layout.std_table_path(root, name), source)?;
    let varier =
        BlockDataVarier::load(&layout.table_baseline_path(root, name), template, std_table)?;

    let result = varier.vary()?;
    let output = layout.table_output_path(root, name);
    result.write_to(&output)?;

    info!(
        table = name,
        output = %output.display(),
        varied = result.varied,
        "wrote varied table"
    );
    Ok(FileReport {
        name: name.to_string(),
        output,
        varied_lines: result.varied,
    })
}

/// Vary one scalar parameter file with a freshly drawn effects table.
pub fn vary_scalar(
    config: &VaryConfig,
    prefix: &str,
    source: &mut dyn CoefficientSource,
) -> Result<FileReport> {
    let layout = &config.layout;
    let root = &config.root;

    let effects = UniqueKeyEffectsTable::load(&root.join(&layout.effects_table), source)?;
    let varier = KeyedLineVarier::load(
        &layout.scalar_baseline_path(root, prefix),
        effects,
        config.scalar_field,
        config.on_ambiguous_key,
    )?;

    let result = varier.vary()?;
    let output = layout.scalar_output_path(root, prefix);
    result.write_to(&output)?;

    info!(
        file = prefix,
        output = %output.display(),
        varied = result.varied,
        "wrote varied scalar file"
    );
    Ok(FileReport {
        name: prefix.to_string(),
        output,
        varied_lines: result.varied,
    })
}

/// Vary every table, then every scalar file. The first error stops the batch.
pub fn run_batch(config: &VaryConfig, tables: &[String], scalars: &[String]) -> Result<RunSummary> {
    config.validate()?;
    if config.is_zero_run() {
        info!("zero run: all coefficients are zero");
    }
    let mut source = source_for(&config.sampling);

    let mut summary = RunSummary::default();
    for name in tables {
        summary.tables.push(vary_table(config, name, source.as_mut())?);
    }
    for prefix in scalars {
        summary.scalars.push(vary_scalar(config, prefix, source.as_mut())?);
    }

    Ok(summary)
}
