use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Result, VaryError};

/// How perturbation coefficients are drawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SamplingMode {
    /// Every coefficient is zero; outputs reproduce the baselines.
    Zero,
    /// Standard normal draws, reproducible when a seed is given.
    Normal {
        #[serde(default)]
        seed: Option<u64>,
    },
}

impl Default for SamplingMode {
    fn default() -> Self {
        Self::Normal { seed: None }
    }
}

/// What to do when more than one key matches a scalar line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmbiguityPolicy {
    /// Stop the whole batch.
    #[default]
    Abort,
    /// Leave the line unchanged and continue.
    Skip,
}

/// Where inputs live and how output names are derived.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLayout {
    /// Newline-delimited list of table names.
    pub table_list: PathBuf,
    /// Directory holding baseline tables and standard-deviation tables.
    pub table_dir: PathBuf,
    /// Directory holding the format descriptors.
    pub descriptor_dir: PathBuf,
    pub descriptor_ext: String,
    pub table_ext: String,
    /// Appended to a table name to form its standard-deviation table name.
    pub std_suffix: String,
    /// Marker of the unperturbed copy, `<prefix><baseline_marker>.<ext>`.
    pub baseline_marker: String,
    /// Marker of the perturbed copy, `<prefix><output_marker>.<ext>`.
    pub output_marker: String,
    /// `key,standard_deviation` table for scalar files.
    pub effects_table: PathBuf,
    pub scalar_ext: String,
}

impl Default for FileLayout {
    fn default() -> Self {
        Self {
            table_list: PathBuf::from("betafiles.txt"),
            table_dir: PathBuf::from("modfile"),
            descriptor_dir: PathBuf::from("input").join("inputchk"),
            descriptor_ext: "def".to_string(),
            table_ext: "dat".to_string(),
            std_suffix: "sd".to_string(),
            baseline_marker: "_mc0".to_string(),
            output_marker: "_mc".to_string(),
            effects_table: PathBuf::from("effect_mc.txt"),
            scalar_ext: "inp".to_string(),
        }
    }
}

impl FileLayout {
    pub fn descriptor_path(&self, root: &Path, table: &str) -> PathBuf {
        root.join(&self.descriptor_dir)
            .join(format!("{table}.{}", self.descriptor_ext))
    }

    pub fn std_table_path(&self, root: &Path, table: &str) -> PathBuf {
        root.join(&self.table_dir)
            .join(format!("{table}{}.{}", self.std_suffix, self.table_ext))
    }

    pub fn table_baseline_path(&self, root: &Path, table: &str) -> PathBuf {
        marked_path(root.join(&self.table_dir), table, &self.baseline_marker, &self.table_ext)
    }

    pub fn table_output_path(&self, root: &Path, table: &str) -> PathBuf {
        marked_path(root.join(&self.table_dir), table, &self.output_marker, &self.table_ext)
    }

    pub fn scalar_baseline_path(&self, root: &Path, prefix: &str) -> PathBuf {
        marked_path(root.to_path_buf(), prefix, &self.baseline_marker, &self.scalar_ext)
    }

    pub fn scalar_output_path(&self, root: &Path, prefix: &str) -> PathBuf {
        marked_path(root.to_path_buf(), prefix, &self.output_marker, &self.scalar_ext)
    }
}

fn marked_path(dir: PathBuf, prefix: &str, marker: &str, ext: &str) -> PathBuf {
    dir.join(format!("{prefix}{marker}.{ext}"))
}

/// Width and precision of the single-field scalar layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScalarField {
    pub width: usize,
    pub precision: usize,
}

impl Default for ScalarField {
    fn default() -> Self {
        Self {
            width: 8,
            precision: 6,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VaryConfig {
    /// Base directory for every relative path in the layout.
    pub root: PathBuf,
    pub layout: FileLayout,
    pub scalar_field: ScalarField,
    pub sampling: SamplingMode,
    pub on_ambiguous_key: AmbiguityPolicy,
}

impl Default for VaryConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            layout: FileLayout::default(),
            scalar_field: ScalarField::default(),
            sampling: SamplingMode::default(),
            on_ambiguous_key: AmbiguityPolicy::default(),
        }
    }
}

impl VaryConfig {
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| VaryError::io(path, e))?;
        let cfg: VaryConfig = toml::from_str(&raw).map_err(|source| VaryError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.scalar_field.width == 0 {
            return Err(VaryError::InvalidConfig(
                "scalar_field.width must be greater than zero".to_string(),
            ));
        }

        let layout = &self.layout;
        if layout.baseline_marker == layout.output_marker {
            return Err(VaryError::InvalidConfig(
                "baseline_marker and output_marker must differ".to_string(),
            ));
        }

        for (name, ext) in [
            ("descriptor_ext", &layout.descriptor_ext),
            ("table_ext", &layout.table_ext),
            ("scalar_ext", &layout.scalar_ext),
        ] {
            if ext.is_empty() || ext.contains('.') {
                return Err(VaryError::InvalidConfig(format!(
                    "{name} must be a non-empty extension without dots"
                )));
            }
        }

        Ok(())
    }

    pub fn is_zero_run(&self) -> bool {
        self.sampling == SamplingMode::Zero
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout_paths() {
        let layout = FileLayout::default();
        let root = Path::new("/run");
        assert_eq!(
            layout.descriptor_path(root, "core"),
            PathBuf::from("/run/input/inputchk/core.def")
        );
        assert_eq!(
            layout.std_table_path(root, "core"),
            PathBuf::from("/run/modfile/coresd.dat")
        );
        assert_eq!(
            layout.table_baseline_path(root, "core"),
            PathBuf::from("/run/modfile/core_mc0.dat")
        );
        assert_eq!(
            layout.table_output_path(root, "core"),
            PathBuf::from("/run/modfile/core_mc.dat")
        );
        assert_eq!(
            layout.scalar_baseline_path(root, "plant"),
            PathBuf::from("/run/plant_mc0.inp")
        );
        assert_eq!(
            layout.scalar_output_path(root, "plant"),
            PathBuf::from("/run/plant_mc.inp")
        );
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let cfg: VaryConfig = toml::from_str(
            r#"
            on_ambiguous_key = "skip"

            [sampling]
            mode = "normal"
            seed = 11

            [layout]
            table_dir = "tables"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.on_ambiguous_key, AmbiguityPolicy::Skip);
        assert_eq!(cfg.sampling, SamplingMode::Normal { seed: Some(11) });
        assert_eq!(cfg.layout.table_dir, PathBuf::from("tables"));
        assert_eq!(cfg.layout.std_suffix, "sd");
        assert_eq!(cfg.scalar_field, ScalarField::default());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_zero_mode_from_toml() {
        let cfg: VaryConfig = toml::from_str("[sampling]\nmode = \"zero\"\n").unwrap();
        assert!(cfg.is_zero_run());
    }

    #[test]
    fn test_validate_rejects_same_markers() {
        let mut cfg = VaryConfig::default();
        cfg.layout.output_marker = cfg.layout.baseline_marker.clone();
        assert!(matches!(cfg.validate(), Err(VaryError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rejects_zero_width() {
        let mut cfg = VaryConfig::default();
        cfg.scalar_field.width = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_from_toml_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mcvary.toml");
        fs::write(&path, "sampling = 3").unwrap();
        match VaryConfig::from_toml_file(&path) {
            Err(VaryError::Config { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected config error, got {other:?}"),
        }
    }
}
