//! Cleaning configuration loading.
//!
//! A configuration document selects and parameterizes the pipeline stages.
//! JSON is the canonical format; files with a `.yaml`/`.yml` extension are
//! parsed as YAML instead. All keys are optional and default to "disabled" /
//! empty; unknown keys are ignored.
//!
//! ```json
//! {
//!   "drop_na": true,
//!   "drop_duplicates": true,
//!   "data_type_corrections": { "age": "integer", "score": "float" },
//!   "remove_columns": ["internal_id"]
//! }
//! ```

use std::{collections::BTreeMap, fs, path::Path};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::{data::ColumnType, error::PipelineError};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CleaningConfig {
    /// Remove rows containing at least one missing value.
    #[serde(default)]
    pub drop_na: bool,
    /// Remove exact-duplicate rows, keeping the first occurrence.
    #[serde(default)]
    pub drop_duplicates: bool,
    /// Target type per column; columns absent from the dataset are skipped.
    #[serde(default)]
    pub data_type_corrections: BTreeMap<String, ColumnType>,
    /// Columns to drop; names absent from the dataset are silently ignored.
    #[serde(default)]
    pub remove_columns: Vec<String>,
}

impl CleaningConfig {
    /// Loads the configuration, failing the run when the document is
    /// missing, unreadable, or malformed. There is no usable default
    /// configuration: an all-defaults document would make every stage a
    /// no-op, indistinguishable from "nothing configured".
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        Self::read(path).map_err(|err| PipelineError::ConfigLoad {
            path: path.to_path_buf(),
            reason: format!("{err:#}"),
        })
    }

    fn read(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Reading configuration file {path:?}"))?;
        let is_yaml = matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml")
        );
        let config = if is_yaml {
            serde_yaml::from_str(&raw)
                .with_context(|| format!("Parsing YAML configuration {path:?}"))?
        } else {
            serde_json::from_str(&raw)
                .with_context(|| format!("Parsing JSON configuration {path:?}"))?
        };
        Ok(config)
    }

    /// True when no stage is enabled; the pipeline then degenerates to a
    /// plain copy of the input.
    pub fn is_noop(&self) -> bool {
        !self.drop_na
            && !self.drop_duplicates
            && self.data_type_corrections.is_empty()
            && self.remove_columns.is_empty()
    }
}
