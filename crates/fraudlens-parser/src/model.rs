use std::fmt;
use std::str::FromStr;

use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

/// What the loader does with a line that is not a JSON object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorruptRecordMode {
    /// Keep the row with every column null.
    #[default]
    Permissive,
    /// Skip the line.
    DropMalformed,
    /// Abort the load.
    FailFast,
}

impl CorruptRecordMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CorruptRecordMode::Permissive => "permissive",
            CorruptRecordMode::DropMalformed => "drop_malformed",
            CorruptRecordMode::FailFast => "fail_fast",
        }
    }
}

impl fmt::Display for CorruptRecordMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CorruptRecordMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "permissive" => Ok(CorruptRecordMode::Permissive),
            "drop_malformed" | "dropmalformed" => Ok(CorruptRecordMode::DropMalformed),
            "fail_fast" | "failfast" => Ok(CorruptRecordMode::FailFast),
            other => Err(format!("unknown corrupt record mode '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    pub source: String,
    pub content_hash: String,
    pub mode: CorruptRecordMode,
    pub total_lines: usize,
    pub loaded_rows: usize,
    pub corrupt_lines: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct LoadedSource {
    pub frame: DataFrame,
    pub report: LoadReport,
}
