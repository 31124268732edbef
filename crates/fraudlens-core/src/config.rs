use std::path::PathBuf;

use fraudlens_parser::CorruptRecordMode;

pub const DEFAULT_PREVIEW_ROWS: usize = 20;

pub const INPUT_ENV: &str = "FRAUDLENS_INPUT";
pub const CORRUPT_MODE_ENV: &str = "FRAUDLENS_CORRUPT_MODE";
pub const CHART_PATH_ENV: &str = "FRAUDLENS_CHART_PATH";

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub corrupt_mode: CorruptRecordMode,
    pub preview_rows: usize,
}

impl PipelineConfig {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            corrupt_mode: CorruptRecordMode::default(),
            preview_rows: DEFAULT_PREVIEW_ROWS,
        }
    }

    pub fn with_corrupt_mode(mut self, mode: CorruptRecordMode) -> Self {
        self.corrupt_mode = mode;
        self
    }

    pub fn with_preview_rows(mut self, rows: usize) -> Self {
        self.preview_rows = rows;
        self
    }
}
