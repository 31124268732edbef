use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use polars::io::parquet::write::{ParquetCompression, ParquetWriter, StatisticsOptions};
use polars::prelude::DataFrame;
use tracing::info;

use crate::pipeline::RunReport;

/// Writes the processed frame as zstd-compressed parquet.
pub fn write_parquet(dataframe: &DataFrame, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let mut clone = dataframe.clone();
    ParquetWriter::new(file)
        .with_compression(ParquetCompression::Zstd(None))
        .with_statistics(StatisticsOptions::default())
        .finish(&mut clone)
        .context("failed to write parquet output")?;

    info!(path = %path.display(), rows = dataframe.height(), "wrote parquet output");
    Ok(())
}

pub fn write_run_report(report: &RunReport, path: &Path) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(report).context("failed to serialize run report")?;
    std::fs::write(path, bytes)
        .with_context(|| format!("failed to write run report to {}", path.display()))?;
    Ok(())
}

pub fn write_chart(svg: &str, path: &Path) -> Result<()> {
    std::fs::write(path, svg)
        .with_context(|| format!("failed to write chart to {}", path.display()))?;
    info!(path = %path.display(), "wrote fraud chart");
    Ok(())
}
