use std::time::Instant;

use chrono::{DateTime, Utc};
use fraudlens_parser::schema::{CC_NUM_MASKED, EXCLUDED_OUTPUT_COLUMNS, FLATTENED_COLUMNS};
use fraudlens_parser::{load_json_lines, LoadReport, LoadedSource};
use once_cell::sync::Lazy;
use polars::prelude::DataFrame;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::flatten::flatten_transaction_fields;
use crate::masking::mask_card_numbers;
use crate::session::PipelineSession;
use crate::summary::{summarize_fraud_by_category, CategoryCount, FraudSummary};
use crate::timestamp_normalizer::normalize_timestamps;
use crate::unnest::{parse_address, parse_personal_detail};

/// One `DataFrame -> DataFrame` step of the transaction pipeline.
pub trait TransformStage: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn apply(&self, df: &DataFrame) -> Result<DataFrame>;
}

static STAGES: Lazy<Vec<&'static dyn TransformStage>> = Lazy::new(|| {
    vec![
        &PersonalDetailStage as &dyn TransformStage,
        &AddressStage as &dyn TransformStage,
        &FlattenStage as &dyn TransformStage,
        &TimestampStage as &dyn TransformStage,
        &MaskingStage as &dyn TransformStage,
        &OutputProjectionStage as &dyn TransformStage,
    ]
});

/// The stages in execution order.
pub fn all_stages() -> &'static [&'static dyn TransformStage] {
    STAGES.as_slice()
}

struct PersonalDetailStage;

impl TransformStage for PersonalDetailStage {
    fn name(&self) -> &'static str {
        "personal_detail"
    }

    fn description(&self) -> &'static str {
        "Decode personal_detail into the personal_detail_json struct"
    }

    fn apply(&self, df: &DataFrame) -> Result<DataFrame> {
        Ok(parse_personal_detail(df)?)
    }
}

struct AddressStage;

impl TransformStage for AddressStage {
    fn name(&self) -> &'static str {
        "address"
    }

    fn description(&self) -> &'static str {
        "Decode personal_detail_json.address into the address_json struct"
    }

    fn apply(&self, df: &DataFrame) -> Result<DataFrame> {
        Ok(parse_address(df)?)
    }
}

struct FlattenStage;

impl TransformStage for FlattenStage {
    fn name(&self) -> &'static str {
        "flatten"
    }

    fn description(&self) -> &'static str {
        "Project nested fields into typed top-level columns"
    }

    fn apply(&self, df: &DataFrame) -> Result<DataFrame> {
        Ok(flatten_transaction_fields(df)?)
    }
}

struct TimestampStage;

impl TransformStage for TimestampStage {
    fn name(&self) -> &'static str {
        "timestamps"
    }

    fn description(&self) -> &'static str {
        "Label transaction and merchant timestamps with Asia/Kuala_Lumpur"
    }

    fn apply(&self, df: &DataFrame) -> Result<DataFrame> {
        Ok(normalize_timestamps(df)?)
    }
}

struct MaskingStage;

impl TransformStage for MaskingStage {
    fn name(&self) -> &'static str {
        "masking"
    }

    fn description(&self) -> &'static str {
        "Add the SHA-256 cc_num_masked column"
    }

    fn apply(&self, df: &DataFrame) -> Result<DataFrame> {
        Ok(mask_card_numbers(df)?)
    }
}

struct OutputProjectionStage;

impl TransformStage for OutputProjectionStage {
    fn name(&self) -> &'static str {
        "output_projection"
    }

    fn description(&self) -> &'static str {
        "Drop cc_num and any leftover nested source columns"
    }

    fn apply(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut output = df.clone();
        for name in EXCLUDED_OUTPUT_COLUMNS {
            if output.get_column_index(name).is_some() {
                output = output.drop(name)?;
            }
        }
        Ok(output)
    }
}

/// Column layout of the processed frame for a raw frame with `raw_columns`.
///
/// Raw columns keep their order minus the excluded ones; derived columns that do not replace a
/// raw column of the same name are appended.
pub fn output_columns<S: AsRef<str>>(raw_columns: &[S]) -> Vec<String> {
    let mut columns: Vec<String> = raw_columns
        .iter()
        .map(|name| name.as_ref())
        .filter(|name| !EXCLUDED_OUTPUT_COLUMNS.contains(name))
        .map(str::to_string)
        .collect();

    for name in FLATTENED_COLUMNS.iter().chain([CC_NUM_MASKED].iter()) {
        if !columns.iter().any(|existing| existing == name) {
            columns.push((*name).to_string());
        }
    }

    columns
}

#[derive(Debug, Clone, Serialize)]
pub struct StageTiming {
    pub stage: &'static str,
    pub duration_ms: f64,
}

#[derive(Debug, Clone)]
pub struct ProcessedFrame {
    pub frame: DataFrame,
    pub timings: Vec<StageTiming>,
}

/// Runs every stage in order over `df`.
///
/// Fails if a stage changes the row count or the final layout differs from
/// [`output_columns`].
pub fn process_frame(df: DataFrame) -> Result<ProcessedFrame> {
    let expected = df.height();
    let raw_columns: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();

    let mut current = df;
    let mut timings = Vec::with_capacity(all_stages().len());

    for stage in all_stages() {
        let started = Instant::now();
        let next = stage.apply(&current)?;
        if next.height() != expected {
            return Err(PipelineError::RowCountChanged {
                stage: stage.name(),
                expected,
                found: next.height(),
            });
        }

        let duration_ms = started.elapsed().as_secs_f64() * 1_000.0;
        debug!(
            stage = stage.name(),
            rows = next.height(),
            columns = next.width(),
            duration_ms,
            "stage complete"
        );
        timings.push(StageTiming {
            stage: stage.name(),
            duration_ms,
        });
        current = next;
    }

    let expected_columns = output_columns(&raw_columns);
    let found_columns: Vec<String> = current
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    if found_columns != expected_columns {
        return Err(PipelineError::SchemaMismatch {
            expected: expected_columns,
            found: found_columns,
        });
    }

    Ok(ProcessedFrame {
        frame: current,
        timings,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub load: LoadReport,
    pub input_rows: usize,
    pub output_rows: usize,
    pub output_columns: Vec<String>,
    pub stages: Vec<StageTiming>,
    pub fraud_counts: Option<Vec<CategoryCount>>,
}

#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub processed: DataFrame,
    pub summary: Option<FraudSummary>,
    pub report: RunReport,
}

/// Loads `config.input` and runs the whole pipeline inside a session.
pub fn run_pipeline(config: &PipelineConfig) -> Result<PipelineRun> {
    with_session(|session| {
        let loaded = load_json_lines(&config.input, config.corrupt_mode)?;
        finish_run(session, loaded)
    })
}

/// Runs the pipeline over an already loaded source.
pub fn run_loaded(loaded: LoadedSource) -> Result<PipelineRun> {
    with_session(|session| finish_run(session, loaded))
}

fn with_session<T>(f: impl FnOnce(&PipelineSession) -> Result<T>) -> Result<T> {
    let session = PipelineSession::open("fraud_by_category");
    let result = session.in_scope(|| f(&session));
    if let Err(err) = &result {
        session.in_scope(|| warn!(error = %err, "pipeline run failed"));
    }
    session.close();
    result
}

fn finish_run(session: &PipelineSession, loaded: LoadedSource) -> Result<PipelineRun> {
    let LoadedSource { frame, report } = loaded;
    let input_rows = frame.height();

    let processed = process_frame(frame)?;

    let summary = match summarize_fraud_by_category(&processed.frame) {
        Ok(summary) => Some(summary),
        Err(err) => {
            warn!(error = %err, "fraud summary unavailable");
            None
        }
    };

    let report = RunReport {
        run_id: session.run_id(),
        started_at: session.started_at(),
        finished_at: Utc::now(),
        load: report,
        input_rows,
        output_rows: processed.frame.height(),
        output_columns: processed
            .frame
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect(),
        stages: processed.timings,
        fraud_counts: summary.as_ref().map(|summary| summary.counts.clone()),
    };

    info!(
        input_rows = report.input_rows,
        output_rows = report.output_rows,
        "pipeline run complete"
    );

    Ok(PipelineRun {
        processed: processed.frame,
        summary,
        report,
    })
}
