pub mod chart;
pub mod config;
pub mod error;
pub mod flatten;
pub mod masking;
pub mod outputs;
pub mod pipeline;
pub mod preview;
pub mod session;
pub mod summary;
pub mod timestamp_normalizer;
pub mod unnest;

pub use error::{PipelineError, Result};
pub use pipeline::{process_frame, run_loaded, run_pipeline, PipelineRun, RunReport};
