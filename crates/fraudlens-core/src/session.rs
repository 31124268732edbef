use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::{info, info_span, warn, Span};
use uuid::Uuid;

/// Run-scoped context: run id, start time and the `pipeline_run` tracing span.
///
/// Released by [`PipelineSession::close`], or on drop when a run unwinds early.
#[derive(Debug)]
pub struct PipelineSession {
    run_id: Uuid,
    label: String,
    started_at: DateTime<Utc>,
    started: Instant,
    span: Span,
    released: bool,
}

impl PipelineSession {
    pub fn open(label: &str) -> Self {
        let run_id = Uuid::new_v4();
        let span = info_span!("pipeline_run", %run_id, label);
        span.in_scope(|| info!("pipeline session opened"));

        Self {
            run_id,
            label: label.to_string(),
            started_at: Utc::now(),
            started: Instant::now(),
            span,
            released: false,
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        self.span.in_scope(f)
    }

    /// Releases the session and returns how long it was open.
    pub fn close(mut self) -> Duration {
        self.release(true)
    }

    fn release(&mut self, completed: bool) -> Duration {
        self.released = true;
        let elapsed = self.started.elapsed();
        let elapsed_ms = elapsed.as_secs_f64() * 1_000.0;
        self.span.in_scope(|| {
            if completed {
                info!(elapsed_ms, "pipeline session closed");
            } else {
                warn!(elapsed_ms, "pipeline session released without close");
            }
        });
        elapsed
    }
}

impl Drop for PipelineSession {
    fn drop(&mut self) {
        if !self.released {
            self.release(false);
        }
    }
}
