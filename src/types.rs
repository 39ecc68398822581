// src/types.rs
use serde::Serialize;
use std::path::PathBuf;

/// The pipeline stage a report belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Extract,
    Propagate,
    Finalize,
}

/// Results for a single committed stage run.
#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
    pub stage: Stage,
    pub output: PathBuf,
    pub records_in: usize,
    pub records_out: usize,
    /// SHA-256 of the committed output, hex encoded. Reruns against the same
    /// input must reproduce this digest exactly.
    pub output_digest: String,
    pub duration_ms: u128,
}

impl StageReport {
    /// Returns the number of records dropped by this stage.
    #[must_use]
    pub fn dropped(&self) -> usize {
        self.records_in.saturating_sub(self.records_out)
    }
}

/// Aggregated results for a full multi-round run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub stages: Vec<StageReport>,
    /// Propagation rounds actually executed. Lower than the configured count
    /// only when a convergence threshold stopped the loop early.
    pub rounds_run: usize,
    pub nodes: usize,
    pub duration_ms: u128,
}

impl PipelineReport {
    /// Returns the report of the final stage, if any stage ran.
    #[must_use]
    pub fn last_stage(&self) -> Option<&StageReport> {
        self.stages.last()
    }
}
