// src/pipeline.rs
//! Stage runners and the multi-round orchestrator.
//!
//! Each stage reads one committed generation and writes the next one whole:
//! output lands in a sibling temp file and is renamed over the destination
//! only on full success, so a failed or aborted stage never leaves partial
//! state and a rerun against unchanged input is byte-identical.

use crate::config::PipelineConfig;
use crate::corpus;
use crate::engine;
use crate::error::{RankError, Result};
use crate::extract;
use crate::finalize;
use crate::record::{self, GraphNode};
use crate::types::{PipelineReport, Stage, StageReport};
use rayon::prelude::*;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// File name of the final ranking inside the work directory.
pub const RESULT_FILE: &str = "result";

pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    #[must_use]
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs link extraction over the raw corpus, seeding generation zero.
    ///
    /// Invalid and malformed documents are skipped, never surfaced.
    ///
    /// # Errors
    ///
    /// Returns an error if the corpus cannot be read or the output cannot be
    /// committed.
    pub fn run_extraction(&self, input: &Path, output: &Path) -> Result<StageReport> {
        let start = Instant::now();

        let documents = corpus::collect_documents(input)?;
        let mut nodes: Vec<GraphNode> = documents
            .par_iter()
            .filter_map(|doc| extract::extract_node(doc))
            .collect();
        nodes.sort_by(|a, b| a.id.cmp(&b.id));

        if self.config.verbose {
            let skipped = documents.len() - nodes.len();
            if skipped > 0 {
                eprintln!("WARN: Skipped {skipped} invalid or malformed documents");
            }
        }

        let digest = commit(output, &record::encode_records(&nodes))?;
        Ok(StageReport {
            stage: Stage::Extract,
            output: output.to_path_buf(),
            records_in: documents.len(),
            records_out: nodes.len(),
            output_digest: digest,
            duration_ms: start.elapsed().as_millis(),
        })
    }

    /// Runs one propagation round from one generation file to the next.
    ///
    /// # Errors
    ///
    /// Any malformed input record or grouping corruption fails the whole
    /// round; nothing is committed in that case and the round can be retried
    /// from its unmodified input.
    pub fn run_propagation_round(&self, input: &Path, output: &Path) -> Result<StageReport> {
        self.propagate_with_delta(input, output)
            .map(|(report, _)| report)
    }

    fn propagate_with_delta(&self, input: &Path, output: &Path) -> Result<(StageReport, f64)> {
        let start = Instant::now();

        let mut nodes = record::read_records(input)?;
        nodes.sort_by(|a, b| a.id.cmp(&b.id));
        let next = engine::propagate_round(&nodes, &self.config)?;
        let delta = engine::max_delta(&nodes, &next);

        let digest = commit(output, &record::encode_records(&next))?;
        let report = StageReport {
            stage: Stage::Propagate,
            output: output.to_path_buf(),
            records_in: nodes.len(),
            records_out: next.len(),
            output_digest: digest,
            duration_ms: start.elapsed().as_millis(),
        };
        Ok((report, delta))
    }

    /// Projects the final generation to `(rank, id)` lines in sort order.
    ///
    /// # Errors
    ///
    /// Returns an error if the input generation is unreadable or malformed,
    /// or the output cannot be committed.
    pub fn run_finalize(&self, input: &Path, output: &Path) -> Result<StageReport> {
        let start = Instant::now();

        let nodes = record::read_records(input)?;
        let ranking = finalize::finalize(&nodes, self.config.sort_order);

        let digest = commit(output, &finalize::encode_ranking(&ranking))?;
        Ok(StageReport {
            stage: Stage::Finalize,
            output: output.to_path_buf(),
            records_in: nodes.len(),
            records_out: ranking.len(),
            output_digest: digest,
            duration_ms: start.elapsed().as_millis(),
        })
    }

    /// Runs the full pipeline: extraction, the configured number of rounds,
    /// then finalize. The first failing stage aborts the run; later rounds
    /// never start before the previous generation is committed.
    ///
    /// # Errors
    ///
    /// Propagates the first stage failure.
    pub fn run(&self, input: &Path, work_dir: &Path) -> Result<PipelineReport> {
        let start = Instant::now();
        self.config.validate()?;
        std::fs::create_dir_all(work_dir).map_err(|e| RankError::io(e, work_dir))?;

        let mut stages = Vec::new();

        let mut current = round_path(work_dir, 0);
        let seed = self.run_extraction(input, &current)?;
        let nodes = seed.records_out;
        stages.push(seed);

        let mut rounds_run = 0;
        for round in 0..self.config.rounds {
            let next_path = round_path(work_dir, round + 1);
            let (report, delta) = self.propagate_with_delta(&current, &next_path)?;
            stages.push(report);
            current = next_path;
            rounds_run += 1;

            if let Some(threshold) = self.config.convergence_threshold {
                if delta <= threshold {
                    if self.config.verbose {
                        eprintln!(
                            "Converged after {rounds_run} rounds (max delta {delta})"
                        );
                    }
                    break;
                }
            }
        }

        stages.push(self.run_finalize(&current, &work_dir.join(RESULT_FILE))?);

        Ok(PipelineReport {
            stages,
            rounds_run,
            nodes,
            duration_ms: start.elapsed().as_millis(),
        })
    }
}

/// Generation file path for a round index: `iter00`, `iter01`, ...
///
/// The round index is threaded explicitly by the orchestrator; there is no
/// shared counter.
#[must_use]
pub fn round_path(work_dir: &Path, round: usize) -> PathBuf {
    work_dir.join(format!("iter{round:02}"))
}

/// Writes `content` to `output` atomically and returns its digest.
///
/// The full payload goes to a sibling `.tmp` file first; the rename is the
/// commit point.
fn commit(output: &Path, content: &str) -> Result<String> {
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| RankError::io(e, parent))?;
        }
    }

    let mut tmp = output.as_os_str().to_os_string();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    std::fs::write(&tmp, content).map_err(|e| RankError::io(e, &tmp))?;
    std::fs::rename(&tmp, output).map_err(|e| RankError::io(e, output))?;

    Ok(compute_sha256(content))
}

/// Computes the SHA256 hex digest of a committed generation.
#[must_use]
pub fn compute_sha256(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}
