// marksman/src/commands/batch.rs
//! Implements the `batch` subcommand.
//!
//! Reads a JSON array of grading requests, grades them concurrently and
//! writes one JSON entry per request, in input order. A request that fails
//! produces an error entry instead of aborting the whole batch.

use std::fs;
use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use log::{info, warn};
use serde::Serialize;

use marksman_core::{grade_batch, GradingEngine, GradingError, GradingReport, GradingRequest};

use super::{build_analyzer, resolve_config};
use crate::cli::BatchCommand;
use crate::ui::output_format;

/// One element of the batch output.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum BatchEntry {
    Graded(GradingReport),
    Failed {
        question_id: Option<String>,
        status: &'static str,
        error: String,
    },
}

impl BatchEntry {
    fn from_outcome(request: &GradingRequest, outcome: Result<GradingReport, GradingError>) -> Self {
        match outcome {
            Ok(report) => BatchEntry::Graded(report),
            Err(e) => {
                warn!(
                    "Grading failed for question {}: {}",
                    request.question_id.as_deref().unwrap_or("<unnamed>"),
                    e
                );
                BatchEntry::Failed {
                    question_id: request.question_id.clone(),
                    status: "error",
                    error: e.to_string(),
                }
            }
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, BatchEntry::Failed { .. })
    }
}

pub async fn run_batch_command(cmd: BatchCommand, quiet: bool) -> Result<()> {
    let config = resolve_config(&cmd.source)?;

    let raw = fs::read_to_string(&cmd.input)
        .with_context(|| format!("Failed to read batch input {}", cmd.input.display()))?;
    let requests: Vec<GradingRequest> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse batch input {}", cmd.input.display()))?;
    info!("Loaded {} grading request(s) from {}.", requests.len(), cmd.input.display());

    let concurrency = cmd.concurrency.unwrap_or(config.analyzer.concurrency);
    let analyzer = build_analyzer(&config, cmd.source.fixture.as_deref())?;
    let engine = Arc::new(GradingEngine::from_config(&config, analyzer)?);

    let outcomes = grade_batch(engine, requests.clone(), concurrency).await;
    let entries: Vec<BatchEntry> = requests
        .iter()
        .zip(outcomes)
        .map(|(request, outcome)| BatchEntry::from_outcome(request, outcome))
        .collect();

    let failed = entries.iter().filter(|e| e.is_failure()).count();
    let json = serde_json::to_string_pretty(&entries).context("Failed to serialize batch results")?;
    match &cmd.output {
        Some(path) => {
            fs::write(path, json.as_bytes())
                .with_context(|| format!("Failed to write batch results to {}", path.display()))?;
        }
        None => {
            let mut out = io::stdout().lock();
            writeln!(out, "{}", json)?;
        }
    }

    if !quiet {
        output_format::info_msg(format!(
            "Graded {} of {} request(s).",
            entries.len() - failed,
            entries.len()
        ));
        if failed > 0 {
            output_format::warn_msg(format!("{} request(s) failed; see the error entries in the output.", failed));
        }
    }
    Ok(())
}
