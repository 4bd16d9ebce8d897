// marksman-core/src/batch.rs
//! Concurrent grading of independent requests.

use std::sync::Arc;

use log::{debug, warn};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::engine::GradingEngine;
use crate::errors::GradingError;
use crate::report::{GradingReport, GradingRequest};

/// Grades every request, at most `concurrency` at a time.
///
/// Each request succeeds or fails on its own; the returned vector has one
/// entry per request, in input order.
pub async fn grade_batch(
    engine: Arc<GradingEngine>,
    requests: Vec<GradingRequest>,
    concurrency: usize,
) -> Vec<Result<GradingReport, GradingError>> {
    let total = requests.len();
    let permits = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks = JoinSet::new();

    debug!("Grading batch of {} request(s) with concurrency {}.", total, concurrency.max(1));

    for (position, request) in requests.into_iter().enumerate() {
        let engine = Arc::clone(&engine);
        let permits = Arc::clone(&permits);
        tasks.spawn(async move {
            let outcome = match permits.acquire_owned().await {
                Ok(_permit) => engine.grade(&request).await,
                Err(e) => Err(GradingError::AnyhowWrapper(anyhow::anyhow!("batch semaphore closed: {}", e))),
            };
            (position, outcome)
        });
    }

    let mut slots: Vec<Option<Result<GradingReport, GradingError>>> = (0..total).map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((position, outcome)) => slots[position] = Some(outcome),
            Err(e) => warn!("Grading task failed to complete: {}", e),
        }
    }

    slots
        .into_iter()
        .map(|slot| {
            slot.unwrap_or_else(|| Err(GradingError::AnyhowWrapper(anyhow::anyhow!("grading task aborted"))))
        })
        .collect()
}
