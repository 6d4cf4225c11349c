//! Per-file read-then-parse pipeline.
//!
//! Each file in a selection batch is read asynchronously (the read is the
//! only suspension point) and then parsed synchronously; files in a batch
//! proceed concurrently and share no state. Results are assembled only once
//! every read completes, and a caller replaces its previous derived state
//! wholesale with the returned batch.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::duration::{extract_durations, DurationSample};
use crate::error::ExtractError;
use crate::plan::{extract_mariadb, extract_mysql, extract_postgres, PlanNode};
use crate::sysbench::{extract_metrics, extract_summary, BenchmarkSummary, MetricSample};

/// Everything extracted from one sysbench log.
#[derive(Debug, Clone)]
pub struct SysbenchReport {
    pub series: Vec<MetricSample>,
    pub summary: Option<BenchmarkSummary>,
}

/// Extracts every plan in `content`, trying engines in order: PostgreSQL
/// first; on no match, a `cost_info` occurrence selects MySQL, otherwise
/// MariaDB. Empty when no engine recognizes the text.
pub fn extract_plans(content: &str) -> Vec<PlanNode> {
    let plans = extract_postgres(content);
    if !plans.is_empty() {
        return plans;
    }

    let plans = if content.contains("cost_info") {
        extract_mysql(content)
    } else {
        extract_mariadb(content)
    };

    if plans.is_empty() {
        warn!("{}", ExtractError::UnrecognizedFormat);
    }
    plans
}

/// Reads and parses each file into its plan list, one entry per file in
/// input order. A file no engine recognizes contributes an empty list.
pub async fn load_plan_batch(paths: &[PathBuf]) -> Result<Vec<Vec<PlanNode>>> {
    let contents = read_batch(paths).await?;
    Ok(contents.iter().map(|content| extract_plans(content)).collect())
}

/// Reads each file and extracts its duration samples, flattened across the
/// batch with `file_index` set to the file's position in `paths`.
pub async fn load_duration_batch(paths: &[PathBuf]) -> Result<Vec<DurationSample>> {
    let contents = read_batch(paths).await?;
    Ok(contents
        .iter()
        .enumerate()
        .flat_map(|(file_index, content)| extract_durations(content, file_index))
        .collect())
}

/// Reads each sysbench log into its time series and summary record, one
/// report per file in input order.
pub async fn load_sysbench_batch(paths: &[PathBuf]) -> Result<Vec<SysbenchReport>> {
    let contents = read_batch(paths).await?;
    Ok(contents
        .iter()
        .map(|content| SysbenchReport {
            series: extract_metrics(content),
            summary: extract_summary(content),
        })
        .collect())
}

/// Reads every file concurrently, preserving input order in the result.
async fn read_batch(paths: &[PathBuf]) -> Result<Vec<String>> {
    let mut reads = JoinSet::new();
    for (index, path) in paths.iter().cloned().enumerate() {
        reads.spawn(async move {
            let content = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("reading {}", path.display()))?;
            Ok::<_, anyhow::Error>((index, content))
        });
    }

    let mut contents = vec![String::new(); paths.len()];
    while let Some(joined) = reads.join_next().await {
        let (index, content) = joined??;
        contents[index] = content;
    }

    debug!(files = contents.len(), "batch read complete");
    Ok(contents)
}
