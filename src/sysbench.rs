//! Throughput-benchmark (sysbench) transcript extraction.
//!
//! Two independent scans over the same log: the periodic progress lines
//! become an ordered time series, and the end-of-run statistics block
//! becomes one scalar summary record per file. Non-matching lines are
//! skipped; a file with no matches contributes an empty series / no summary.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// One periodic progress report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSample {
    /// Seconds since the run started.
    pub time: f64,
    pub tps: f64,
    pub qps: f64,
    /// 99th-percentile latency in milliseconds.
    pub latency_p99: f64,
    pub errors_per_sec: f64,
}

/// End-of-run statistics, one record per file.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BenchmarkSummary {
    pub transactions: u64,
    /// Average transactions per second over the whole run.
    pub tps: f64,
    pub queries: u64,
    pub qps: f64,
    pub reads: u64,
    pub writes: u64,
    pub other: u64,
    pub latency_min_ms: f64,
    pub latency_avg_ms: f64,
    pub latency_max_ms: f64,
    /// The percentile sysbench was configured to report (95th by default).
    pub latency_percentile_ms: f64,
    pub latency_sum_ms: f64,
}

static PROGRESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\[\s*(\d+)s\s*\]\s*thds:\s*(\d+)\s*tps:\s*([\d.]+)\s*qps:\s*([\d.]+).*lat\s*\(ms,99%\):\s*([\d.]+)\s*err/s:\s*([\d.]+)",
    )
    .expect("progress pattern")
});

/// The progress scan stops here: histogram bucket lines would otherwise
/// produce bogus samples.
const HISTOGRAM_MARKER: &str = "Latency histogram (values are in milliseconds)";

static TRANSACTIONS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"transactions:\s+(\d+)\s+\(([\d.]+) per sec\.\)").expect("transactions pattern")
});

static QUERIES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"queries:\s+(\d+)\s+\(([\d.]+) per sec\.\)").expect("queries pattern")
});

static QUERY_KINDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(read|write|other):\s+(\d+)").expect("query kind pattern")
});

static LATENCY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(min|avg|max|sum|\d+th percentile):\s+([\d.]+)").expect("latency pattern")
});

/// Scans the periodic progress lines into an ordered time series.
pub fn extract_metrics(content: &str) -> Vec<MetricSample> {
    let mut samples = Vec::new();

    for line in content.lines() {
        if line.contains(HISTOGRAM_MARKER) {
            break;
        }

        if let Some(capture) = PROGRESS.captures(line) {
            let parsed = (
                capture[1].parse::<f64>(),
                capture[3].parse::<f64>(),
                capture[4].parse::<f64>(),
                capture[5].parse::<f64>(),
                capture[6].parse::<f64>(),
            );
            if let (Ok(time), Ok(tps), Ok(qps), Ok(latency_p99), Ok(errors_per_sec)) = parsed {
                samples.push(MetricSample {
                    time,
                    tps,
                    qps,
                    latency_p99,
                    errors_per_sec,
                });
            }
        }
    }

    samples
}

/// Scans the end-of-run statistics block. `None` when the transactions line
/// is missing, which is the marker for "this is not a sysbench summary".
pub fn extract_summary(content: &str) -> Option<BenchmarkSummary> {
    let transactions = TRANSACTIONS.captures(content)?;

    let mut summary = BenchmarkSummary {
        transactions: transactions[1].parse().ok()?,
        tps: transactions[2].parse().ok()?,
        ..BenchmarkSummary::default()
    };

    if let Some(queries) = QUERIES.captures(content) {
        summary.queries = queries[1].parse().unwrap_or(0);
        summary.qps = queries[2].parse().unwrap_or(0.0);
    }

    for capture in QUERY_KINDS.captures_iter(content) {
        let count = capture[2].parse().unwrap_or(0);
        match &capture[1] {
            "read" => summary.reads = count,
            "write" => summary.writes = count,
            _ => summary.other = count,
        }
    }

    for capture in LATENCY.captures_iter(content) {
        let value = capture[2].parse().unwrap_or(0.0);
        match &capture[1] {
            "min" => summary.latency_min_ms = value,
            "avg" => summary.latency_avg_ms = value,
            "max" => summary.latency_max_ms = value,
            "sum" => summary.latency_sum_ms = value,
            _ => summary.latency_percentile_ms = value,
        }
    }

    Some(summary)
}
