//! Engine-agnostic analysis of query-planner diagnostics and benchmark logs.
//!
//! planlens ingests raw transcripts from three relational engines
//! (PostgreSQL, MySQL, MariaDB) and from a sysbench run, and turns them into
//! a uniform model for an external renderer: one canonical plan tree per
//! query, ordered per-query duration samples, throughput time series, and
//! per-node-type cost/row totals.
//!
//! The parsing core never fails hard: unrecognized input becomes an empty
//! result, malformed fragments are dropped, and nodes without recognized
//! cost fields count as zero. Only the file-reading layer in [`batch`]
//! returns errors.

pub mod batch;
pub mod duration;
pub mod error;
pub mod mapping;
pub mod plan;
pub mod sysbench;

// Re-export key types for convenience
pub use batch::{
    extract_plans, load_duration_batch, load_plan_batch, load_sysbench_batch, SysbenchReport,
};
pub use duration::{extract_durations, DurationSample};
pub use error::ExtractError;
pub use plan::{
    cost_by_node_type, extract_mariadb, extract_mysql, extract_postgres, rows_by_node_type,
    PlanNode,
};
pub use sysbench::{extract_metrics, extract_summary, BenchmarkSummary, MetricSample};
