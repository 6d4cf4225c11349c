/// Engine plan extraction and normalization.
///
/// Each engine module isolates the plan fragments embedded in a raw
/// transcript and rewrites its native encoding into one canonical tree:
///
/// ```text
/// raw transcript
///       ↓
/// per-engine extractor   (postgres.rs / mysql.rs / mariadb.rs)
///       ↓
/// canonical PlanNode     (node.rs)
///       ↓
/// per-node-type totals   (aggregate.rs)
/// ```
///
/// Extractors return plans in source order and degrade instead of failing:
/// no match yields an empty list, a malformed fragment is dropped.
pub mod aggregate;
pub mod mariadb;
pub mod mysql;
pub mod node;
pub mod postgres;

pub use aggregate::{cost_by_node_type, rows_by_node_type};
pub use mariadb::extract_mariadb;
pub use mysql::extract_mysql;
pub use node::{PlanNode, SYNTHETIC_ROOT};
pub use postgres::extract_postgres;
