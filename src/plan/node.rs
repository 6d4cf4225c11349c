use serde::Serialize;
use serde_json::{Map, Value};

/// Node type assigned to the synthetic root injected over MySQL/MariaDB
/// plans. Excluded from cost and row accumulation.
pub const SYNTHETIC_ROOT: &str = "Limit";

/// One step of a canonical, engine-agnostic query plan.
///
/// `children` is always a vector, never a bare object, so consumers can walk
/// the tree without shape checks. `fields` carries the engine-specific
/// attributes exactly as the planner emitted them (`Startup Cost`,
/// `cost_info`, `r_total_time_ms`, `Relation Name`, ...); cost and row
/// derivation read from it without normalizing units across engines.
#[derive(Debug, Clone, Serialize)]
pub struct PlanNode {
    #[serde(rename = "Node Type")]
    pub node_type: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<PlanNode>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl PlanNode {
    pub fn new(node_type: impl Into<String>) -> Self {
        PlanNode {
            node_type: node_type.into(),
            children: Vec::new(),
            fields: Map::new(),
        }
    }

    /// Per-node cost, derived by strict engine-detection order:
    ///
    /// 1. PostgreSQL: `Total Cost - Startup Cost` (cumulative costs are
    ///    differenced so child cost is not double-counted);
    /// 2. MySQL: sum of every numeric `cost_info` entry whose key names a
    ///    cost component;
    /// 3. MariaDB ANALYZE: `r_total_time_ms` taken directly. This is
    ///    measured wall time, not an optimizer estimate; the value is kept
    ///    as-is and must not be aggregated together with cost-model units.
    ///
    /// A node exposing none of the recognized fields costs 0.
    pub fn cost(&self) -> f64 {
        if let (Some(total), Some(startup)) =
            (self.numeric_field("Total Cost"), self.numeric_field("Startup Cost"))
        {
            return total - startup;
        }

        if let Some(Value::Object(cost_info)) = self.fields.get("cost_info") {
            return cost_info
                .iter()
                .filter(|(key, _)| key.contains("cost"))
                .filter_map(|(_, value)| as_f64(value))
                .sum();
        }

        self.numeric_field("r_total_time_ms").unwrap_or(0.0)
    }

    /// Per-node row count, with the same fallback discipline as [`cost`]:
    /// plan-row estimate, then any row-count-bearing field, then the
    /// measured row count, then 0.
    ///
    /// [`cost`]: PlanNode::cost
    pub fn rows(&self) -> f64 {
        self.numeric_field("Plan Rows")
            .or_else(|| self.numeric_field("rows_examined_per_scan"))
            .or_else(|| self.numeric_field("rows"))
            .or_else(|| self.numeric_field("r_rows"))
            .unwrap_or(0.0)
    }

    /// True for the synthetic root injected by the MySQL/MariaDB extractors.
    pub fn is_synthetic_root(&self) -> bool {
        self.node_type == SYNTHETIC_ROOT
    }

    fn numeric_field(&self, key: &str) -> Option<f64> {
        self.fields.get(key).and_then(as_f64)
    }
}

/// Numeric coercion for passthrough fields. MySQL quotes the numbers inside
/// `cost_info`, so strings that parse as floats count as numeric.
fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node_with_fields(node_type: &str, fields: Value) -> PlanNode {
        let mut node = PlanNode::new(node_type);
        if let Value::Object(map) = fields {
            node.fields = map;
        }
        node
    }

    #[test]
    fn test_postgres_cost_is_differenced() {
        let node = node_with_fields(
            "Seq Scan",
            json!({ "Startup Cost": 0.5, "Total Cost": 120.75 }),
        );
        assert!((node.cost() - 120.25).abs() < 1e-9);
    }

    #[test]
    fn test_mysql_cost_sums_cost_components() {
        let node = node_with_fields(
            "Full Table Scan",
            json!({
                "cost_info": {
                    "read_cost": "100.5",
                    "eval_cost": "20.25",
                    "prefix_cost": "120.75",
                    "data_read_per_join": "1M"
                }
            }),
        );
        // data_read_per_join is not a cost component and does not parse anyway
        assert!((node.cost() - 241.5).abs() < 1e-9);
    }

    #[test]
    fn test_mariadb_cost_is_wall_time() {
        let node = node_with_fields("Full Table Scan", json!({ "r_total_time_ms": 42.7 }));
        assert!((node.cost() - 42.7).abs() < 1e-9);
    }

    #[test]
    fn test_missing_cost_fields_default_to_zero() {
        let node = PlanNode::new("Hash");
        assert_eq!(node.cost(), 0.0);
        assert_eq!(node.rows(), 0.0);
    }

    #[test]
    fn test_row_fallback_chain() {
        let node = node_with_fields("Seq Scan", json!({ "Plan Rows": 1500 }));
        assert_eq!(node.rows(), 1500.0);

        let node = node_with_fields("Full Table Scan", json!({ "rows_examined_per_scan": 25 }));
        assert_eq!(node.rows(), 25.0);

        let node = node_with_fields("Full Table Scan", json!({ "rows": "600", "r_rows": 580.0 }));
        assert_eq!(node.rows(), 600.0);
    }

    #[test]
    fn test_serializes_with_renderer_facing_keys() {
        let mut root = node_with_fields("Sort", json!({ "Startup Cost": 1.0 }));
        root.children.push(PlanNode::new("Seq Scan"));

        let value = serde_json::to_value(&root).unwrap();
        assert_eq!(value["Node Type"], "Sort");
        assert!(value["children"].is_array());
        assert_eq!(value["Startup Cost"], 1.0);
        // leaf omits the empty child list entirely
        assert!(value["children"][0].get("children").is_none());
    }
}
