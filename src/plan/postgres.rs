//! PostgreSQL `EXPLAIN (FORMAT JSON)` extraction.
//!
//! psql transcripts wrap each plan in a bracket-delimited JSON array followed
//! by a `(N rows)` footer, with `+` markers at every wrapped line. Each
//! fragment is isolated, cleaned and parsed, then the typed value is mapped
//! into the canonical tree instead of rewriting the raw text.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ExtractError;
use crate::plan::PlanNode;

/// Captures the JSON between `[` and the `]` that precedes the psql row
/// footer. `(?s)` lets the body span lines.
static PLAN_FRAGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\[(.*?)\]\s*\(").expect("fragment pattern"));

/// Extracts every PostgreSQL plan embedded in `content`, in source order.
///
/// Returns an empty vector when no fragment matches so the caller can fall
/// back to the next engine. A fragment that fails to parse is dropped and
/// extraction continues with the remaining matches.
pub fn extract_postgres(content: &str) -> Vec<PlanNode> {
    let mut plans = Vec::new();

    for capture in PLAN_FRAGMENT.captures_iter(content) {
        let fragment = capture[1].replace('+', "");
        match parse_fragment(&fragment) {
            Ok(plan) => plans.push(plan),
            Err(err) => warn!("dropping postgres fragment: {err}"),
        }
    }

    debug!(count = plans.len(), "extracted postgres plans");
    plans
}

fn parse_fragment(fragment: &str) -> Result<PlanNode, ExtractError> {
    let value: Value = serde_json::from_str(fragment).map_err(ExtractError::malformed)?;

    // EXPLAIN emits `[{"Plan": {...}}]`; the fragment capture strips the
    // outer brackets, leaving the object with its "Plan" root.
    let root = value.get("Plan").unwrap_or(&value);
    convert(root).ok_or(ExtractError::MalformedFragment {
        reason: "plan root is not an object".to_string(),
    })
}

/// Maps one raw plan object into a [`PlanNode`], renaming the nested `Plans`
/// list to the canonical child list at every depth and passing every other
/// attribute through untouched.
fn convert(value: &Value) -> Option<PlanNode> {
    let raw = value.as_object()?;
    let node_type = raw
        .get("Node Type")
        .and_then(Value::as_str)
        .unwrap_or("Unknown");
    let mut node = PlanNode::new(node_type);

    for (key, value) in raw {
        match key.as_str() {
            "Node Type" => {}
            "Plans" => {
                if let Some(children) = value.as_array() {
                    node.children = children.iter().filter_map(convert).collect();
                }
            }
            _ => {
                node.fields.insert(key.clone(), value.clone());
            }
        }
    }

    Some(node)
}
