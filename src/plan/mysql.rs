//! MySQL `EXPLAIN FORMAT=JSON` extraction.
//!
//! The raw plan sits between an `EXPLAIN` marker and the trailing `Query_ID`
//! profile header, with newlines and quotes escaped by the capture tool. The
//! parsed `query_block` gets a synthetic `Limit` root, wrapper operations
//! become canonical operator nodes, and the flat `nested_loop` sibling array
//! is rebuilt into a strictly binary left-deep join tree.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ExtractError;
use crate::plan::{PlanNode, SYNTHETIC_ROOT};

pub(crate) static PLAN_REGION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)EXPLAIN(.*?)Query_ID").expect("region pattern"));

/// Extracts every MySQL plan embedded in `content`, in source order.
/// Empty on no match; malformed regions are dropped with the rest kept.
pub fn extract_mysql(content: &str) -> Vec<PlanNode> {
    let mut plans = Vec::new();

    for capture in PLAN_REGION.captures_iter(content) {
        match parse_region(&capture[1]) {
            Ok(plan) => plans.push(plan),
            Err(err) => warn!("dropping mysql plan region: {err}"),
        }
    }

    debug!(count = plans.len(), "extracted mysql plans");
    plans
}

fn parse_region(region: &str) -> Result<PlanNode, ExtractError> {
    // The dump escapes embedded newlines and quotes; strip the literal
    // `\n` sequences first, then the remaining backslashes.
    let cleaned = region.replace("\\n", "").replace('\\', "");

    let value = parse_leading_json(&cleaned)?;
    let block = value
        .get("query_block")
        .ok_or_else(|| ExtractError::malformed("missing query_block"))?;

    convert_block(SYNTHETIC_ROOT, block).ok_or_else(|| ExtractError::malformed("query_block is not an object"))
}

/// Parses the leading JSON value of a plan region, ignoring whatever result
/// rows trail it before the `Query_ID` marker.
pub(crate) fn parse_leading_json(text: &str) -> Result<Value, ExtractError> {
    let mut values = serde_json::Deserializer::from_str(text).into_iter::<Value>();
    match values.next() {
        Some(Ok(value)) => Ok(value),
        Some(Err(err)) => Err(ExtractError::malformed(err)),
        None => Err(ExtractError::malformed("empty plan region")),
    }
}

/// Maps one `query_block` (or nested operation block) into a [`PlanNode`]
/// labeled `label`. Wrapper keys become operator nodes linked by a child
/// edge; every other key passes through as an engine field.
fn convert_block(label: &str, value: &Value) -> Option<PlanNode> {
    let raw = value.as_object()?;
    let mut node = PlanNode::new(label);

    for (key, value) in raw {
        match key.as_str() {
            "grouping_operation" => push_child(&mut node, convert_block("Group", value)),
            "ordering_operation" => push_child(&mut node, convert_block("Order", value)),
            "duplicates_removal" => push_child(&mut node, convert_block("Distinct", value)),
            "table" => push_child(&mut node, convert_table(value)),
            "nested_loop" => {
                if let Some(join) = value.as_array().and_then(build_join) {
                    node.children.push(join);
                }
            }
            _ => {
                node.fields.insert(key.clone(), value.clone());
            }
        }
    }

    Some(node)
}

fn convert_table(value: &Value) -> Option<PlanNode> {
    let raw = value.as_object()?;
    let label = raw
        .get("access_type")
        .and_then(Value::as_str)
        .map(access_type_label)
        .unwrap_or("Unknown");
    let mut node = PlanNode::new(label);

    for (key, value) in raw {
        match key.as_str() {
            "materialized_from_subquery" => {
                push_child(&mut node, convert_block("Materialize", &value["query_block"]));
            }
            "attached_subqueries" => {
                let first = value.as_array().and_then(|subqueries| subqueries.first());
                if let Some(subquery) = first {
                    push_child(
                        &mut node,
                        convert_block("Attached Subqueries", &subquery["query_block"]),
                    );
                }
            }
            _ => {
                node.fields.insert(key.clone(), value.clone());
            }
        }
    }

    Some(node)
}

fn push_child(node: &mut PlanNode, child: Option<PlanNode>) {
    if let Some(child) = child {
        node.children.push(child);
    }
}

/// Rebuilds the flat `nested_loop` sibling list into a strictly binary
/// left-deep tree, folding the previous subtree and the next table under a
/// new join node, last table first:
/// `[a, b, c]` becomes `join(join(a, b), c)`.
fn build_join(siblings: &Vec<Value>) -> Option<PlanNode> {
    match siblings.len() {
        0 => None,
        1 => join_operand(&siblings[0]),
        len => Some(join_subtree(siblings, len - 1)),
    }
}

fn join_subtree(siblings: &[Value], last: usize) -> PlanNode {
    let left = if last > 1 {
        join_subtree(siblings, last - 1)
    } else {
        join_operand(&siblings[0]).unwrap_or_else(|| PlanNode::new("Unknown"))
    };
    let right = join_operand(&siblings[last]).unwrap_or_else(|| PlanNode::new("Unknown"));

    let mut node = PlanNode::new(join_label(&siblings[last]));
    node.children = vec![left, right];
    node
}

fn join_operand(sibling: &Value) -> Option<PlanNode> {
    convert_table(sibling.get("table")?)
}

/// The join node's type comes from the right table's `using_join_buffer`
/// tag; a table joined without a buffer is a plain nested loop.
fn join_label(sibling: &Value) -> &'static str {
    let buffer = sibling
        .get("table")
        .and_then(|table| table.get("using_join_buffer"))
        .and_then(Value::as_str);

    match buffer {
        None => "Nested Loop",
        Some("Block Nested Loop") => "Block Nested Loop",
        Some("Batched Key Access") => "Batched Key Access",
        Some("hash join") => "Hash Join",
        Some(_) => "Unknown",
    }
}

/// Display-friendly node type for a scan's access method. Shared with the
/// MariaDB extractor, which uses the same access-method vocabulary.
pub(crate) fn access_type_label(access_type: &str) -> &'static str {
    match access_type {
        "system" => "Single Row\n(system constant)",
        "const" => "Single Row\n(constant)",
        "eq_ref" => "Unique Key Lookup",
        "ref" => "Non-Unique Key Lookup",
        "fulltext" => "Fulltext Index Search",
        "ref_or_null" => "Key Lookup +\nFetch NULL Values",
        "index_merge" => "Index Merge",
        "unique_subquery" => "Unique Key Lookup\ninto table of subquery",
        "index_subquery" => "Non-Unique Key Lookup\ninto table of subquery",
        "range" => "Index Range Scan",
        "index" => "Full Index Scan",
        "ALL" => "Full Table Scan",
        _ => "Unknown",
    }
}
