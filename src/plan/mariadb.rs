//! MariaDB `ANALYZE FORMAT=JSON` extraction.
//!
//! MariaDB reports measured wall time per node (`r_total_time_ms`) rather
//! than optimizer cost, and its join encoding is the loosest of the three
//! engines: joined tables appear as *repeated* `"table"` keys inside one
//! object — invalid JSON — and any sibling may be a sorted-file wrapper, an
//! expression-cache wrapper, or a whole subquery block. Duplicate sibling
//! keys are rewritten to indexed variants before parsing, then the typed
//! value is folded into the canonical tree.

use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ExtractError;
use crate::plan::mysql::{access_type_label, parse_leading_json, PLAN_REGION};
use crate::plan::{PlanNode, SYNTHETIC_ROOT};

/// Extracts every MariaDB plan embedded in `content`, in source order.
/// Empty on no match; malformed regions are dropped with the rest kept.
pub fn extract_mariadb(content: &str) -> Vec<PlanNode> {
    let mut plans = Vec::new();

    for capture in PLAN_REGION.captures_iter(content) {
        match parse_region(&capture[1]) {
            Ok(plan) => plans.push(plan),
            Err(err) => warn!("dropping mariadb plan region: {err}"),
        }
    }

    debug!(count = plans.len(), "extracted mariadb plans");
    plans
}

fn parse_region(region: &str) -> Result<PlanNode, ExtractError> {
    let cleaned = region.replace("\\n", "").replace('\\', "");
    let deduped = dedup_sibling_keys(cleaned.trim());

    let value = parse_leading_json(&deduped)?;
    let block = value
        .get("query_block")
        .ok_or_else(|| ExtractError::malformed("missing query_block"))?;

    convert_block(SYNTHETIC_ROOT, block)
        .ok_or_else(|| ExtractError::malformed("query_block is not an object"))
}

/// Rewrites duplicate same-named sibling keys (`"table"` repeated within one
/// object) into indexed variants (`table#2`, `table#3`, ...) so the fragment
/// parses as JSON without losing siblings. String- and escape-aware; a
/// fragment without duplicate siblings passes through unchanged.
pub(crate) fn dedup_sibling_keys(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len() + 16);
    let mut scopes: Vec<HashMap<String, usize>> = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'{' => {
                scopes.push(HashMap::new());
                out.push(b'{');
                i += 1;
            }
            b'}' => {
                scopes.pop();
                out.push(b'}');
                i += 1;
            }
            b'"' => {
                let start = i;
                i += 1;
                while i < bytes.len() {
                    match bytes[i] {
                        b'\\' => i += 2,
                        b'"' => {
                            i += 1;
                            break;
                        }
                        _ => i += 1,
                    }
                }
                let literal = &raw[start..i.min(raw.len())];

                // a string is a key iff the next non-whitespace byte is ':'
                let mut after = i;
                while after < bytes.len() && bytes[after].is_ascii_whitespace() {
                    after += 1;
                }
                let is_key = after < bytes.len() && bytes[after] == b':';

                let mut occurrence = 1;
                if is_key {
                    if let Some(scope) = scopes.last_mut() {
                        let count = scope.entry(literal.to_string()).or_insert(0);
                        *count += 1;
                        occurrence = *count;
                    }
                }

                if occurrence > 1 && literal.len() >= 2 {
                    out.extend_from_slice(&literal.as_bytes()[..literal.len() - 1]);
                    out.extend_from_slice(format!("#{occurrence}\"").as_bytes());
                } else {
                    out.extend_from_slice(literal.as_bytes());
                }
            }
            byte => {
                out.push(byte);
                i += 1;
            }
        }
    }

    String::from_utf8(out).unwrap_or_else(|_| raw.to_string())
}

/// `key` with any `#N` index suffix added by [`dedup_sibling_keys`] removed.
fn base_key(key: &str) -> &str {
    key.split('#').next().unwrap_or(key)
}

/// A same-level sibling participating in join reconstruction.
enum Operand<'a> {
    Table(&'a Value),
    /// `read_sorted_file` / `filesort` wrapper around a table read.
    SortedFile(&'a Value),
    /// Element of a `subqueries` array, possibly cache-wrapped.
    Subquery(&'a Value),
    /// Bare `expression_cache` sibling.
    Cache(&'a Value),
}

fn convert_block(label: &str, value: &Value) -> Option<PlanNode> {
    let raw = value.as_object()?;
    let mut node = PlanNode::new(label);
    let mut operands = Vec::new();

    for (key, value) in raw {
        match base_key(key) {
            "table" => operands.push(Operand::Table(value)),
            "filesort" => operands.push(Operand::SortedFile(value)),
            "read_sorted_file" => operands.push(Operand::SortedFile(&value["filesort"])),
            "expression_cache" => operands.push(Operand::Cache(value)),
            "subqueries" => {
                if let Some(subqueries) = value.as_array() {
                    operands.extend(subqueries.iter().map(Operand::Subquery));
                }
            }
            _ => {
                node.fields.insert(base_key(key).to_string(), value.clone());
            }
        }
    }

    assemble_join(&mut node, operands);
    Some(node)
}

/// Folds the ordered sibling operands into a binary left-deep `Nested Loop`
/// chain, dispatching per operand kind. Subquery and cache siblings do not
/// join rows themselves: each is reattached as a child of the adjacent
/// non-subquery sibling that implicitly shares its cached expression.
fn assemble_join(node: &mut PlanNode, operands: Vec<Operand>) {
    let mut joins: Vec<PlanNode> = Vec::new();
    // subqueries seen before the first join operand
    let mut leading: Vec<PlanNode> = Vec::new();

    for operand in operands {
        match operand {
            Operand::Table(value) => {
                if let Some(table) = convert_table(value) {
                    joins.push(table);
                }
            }
            Operand::SortedFile(value) => {
                if let Some(sort) = convert_block("Filesort", value) {
                    joins.push(sort);
                }
            }
            Operand::Subquery(value) => attach(&mut joins, &mut leading, convert_subquery(value)),
            Operand::Cache(value) => attach(&mut joins, &mut leading, convert_cache(value)),
        }
    }

    if !leading.is_empty() {
        match joins.first_mut() {
            Some(first) => first.children.extend(leading),
            None => node.children.extend(leading),
        }
    }

    let mut joins = joins.into_iter();
    if let Some(mut tree) = joins.next() {
        for right in joins {
            let mut join = PlanNode::new("Nested Loop");
            join.children = vec![tree, right];
            tree = join;
        }
        node.children.push(tree);
    }
}

fn attach(joins: &mut [PlanNode], leading: &mut Vec<PlanNode>, subquery: Option<PlanNode>) {
    if let Some(subquery) = subquery {
        match joins.last_mut() {
            Some(adjacent) => adjacent.children.push(subquery),
            None => leading.push(subquery),
        }
    }
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
        match base_key(key) {
            "materialized" => {
                if let Some(child) = convert_block("Materialize", &value["query_block"]) {
                    node.children.push(child);
                }
            }
            _ => {
                node.fields.insert(base_key(key).to_string(), value.clone());
            }
        }
    }

    Some(node)
}

fn convert_subquery(value: &Value) -> Option<PlanNode> {
    if let Some(cache) = value.get("expression_cache") {
        convert_cache(cache)
    } else {
        convert_block("Subquery", value.get("query_block")?)
    }
}

fn convert_cache(value: &Value) -> Option<PlanNode> {
    let raw = value.as_object()?;
    let mut node = PlanNode::new("Expression Cache");

    for (key, value) in raw {
        match base_key(key) {
            "query_block" => {
                if let Some(child) = convert_block("Subquery", value) {
                    node.children.push(child);
                }
            }
            _ => {
                node.fields.insert(base_key(key).to_string(), value.clone());
            }
        }
    }

    Some(node)
}
