//! Per-node-type cost and row totals for stacked breakdowns.
//!
//! One full traversal per tree, visiting every node exactly once. Costs are
//! whatever unit the source engine reports (optimizer cost-model units for
//! PostgreSQL/MySQL, measured milliseconds for MariaDB ANALYZE); totals from
//! different engines are therefore not comparable with each other and are
//! never combined here.

use std::collections::BTreeMap;

use crate::plan::PlanNode;

/// Folds `node type → total cost` over the tree. The synthetic root
/// contributes nothing; every other node contributes [`PlanNode::cost`],
/// so the map's grand total equals the sum of per-node costs.
pub fn cost_by_node_type(root: &PlanNode) -> BTreeMap<String, f64> {
    let mut totals = BTreeMap::new();
    fold(root, &mut totals, &PlanNode::cost);
    totals
}

/// Folds `node type → total row count` over the tree, with the same
/// traversal contract as [`cost_by_node_type`].
pub fn rows_by_node_type(root: &PlanNode) -> BTreeMap<String, f64> {
    let mut totals = BTreeMap::new();
    fold(root, &mut totals, &PlanNode::rows);
    totals
}

fn fold(node: &PlanNode, totals: &mut BTreeMap<String, f64>, measure: &dyn Fn(&PlanNode) -> f64) {
    if !node.is_synthetic_root() {
        *totals.entry(node.node_type.clone()).or_insert(0.0) += measure(node);
    }

    for child in &node.children {
        fold(child, totals, measure);
    }
}
