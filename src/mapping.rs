//! Operator terminology translation between engines.
//!
//! Pure lookup functions over the display vocabulary each engine's extractor
//! produces. An unrecognized node type passes through unchanged so the
//! renderer never sees an "unknown" placeholder for a type it was handed.

/// PostgreSQL operator name → closest MySQL display name.
pub fn postgres_to_mysql(node_type: &str) -> &str {
    match node_type {
        "Aggregate" => "Group",
        "Sort" => "Order",
        "Seq Scan" => "Full Table Scan",
        "Index Scan" | "Index Only Scan" | "Bitmap Heap Scan" | "Bitmap Index Scan" => {
            "Key Lookup"
        }
        "Merge Join" => "Hash Join",
        other => other,
    }
}

/// MySQL operator name → closest PostgreSQL display name.
pub fn mysql_to_postgres(node_type: &str) -> &str {
    match node_type {
        "Group" => "Aggregate",
        "Order" => "Sort",
        "Full Table Scan" => "Seq Scan",
        "Unique Key Lookup" | "Non-Unique Key Lookup" | "Key Lookup" => "Index Scan",
        other => other,
    }
}

/// Coarse legend grouping collapsing scan/join variants into a handful of
/// categories for stacked charts.
pub fn legend_group(node_type: &str) -> &str {
    match node_type {
        "Aggregate" | "Group" => "Group",
        "Sort" | "Order" | "Filesort" => "Sort",
        "Seq Scan" | "Full Table Scan" => "Full Scan",
        "Index Scan"
        | "Index Only Scan"
        | "Full Index Scan"
        | "Index Range Scan"
        | "Unique Key Lookup"
        | "Non-Unique Key Lookup"
        | "Bitmap Heap Scan"
        | "Bitmap Index Scan" => "Scan",
        "Nested Loop" | "Join" | "Hash Join" | "Merge Join" | "Block Nested Loop"
        | "Batched Key Access" => "Join",
        "Materialize" => "Materialize",
        "Hash" | "Gather" | "Gather Merge" => "Gather",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_is_identity_or_synonym() {
        // every key in the PostgreSQL domain maps back to itself or to a
        // defined synonym, never to an unknown placeholder
        let domain = [
            "Limit",
            "Aggregate",
            "Gather",
            "Gather Merge",
            "Sort",
            "Seq Scan",
            "Index Scan",
            "Index Only Scan",
            "Nested Loop",
            "Hash Join",
            "Merge Join",
            "Hash",
        ];
        for original in domain {
            let back = mysql_to_postgres(postgres_to_mysql(original));
            let synonym = matches!(
                (original, back),
                ("Index Only Scan", "Index Scan") | ("Merge Join", "Hash Join")
            );
            assert!(
                back == original || synonym,
                "{original} round-tripped to {back}"
            );
        }
    }

    #[test]
    fn test_unrecognized_keys_pass_through() {
        assert_eq!(postgres_to_mysql("WindowAgg"), "WindowAgg");
        assert_eq!(mysql_to_postgres("Index Merge"), "Index Merge");
        assert_eq!(legend_group("Limit"), "Limit");
    }

    #[test]
    fn test_legend_collapses_variants() {
        assert_eq!(legend_group("Seq Scan"), "Full Scan");
        assert_eq!(legend_group("Bitmap Heap Scan"), "Scan");
        assert_eq!(legend_group("Block Nested Loop"), "Join");
        assert_eq!(legend_group("Gather Merge"), "Gather");
        assert_eq!(legend_group("Order"), legend_group("Sort"));
    }
}
