//! Benchmark suite for planlens's extraction pipeline.
//!
//! Benchmarks cover:
//! - PostgreSQL plan fragment extraction
//! - MariaDB duplicate-key rewrite + join reconstruction
//! - Duration scanning over a long transcript
//! - Cost aggregation over a normalized tree
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use planlens::{cost_by_node_type, extract_durations, extract_mariadb, extract_postgres};

const POSTGRES_PLAN: &str = r#"
 [                                         +
   {                                       +
     "Plan": {                             +
       "Node Type": "Sort",                +
       "Startup Cost": 100.00,             +
       "Total Cost": 100.25,               +
       "Plan Rows": 100,                   +
       "Plans": [                          +
         {                                 +
           "Node Type": "Seq Scan",        +
           "Relation Name": "lineitem",    +
           "Startup Cost": 0.00,           +
           "Total Cost": 35.50,            +
           "Plan Rows": 100                +
         }                                 +
       ]                                   +
     }                                     +
   }                                       +
 ]
(1 row)
"#;

const MARIADB_PLAN: &str = r#"EXPLAIN
{
  "query_block": {
    "select_id": 1,
    "r_total_time_ms": 5387.2,
    "table": { "table_name": "customer", "access_type": "ALL", "r_rows": 150000 },
    "table": { "table_name": "orders", "access_type": "ref", "r_rows": 10 },
    "table": { "table_name": "lineitem", "access_type": "ref", "r_rows": 4 }
  }
}
Query_ID
"#;

fn transcript(queries: usize) -> String {
    let mut content = String::new();
    for number in 1..=queries {
        content.push_str(&format!("Query {number} **\n"));
        content.push_str(POSTGRES_PLAN);
        content.push_str(&format!("\nTime: {}.500 ms\n\n", number * 100));
    }
    content
}

fn bench_postgres_extraction(c: &mut Criterion) {
    let content = transcript(21);
    c.bench_function("extract_postgres_21_queries", |b| {
        b.iter(|| extract_postgres(black_box(&content)))
    });
}

fn bench_mariadb_extraction(c: &mut Criterion) {
    c.bench_function("extract_mariadb_three_table_join", |b| {
        b.iter(|| extract_mariadb(black_box(MARIADB_PLAN)))
    });
}

fn bench_duration_scan(c: &mut Criterion) {
    let content = transcript(21);
    c.bench_function("extract_durations_21_queries", |b| {
        b.iter(|| extract_durations(black_box(&content), 0))
    });
}

fn bench_cost_aggregation(c: &mut Criterion) {
    let plans = extract_postgres(&transcript(1));
    c.bench_function("cost_by_node_type", |b| {
        b.iter(|| cost_by_node_type(black_box(&plans[0])))
    });
}

criterion_group!(
    benches,
    bench_postgres_extraction,
    bench_mariadb_extraction,
    bench_duration_scan,
    bench_cost_aggregation
);
criterion_main!(benches);
