//! Per-query duration extraction from benchmark transcripts.
//!
//! PostgreSQL transcripts report `Time: N ms` after each query banner;
//! MariaDB transcripts embed a `Query_ID  Duration  Query` profile table with
//! durations already in seconds. Samples are emitted in source order, never
//! re-sorted by query number.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

/// Duration of one benchmark query in one uploaded file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DurationSample {
    /// 1..21 canonical numbering of the analytic benchmark queries.
    pub query_number: u32,
    /// Seconds. Millisecond sources are divided by 1000 on extraction.
    pub duration: f64,
    /// Which uploaded file the sample came from.
    pub file_index: usize,
}

/// The benchmark query whose absence triggers MariaDB renumbering.
///
/// One harness emits transcripts where this query is missing or malformed
/// and every later query banner is numbered one too high relative to the
/// canonical scheme. The shift below realigns them. This reproduces observed
/// upstream behavior; it smells like a data anomaly in that harness, not an
/// intentional numbering scheme.
const PROBE_QUERY: u32 = 15;

static POSTGRES_DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)Query (\d+) \*\*.*?Time: (\d+\.\d+) ms").expect("postgres duration pattern")
});

static MARIADB_DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)Query (\d+) \*\*.*?Query_ID\s*Duration\s*Query\s*\n(\d+)\s*(\d+\.\d+)")
        .expect("mariadb duration pattern")
});

/// Extracts durations with pattern fallback: PostgreSQL first, then MariaDB.
/// Zero matches for every pattern yields an empty list, never an error.
pub fn extract_durations(content: &str, file_index: usize) -> Vec<DurationSample> {
    let samples = extract_postgres_durations(content, file_index);
    if !samples.is_empty() {
        return samples;
    }

    debug!("no postgres duration matches, falling back to mariadb");
    extract_mariadb_durations(content, file_index)
}

/// One sample per `Query N ** ... Time: X ms` occurrence, in source order,
/// with the millisecond value converted to seconds.
pub fn extract_postgres_durations(content: &str, file_index: usize) -> Vec<DurationSample> {
    POSTGRES_DURATION
        .captures_iter(content)
        .filter_map(|capture| {
            let query_number: u32 = capture[1].parse().ok()?;
            let millis: f64 = capture[2].parse().ok()?;
            Some(DurationSample {
                query_number,
                duration: millis / 1000.0,
                file_index,
            })
        })
        .collect()
}

/// One sample per profile-table row following a `Query N **` banner.
/// Durations are already in seconds. Applies the probe-query renumbering:
/// when the probe query is absent from the transcript, every query numbered
/// above it is shifted down by one; when the probe is present, numbering is
/// taken as-is.
pub fn extract_mariadb_durations(content: &str, file_index: usize) -> Vec<DurationSample> {
    let raw: Vec<(u32, f64)> = MARIADB_DURATION
        .captures_iter(content)
        .filter_map(|capture| {
            let query_number: u32 = capture[1].parse().ok()?;
            let duration: f64 = capture[3].parse().ok()?;
            Some((query_number, duration))
        })
        .collect();

    let probe_present = raw.iter().any(|&(number, _)| number == PROBE_QUERY);

    raw.into_iter()
        .map(|(number, duration)| DurationSample {
            query_number: if !probe_present && number > PROBE_QUERY {
                number - 1
            } else {
                number
            },
            duration,
            file_index,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postgres_millis_to_seconds() {
        let content = "Query 3 **\nsome output\nTime: 125.400 ms\n";
        let samples = extract_postgres_durations(content, 0);
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].query_number, 3);
        assert!((samples[0].duration - 0.1254).abs() < 1e-9);
        assert_eq!(samples[0].file_index, 0);
    }

    #[test]
    fn test_postgres_samples_in_source_order() {
        let content = "\
Query 2 **
Time: 10.000 ms
Query 1 **
Time: 20.000 ms
Query 3 **
Time: 30.000 ms
";
        let samples = extract_postgres_durations(content, 1);
        let numbers: Vec<u32> = samples.iter().map(|s| s.query_number).collect();
        assert_eq!(numbers, vec![2, 1, 3]);
    }

    fn mariadb_entry(number: u32, duration: f64) -> String {
        format!("Query {number} **\nresult rows\nQuery_ID  Duration  Query\n{number}  {duration:.6}  select 1\n")
    }

    #[test]
    fn test_mariadb_without_probe_shifts_later_queries() {
        let mut content = String::new();
        for number in [14, 16, 17] {
            content.push_str(&mariadb_entry(number, 1.5));
        }
        let samples = extract_mariadb_durations(&content, 0);
        let numbers: Vec<u32> = samples.iter().map(|s| s.query_number).collect();
        assert_eq!(numbers, vec![14, 15, 16]);
    }

    #[test]
    fn test_mariadb_with_probe_keeps_numbering() {
        let mut content = String::new();
        for number in [14, 15, 16] {
            content.push_str(&mariadb_entry(number, 0.25));
        }
        let samples = extract_mariadb_durations(&content, 0);
        let numbers: Vec<u32> = samples.iter().map(|s| s.query_number).collect();
        assert_eq!(numbers, vec![14, 15, 16]);
    }

    #[test]
    fn test_mariadb_durations_already_in_seconds() {
        let samples = extract_mariadb_durations(&mariadb_entry(4, 2.125), 2);
        assert_eq!(samples.len(), 1);
        assert!((samples[0].duration - 2.125).abs() < 1e-9);
        assert_eq!(samples[0].file_index, 2);
    }

    #[test]
    fn test_fallback_chain() {
        let mariadb = mariadb_entry(1, 3.0);
        let samples = extract_durations(&mariadb, 0);
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].query_number, 1);

        assert!(extract_durations("no matches at all", 0).is_empty());
    }
}
