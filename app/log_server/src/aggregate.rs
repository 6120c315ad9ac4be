use std::collections::BTreeMap;
use std::collections::HashMap;

use chrono::DateTime;
use chrono::NaiveTime;
use chrono::TimeDelta;
use chrono::Timelike;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use crate::record::LogRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Day,
    Hour,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeverityBucket {
    pub bucket_start: DateTime<Utc>,
    pub count: u64,
}

/// Counts records per canonical severity and per UTC time bucket.
///
/// Series are sparse, only buckets with at least one record appear, sorted ascending
/// by bucket start. Renderers that need continuous axes zero-fill on their side.
/// Pure function, the same records always produce the same result.
pub fn aggregate(records: &[LogRecord], granularity: Granularity) -> HashMap<String, Vec<SeverityBucket>> {
    let mut groups: HashMap<&str, BTreeMap<DateTime<Utc>, u64>> = HashMap::new();
    for record in records {
        let bucket_start = truncate(record.timestamp, granularity);
        let buckets = groups.entry(record.severity_canonical.as_str()).or_default();
        *buckets.entry(bucket_start).or_insert(0) += 1;
    }

    groups
        .into_iter()
        .map(|(severity, buckets)| {
            let series = buckets
                .into_iter()
                .map(|(bucket_start, count)| SeverityBucket { bucket_start, count })
                .collect();
            (severity.to_string(), series)
        })
        .collect()
}

// bucket boundaries align to utc calendar days / hours
fn truncate(timestamp: DateTime<Utc>, granularity: Granularity) -> DateTime<Utc> {
    let midnight = timestamp.date_naive().and_time(NaiveTime::MIN).and_utc();
    match granularity {
        Granularity::Day => midnight,
        Granularity::Hour => midnight + TimeDelta::hours(i64::from(timestamp.hour())),
    }
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;
    use chrono::TimeZone;
    use chrono::Utc;

    use super::Granularity;
    use super::aggregate;
    use crate::record::LogRecord;
    use crate::record::PayloadSchema;
    use crate::severity;

    fn record(severity_raw: &str, timestamp: DateTime<Utc>) -> LogRecord {
        LogRecord {
            source_name: "reddit_scraper".to_string(),
            process_type: "batch".to_string(),
            status_code: 200,
            message: "ok".to_string(),
            severity_raw: severity_raw.to_string(),
            severity_canonical: severity::canonicalize(severity_raw).to_string(),
            timestamp,
            received_at: timestamp,
            schema: PayloadSchema::Current,
            logger_name: "reddit_scraper.request".to_string(),
            created: timestamp,
            lineno: 1,
            func_name: "run".to_string(),
            msecs: 0.0,
            relative_created: timestamp,
            thread: 1,
            thread_name: "MainThread".to_string(),
            process_name: "MainProcess".to_string(),
            process: "1".to_string(),
        }
    }

    fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 3, day, hour, minute, 30).unwrap()
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert!(aggregate(&[], Granularity::Day).is_empty());
        assert!(aggregate(&[], Granularity::Hour).is_empty());
    }

    #[test]
    fn two_severities_two_days() {
        let records = vec![
            record("INFO", at(1, 9, 15)),
            record("INFO", at(1, 23, 59)),
            record("ERROR", at(1, 9, 16)),
            record("INFO", at(2, 0, 0)),
            record("ERROR", at(2, 12, 0)),
            record("ERROR", at(2, 12, 1)),
        ];
        let result = aggregate(&records, Granularity::Day);
        assert_eq!(result.len(), 2);

        let info = &result["INFO"];
        assert_eq!(info.len(), 2);
        assert_eq!(info[0].bucket_start, Utc.with_ymd_and_hms(2021, 3, 1, 0, 0, 0).unwrap());
        assert_eq!(info[0].count, 2);
        assert_eq!(info[1].count, 1);

        let error = &result["ERROR"];
        assert_eq!(error[0].count, 1);
        assert_eq!(error[1].count, 2);

        let total: u64 = result.values().flatten().map(|bucket| bucket.count).sum();
        assert_eq!(total, records.len() as u64);
    }

    #[test]
    fn hourly_buckets() {
        let records = vec![
            record("INFO", at(1, 9, 0)),
            record("INFO", at(1, 9, 59)),
            record("INFO", at(1, 10, 0)),
        ];
        let result = aggregate(&records, Granularity::Hour);
        let info = &result["INFO"];
        assert_eq!(info.len(), 2);
        assert_eq!(info[0].bucket_start, Utc.with_ymd_and_hms(2021, 3, 1, 9, 0, 0).unwrap());
        assert_eq!(info[0].count, 2);
        assert_eq!(info[1].bucket_start, Utc.with_ymd_and_hms(2021, 3, 1, 10, 0, 0).unwrap());
        assert_eq!(info[1].count, 1);
    }

    #[test]
    fn synonym_labels_merge_into_one_series() {
        let day1 = at(1, 8, 0);
        let day2 = at(2, 8, 0);
        let records = vec![record("WARN", day1), record("WARNING", day1), record("ERROR", day2)];
        let result = aggregate(&records, Granularity::Day);
        assert_eq!(result.len(), 2);
        assert_eq!(result["WARNING"].len(), 1);
        assert_eq!(result["WARNING"][0].count, 2);
        assert_eq!(result["ERROR"][0].count, 1);
    }

    #[test]
    fn unknown_severity_gets_its_own_series() {
        let records = vec![record("AUDIT", at(1, 1, 0))];
        let result = aggregate(&records, Granularity::Day);
        assert_eq!(result["AUDIT"][0].count, 1);
    }

    #[test]
    fn deterministic() {
        let records = vec![
            record("INFO", at(1, 9, 15)),
            record("ERROR", at(2, 9, 15)),
            record("WARN", at(3, 9, 15)),
        ];
        assert_eq!(
            aggregate(&records, Granularity::Hour),
            aggregate(&records, Granularity::Hour)
        );
    }
}
