use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Ingestion schema version, resolved from the arity of the raw `args` tuple at normalization time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayloadSchema {
    /// `(source_name, process_type, status_code)`
    Current,
    /// `(source_name, process_type, timestamp, status_code)`, older clients embed the event time in args
    LegacyEmbeddedTimestamp,
}

impl PayloadSchema {
    pub fn as_str(self) -> &'static str {
        match self {
            PayloadSchema::Current => "current",
            PayloadSchema::LegacyEmbeddedTimestamp => "legacy_embedded_timestamp",
        }
    }

    pub fn parse(value: &str) -> Self {
        if value == "legacy_embedded_timestamp" {
            PayloadSchema::LegacyEmbeddedTimestamp
        } else {
            PayloadSchema::Current
        }
    }
}

/// One ingested log event, immutable once created.
///
/// `timestamp` is the event time and drives all aggregation, `received_at` is when this
/// server accepted the record. The remaining fields past `schema` mirror the python
/// logging record attributes, stored as-is and never interpreted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    pub source_name: String,
    pub process_type: String,
    pub status_code: i32,
    pub message: String,
    pub severity_raw: String,
    pub severity_canonical: String,
    pub timestamp: DateTime<Utc>,
    pub received_at: DateTime<Utc>,
    pub schema: PayloadSchema,
    pub logger_name: String,
    pub created: DateTime<Utc>,
    pub lineno: i64,
    pub func_name: String,
    pub msecs: f64,
    pub relative_created: DateTime<Utc>,
    pub thread: i64,
    pub thread_name: String,
    pub process_name: String,
    pub process: String,
}

/// A registered log source. Referenced from `LogRecord.source_name` by name only,
/// records without a matching entry are still valid and still aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MicroserviceEntry {
    pub name: String,
    pub description: String,
    pub registered_at: DateTime<Utc>,
}
