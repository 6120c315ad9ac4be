use std::error::Error;
use std::fmt::Display;
use std::fmt::Formatter;

use chrono::DateTime;
use chrono::NaiveDateTime;
use chrono::Utc;
use serde::Deserialize;

use crate::record::LogRecord;
use crate::record::PayloadSchema;
use crate::severity;

// python logging embeds the event time as e.g. "21-Mar-2021 (14:01:02.123456)"
const EMBEDDED_TIMESTAMP_FORMAT: &str = "%d-%b-%Y (%H:%M:%S%.f)";

/// Raw POST body, one field per python logging record attribute. Everything arrives
/// as a string, validation and coercion happen in [`normalize`].
#[derive(Debug, Deserialize)]
pub struct RawLogPayload {
    pub name: Option<String>,
    pub msg: Option<String>,
    pub args: Option<String>,
    pub levelname: Option<String>,
    pub created: Option<String>,
    pub lineno: Option<String>,
    #[serde(rename = "funcName")]
    pub func_name: Option<String>,
    pub msecs: Option<String>,
    #[serde(rename = "relativeCreated")]
    pub relative_created: Option<String>,
    pub thread: Option<String>,
    #[serde(rename = "threadName")]
    pub thread_name: Option<String>,
    #[serde(rename = "processName")]
    pub process_name: Option<String>,
    pub process: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum NormalizeError {
    /// every missing required key, collected in one pass
    MissingFields(Vec<&'static str>),
    MalformedArgs(String),
    TypeCoercion(&'static str),
}

impl Display for NormalizeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            NormalizeError::MissingFields(fields) => write!(f, "missing fields: {}", fields.join(", ")),
            NormalizeError::MalformedArgs(reason) => write!(f, "malformed args tuple: {reason}"),
            NormalizeError::TypeCoercion(field) => write!(f, "failed to coerce field: {field}"),
        }
    }
}

impl Error for NormalizeError {}

/// Which field is authoritative for the event time, per deployment configuration.
/// Older clients embed a timestamp in the `args` tuple, newer ones only carry `created`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventTimePolicy {
    /// use the `args` timestamp when the legacy 4-tuple carries one, fall back to `created`
    Embedded,
    /// always use `created`
    Created,
}

/// Validates and coerces a raw payload into a [`LogRecord`]. Pure, no side effects.
pub fn normalize(
    raw: &RawLogPayload,
    policy: EventTimePolicy,
    received_at: DateTime<Utc>,
) -> Result<LogRecord, NormalizeError> {
    let mut missing: Vec<&'static str> = Vec::new();
    let logger_name = require(&raw.name, "name", &mut missing);
    let message = require(&raw.msg, "msg", &mut missing);
    let args = require(&raw.args, "args", &mut missing);
    let severity_raw = require(&raw.levelname, "levelname", &mut missing);
    let created_raw = require(&raw.created, "created", &mut missing);
    let lineno_raw = require(&raw.lineno, "lineno", &mut missing);
    let func_name = require(&raw.func_name, "funcName", &mut missing);
    let msecs_raw = require(&raw.msecs, "msecs", &mut missing);
    let relative_created_raw = require(&raw.relative_created, "relativeCreated", &mut missing);
    let thread_raw = require(&raw.thread, "thread", &mut missing);
    let thread_name = require(&raw.thread_name, "threadName", &mut missing);
    let process_name = require(&raw.process_name, "processName", &mut missing);
    let process = require(&raw.process, "process", &mut missing);
    if !missing.is_empty() {
        return Err(NormalizeError::MissingFields(missing));
    }

    let args = parse_args(args)?;

    let status_code: i32 = args
        .status_code
        .trim()
        .parse()
        .map_err(|_err| NormalizeError::TypeCoercion("status_code"))?;
    let lineno: i64 = lineno_raw
        .trim()
        .parse()
        .map_err(|_err| NormalizeError::TypeCoercion("lineno"))?;
    let msecs: f64 = msecs_raw
        .trim()
        .parse()
        .map_err(|_err| NormalizeError::TypeCoercion("msecs"))?;
    let thread: i64 = thread_raw
        .trim()
        .parse()
        .map_err(|_err| NormalizeError::TypeCoercion("thread"))?;
    let created = epoch_to_instant(created_raw, "created")?;
    let relative_created = epoch_to_instant(relative_created_raw, "relativeCreated")?;

    let embedded_timestamp = match args.embedded_timestamp {
        Some(ref value) => Some(parse_embedded_timestamp(value)?),
        None => None,
    };
    let timestamp = match policy {
        EventTimePolicy::Embedded => embedded_timestamp.unwrap_or(created),
        EventTimePolicy::Created => created,
    };

    Ok(LogRecord {
        source_name: args.source_name,
        process_type: args.process_type,
        status_code,
        message: message.to_string(),
        severity_raw: severity_raw.to_string(),
        severity_canonical: severity::canonicalize(severity_raw).to_string(),
        timestamp,
        received_at,
        schema: args.schema,
        logger_name: logger_name.to_string(),
        created,
        lineno,
        func_name: func_name.to_string(),
        msecs,
        relative_created,
        thread,
        thread_name: thread_name.to_string(),
        process_name: process_name.to_string(),
        process: process.to_string(),
    })
}

fn require<'a>(value: &'a Option<String>, field: &'static str, missing: &mut Vec<&'static str>) -> &'a str {
    match value {
        Some(value) => value,
        None => {
            missing.push(field);
            ""
        }
    }
}

struct ParsedArgs {
    source_name: String,
    process_type: String,
    embedded_timestamp: Option<String>,
    status_code: String,
    schema: PayloadSchema,
}

// args is a python literal tuple, either
//   ('source', 'process_type', status_code)
// or the legacy
//   ('source', 'process_type', 'DD-Mon-YYYY (HH:MM:SS.ffffff)', status_code)
fn parse_args(raw: &str) -> Result<ParsedArgs, NormalizeError> {
    let trimmed = raw.trim();
    let inner = trimmed
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(|| NormalizeError::MalformedArgs("not a tuple literal".to_string()))?;

    let mut elements = split_tuple(inner)?.into_iter();
    match (
        elements.next(),
        elements.next(),
        elements.next(),
        elements.next(),
        elements.next(),
    ) {
        (Some(source_name), Some(process_type), Some(status_code), None, None) => Ok(ParsedArgs {
            source_name,
            process_type,
            embedded_timestamp: None,
            status_code,
            schema: PayloadSchema::Current,
        }),
        (Some(source_name), Some(process_type), Some(timestamp), Some(status_code), None) => Ok(ParsedArgs {
            source_name,
            process_type,
            embedded_timestamp: Some(timestamp),
            status_code,
            schema: PayloadSchema::LegacyEmbeddedTimestamp,
        }),
        (first, second, third, fourth, fifth) => {
            let count = [
                first.is_some(),
                second.is_some(),
                third.is_some(),
                fourth.is_some(),
                fifth.is_some(),
            ]
            .iter()
            .filter(|present| **present)
            .count();
            Err(NormalizeError::MalformedArgs(format!(
                "expected 3 or 4 elements, got {}{}",
                count,
                if fifth.is_some() { "+" } else { "" }
            )))
        }
    }
}

fn split_tuple(inner: &str) -> Result<Vec<String>, NormalizeError> {
    let mut elements = Vec::new();
    let mut chars = inner.chars().peekable();
    loop {
        while let Some(next) = chars.peek()
            && next.is_whitespace()
        {
            chars.next();
        }
        let Some(&first) = chars.peek() else { break };

        let element = if first == '\'' || first == '"' {
            chars.next();
            let mut value = String::new();
            let mut closed = false;
            while let Some(next) = chars.next() {
                if next == '\\' {
                    if let Some(escaped) = chars.next() {
                        value.push(escaped);
                    }
                } else if next == first {
                    closed = true;
                    break;
                } else {
                    value.push(next);
                }
            }
            if !closed {
                return Err(NormalizeError::MalformedArgs("unterminated string".to_string()));
            }
            value
        } else {
            let mut value = String::new();
            while let Some(&next) = chars.peek()
                && next != ','
            {
                value.push(next);
                chars.next();
            }
            value.trim_end().to_string()
        };
        elements.push(element);

        while let Some(next) = chars.peek()
            && next.is_whitespace()
        {
            chars.next();
        }
        match chars.next() {
            Some(',') => {}
            None => break,
            Some(unexpected) => {
                return Err(NormalizeError::MalformedArgs(format!(
                    "unexpected character '{unexpected}'"
                )));
            }
        }
    }
    Ok(elements)
}

fn epoch_to_instant(raw: &str, field: &'static str) -> Result<DateTime<Utc>, NormalizeError> {
    let seconds: f64 = raw.trim().parse().map_err(|_err| NormalizeError::TypeCoercion(field))?;
    let millis = (seconds * 1000.0).round();
    if !millis.is_finite() {
        return Err(NormalizeError::TypeCoercion(field));
    }
    DateTime::from_timestamp_millis(millis as i64).ok_or(NormalizeError::TypeCoercion(field))
}

fn parse_embedded_timestamp(value: &str) -> Result<DateTime<Utc>, NormalizeError> {
    NaiveDateTime::parse_from_str(value.trim(), EMBEDDED_TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_err| NormalizeError::TypeCoercion("timestamp"))
}
