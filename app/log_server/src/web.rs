use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;
use axum::debug_handler;
use axum::extract::Form;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::routing::get;
use chrono::DateTime;
use chrono::Utc;
use framework::exception::AppResult;
use framework::validation_error;
use framework::web::body::Json;
use framework::web::error::HttpResult;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::info;

use crate::AppState;
use crate::aggregate;
use crate::aggregate::Granularity;
use crate::aggregate::SeverityBucket;
use crate::ingest;
use crate::ingest::RawLogPayload;
use crate::record::LogRecord;
use crate::record::MicroserviceEntry;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(home))
        .route("/api/", get(get_logs).post(post_log))
        // route layout of older client configs
        .route("/microservices/api/", get(get_logs).post(post_log))
        .route("/api/sources/", get(get_sources).post(post_source))
        .route("/api/metrics/{source}/", get(get_metrics))
}

#[debug_handler]
async fn home() -> &'static str {
    "Microservice Log Center"
}

#[debug_handler]
async fn post_log(state: State<Arc<AppState>>, Form(payload): Form<RawLogPayload>) -> HttpResult<String> {
    let record = ingest_log(&state, &payload).await?;
    Ok(format!(
        "Log {}{}{} Successfully",
        record.source_name, record.process_type, record.timestamp
    ))
}

// received -> normalized -> stored, rejection and store failure are the only other
// terminal states, retry is the caller's responsibility
async fn ingest_log(state: &AppState, payload: &RawLogPayload) -> AppResult<LogRecord> {
    let received_at = Utc::now();
    let record = ingest::normalize(payload, state.event_time, received_at)
        .map_err(|error| validation_error!(message = format!("rejected log payload, error={error}")))?;
    state.store.append(&record).await?;
    debug!(
        source = record.source_name,
        severity = record.severity_canonical,
        "log stored"
    );
    Ok(record)
}

#[derive(Debug, Serialize)]
struct LogRecordResponse {
    name: String,
    msg: String,
    app_name: String,
    process_type: String,
    timestamp: String,
    status_code: i32,
    levelname: String,
    created: String,
    lineno: i64,
    #[serde(rename = "funcName")]
    func_name: String,
    msecs: f64,
    #[serde(rename = "relativeCreated")]
    relative_created: String,
    thread: i64,
    #[serde(rename = "threadName")]
    thread_name: String,
    #[serde(rename = "processName")]
    process_name: String,
    process: String,
}

impl LogRecordResponse {
    fn of(record: &LogRecord) -> Self {
        LogRecordResponse {
            name: record.logger_name.clone(),
            msg: record.message.clone(),
            app_name: record.source_name.clone(),
            process_type: record.process_type.clone(),
            timestamp: human_timestamp(record.timestamp),
            status_code: record.status_code,
            levelname: record.severity_raw.clone(),
            created: human_timestamp(record.created),
            lineno: record.lineno,
            func_name: record.func_name.clone(),
            msecs: record.msecs,
            relative_created: human_timestamp(record.relative_created),
            thread: record.thread,
            thread_name: record.thread_name.clone(),
            process_name: record.process_name.clone(),
            process: record.process.clone(),
        }
    }
}

// all human readable output is utc
fn human_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%m/%d/%Y, %H:%M:%S").to_string()
}

#[debug_handler]
async fn get_logs(state: State<Arc<AppState>>) -> HttpResult<Json<Vec<LogRecordResponse>>> {
    let records = state.store.query(None, None, None).await?;
    Ok(Json(records.iter().map(LogRecordResponse::of).collect()))
}

#[derive(Debug, Deserialize)]
struct RegisterSourceRequest {
    name: String,
    description: Option<String>,
}

#[debug_handler]
async fn post_source(
    state: State<Arc<AppState>>,
    Json(request): Json<RegisterSourceRequest>,
) -> HttpResult<Json<MicroserviceEntry>> {
    if request.name.trim().is_empty() {
        return Err(validation_error!(message = "name must not be blank").into());
    }
    let entry = MicroserviceEntry {
        name: request.name,
        description: request.description.unwrap_or_default(),
        registered_at: Utc::now(),
    };
    state.store.register(entry.clone()).await?;
    info!(name = entry.name, "microservice registered");
    Ok(Json(entry))
}

#[debug_handler]
async fn get_sources(state: State<Arc<AppState>>) -> HttpResult<Json<Vec<MicroserviceEntry>>> {
    let sources = state.store.list_sources().await?;
    Ok(Json(sources))
}

#[derive(Debug, Deserialize)]
struct MetricsQuery {
    granularity: Option<Granularity>,
    since: Option<DateTime<Utc>>,
    until: Option<DateTime<Utc>>,
}

#[debug_handler]
async fn get_metrics(
    state: State<Arc<AppState>>,
    Path(source): Path<String>,
    Query(query): Query<MetricsQuery>,
) -> HttpResult<Json<HashMap<String, Vec<SeverityBucket>>>> {
    let records = state.store.query(Some(&source), query.since, query.until).await?;
    let granularity = query.granularity.unwrap_or(Granularity::Day);
    Ok(Json(aggregate::aggregate(&records, granularity)))
}
