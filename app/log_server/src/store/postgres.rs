use chrono::DateTime;
use chrono::Utc;
use framework::db;
use framework::exception::AppResult;
use framework::store_error;
use tokio_postgres::Client;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

use crate::record::LogRecord;
use crate::record::MicroserviceEntry;
use crate::record::PayloadSchema;

// event timestamp is the query key for windowed reads, no uniqueness on log rows
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS microservice_log (
    source_name TEXT NOT NULL,
    process_type TEXT NOT NULL,
    status_code INT NOT NULL,
    message TEXT NOT NULL,
    severity_raw TEXT NOT NULL,
    severity_canonical TEXT NOT NULL,
    timestamp TIMESTAMPTZ NOT NULL,
    received_at TIMESTAMPTZ NOT NULL,
    schema TEXT NOT NULL,
    logger_name TEXT NOT NULL,
    created TIMESTAMPTZ NOT NULL,
    lineno BIGINT NOT NULL,
    func_name TEXT NOT NULL,
    msecs DOUBLE PRECISION NOT NULL,
    relative_created TIMESTAMPTZ NOT NULL,
    thread BIGINT NOT NULL,
    thread_name TEXT NOT NULL,
    process_name TEXT NOT NULL,
    process TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS microservice_log_source_timestamp ON microservice_log (source_name, timestamp);
CREATE TABLE IF NOT EXISTS microservice (
    name TEXT PRIMARY KEY,
    description TEXT NOT NULL,
    registered_at TIMESTAMPTZ NOT NULL
);
";

const RECORD_COLUMNS: &str = "source_name, process_type, status_code, message, severity_raw, severity_canonical, \
    timestamp, received_at, schema, logger_name, created, lineno, func_name, msecs, relative_created, \
    thread, thread_name, process_name, process";

pub struct PostgresStore {
    client: Client,
}

impl PostgresStore {
    pub async fn connect(uri: &str) -> AppResult<Self> {
        Ok(PostgresStore {
            client: db::connect(uri).await?,
        })
    }

    pub async fn init(&self) -> AppResult<()> {
        self.client
            .batch_execute(SCHEMA)
            .await
            .map_err(|err| store_error!(message = "failed to create schema", source = err))
    }

    pub async fn append(&self, record: &LogRecord) -> AppResult<()> {
        let sql = format!(
            "INSERT INTO microservice_log ({RECORD_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)"
        );
        let schema = record.schema.as_str();
        self.client
            .execute(
                &sql,
                &[
                    &record.source_name,
                    &record.process_type,
                    &record.status_code,
                    &record.message,
                    &record.severity_raw,
                    &record.severity_canonical,
                    &record.timestamp,
                    &record.received_at,
                    &schema,
                    &record.logger_name,
                    &record.created,
                    &record.lineno,
                    &record.func_name,
                    &record.msecs,
                    &record.relative_created,
                    &record.thread,
                    &record.thread_name,
                    &record.process_name,
                    &record.process,
                ],
            )
            .await
            .map_err(|err| {
                store_error!(
                    message = format!("failed to append record, source={}", record.source_name),
                    source = err
                )
            })?;
        Ok(())
    }

    pub async fn query(
        &self,
        source_name: Option<&str>,
        since: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
    ) -> AppResult<Vec<LogRecord>> {
        let mut sql = format!("SELECT {RECORD_COLUMNS} FROM microservice_log");
        let mut conditions: Vec<String> = Vec::new();
        let mut params: Vec<&(dyn ToSql + Sync)> = Vec::new();
        if let Some(ref source_name) = source_name {
            params.push(source_name);
            conditions.push(format!("source_name = ${}", params.len()));
        }
        if let Some(ref since) = since {
            params.push(since);
            conditions.push(format!("timestamp >= ${}", params.len()));
        }
        if let Some(ref until) = until {
            params.push(until);
            conditions.push(format!("timestamp < ${}", params.len()));
        }
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }

        let rows = self
            .client
            .query(&sql, &params)
            .await
            .map_err(|err| store_error!(message = "failed to query records", source = err))?;
        rows.iter().map(record_from_row).collect()
    }

    pub async fn register(&self, entry: MicroserviceEntry) -> AppResult<()> {
        self.client
            .execute(
                "INSERT INTO microservice (name, description, registered_at) VALUES ($1, $2, $3) \
                 ON CONFLICT (name) DO UPDATE SET description = EXCLUDED.description, registered_at = EXCLUDED.registered_at",
                &[&entry.name, &entry.description, &entry.registered_at],
            )
            .await
            .map_err(|err| {
                store_error!(
                    message = format!("failed to register microservice, name={}", entry.name),
                    source = err
                )
            })?;
        Ok(())
    }

    pub async fn list_sources(&self) -> AppResult<Vec<MicroserviceEntry>> {
        let rows = self
            .client
            .query("SELECT name, description, registered_at FROM microservice ORDER BY name", &[])
            .await
            .map_err(|err| store_error!(message = "failed to list microservices", source = err))?;
        rows.iter()
            .map(|row| {
                Ok(MicroserviceEntry {
                    name: row.try_get("name")?,
                    description: row.try_get("description")?,
                    registered_at: row.try_get("registered_at")?,
                })
            })
            .collect()
    }
}

fn record_from_row(row: &Row) -> AppResult<LogRecord> {
    let schema: String = row.try_get("schema")?;
    Ok(LogRecord {
        source_name: row.try_get("source_name")?,
        process_type: row.try_get("process_type")?,
        status_code: row.try_get("status_code")?,
        message: row.try_get("message")?,
        severity_raw: row.try_get("severity_raw")?,
        severity_canonical: row.try_get("severity_canonical")?,
        timestamp: row.try_get("timestamp")?,
        received_at: row.try_get("received_at")?,
        schema: PayloadSchema::parse(&schema),
        logger_name: row.try_get("logger_name")?,
        created: row.try_get("created")?,
        lineno: row.try_get("lineno")?,
        func_name: row.try_get("func_name")?,
        msecs: row.try_get("msecs")?,
        relative_created: row.try_get("relative_created")?,
        thread: row.try_get("thread")?,
        thread_name: row.try_get("thread_name")?,
        process_name: row.try_get("process_name")?,
        process: row.try_get("process")?,
    })
}
