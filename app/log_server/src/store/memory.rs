use std::collections::BTreeMap;

use chrono::DateTime;
use chrono::Utc;
use framework::exception::AppResult;
use tokio::sync::RwLock;

use crate::record::LogRecord;
use crate::record::MicroserviceEntry;

/// In-process store, the default backend and the test double for the storage contract.
pub struct MemoryStore {
    records: RwLock<Vec<LogRecord>>,
    sources: RwLock<BTreeMap<String, MicroserviceEntry>>,
}

impl MemoryStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        MemoryStore {
            records: RwLock::new(Vec::new()),
            sources: RwLock::new(BTreeMap::new()),
        }
    }

    pub async fn append(&self, record: &LogRecord) -> AppResult<()> {
        self.records.write().await.push(record.clone());
        Ok(())
    }

    pub async fn query(
        &self,
        source_name: Option<&str>,
        since: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
    ) -> AppResult<Vec<LogRecord>> {
        let records = self.records.read().await;
        let matches = records
            .iter()
            .filter(|record| {
                if let Some(source_name) = source_name
                    && record.source_name != source_name
                {
                    return false;
                }
                if let Some(since) = since
                    && record.timestamp < since
                {
                    return false;
                }
                if let Some(until) = until
                    && record.timestamp >= until
                {
                    return false;
                }
                true
            })
            .cloned()
            .collect();
        Ok(matches)
    }

    pub async fn register(&self, entry: MicroserviceEntry) -> AppResult<()> {
        self.sources.write().await.insert(entry.name.clone(), entry);
        Ok(())
    }

    pub async fn list_sources(&self) -> AppResult<Vec<MicroserviceEntry>> {
        let sources = self.sources.read().await;
        Ok(sources.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;
    use chrono::TimeZone;
    use chrono::Utc;

    use super::MemoryStore;
    use crate::record::LogRecord;
    use crate::record::MicroserviceEntry;
    use crate::record::PayloadSchema;

    fn record(source_name: &str) -> LogRecord {
        let timestamp = Utc.with_ymd_and_hms(2021, 3, 21, 14, 1, 2).unwrap();
        LogRecord {
            source_name: source_name.to_string(),
            process_type: "batch".to_string(),
            status_code: 200,
            message: "ok".to_string(),
            severity_raw: "INFO".to_string(),
            severity_canonical: "INFO".to_string(),
            timestamp,
            received_at: timestamp,
            schema: PayloadSchema::Current,
            logger_name: "logger".to_string(),
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

    #[tokio::test]
    async fn append_then_query_returns_the_record() {
        let store = MemoryStore::new();
        let record = record("users_api");
        store.append(&record).await.unwrap();

        let results = store
            .query(Some("users_api"), Some(record.timestamp - TimeDelta::seconds(1)), None)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].source_name, "users_api");
    }

    #[tokio::test]
    async fn window_bounds_are_since_inclusive_until_exclusive() {
        let store = MemoryStore::new();
        let record = record("users_api");
        store.append(&record).await.unwrap();

        let hit = store.query(None, Some(record.timestamp), None).await.unwrap();
        assert_eq!(hit.len(), 1);

        let miss = store.query(None, None, Some(record.timestamp)).await.unwrap();
        assert!(miss.is_empty());
    }

    #[tokio::test]
    async fn duplicate_appends_produce_duplicate_rows() {
        let store = MemoryStore::new();
        let record = record("users_api");
        store.append(&record).await.unwrap();
        store.append(&record).await.unwrap();
        assert_eq!(store.query(None, None, None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn source_filter() {
        let store = MemoryStore::new();
        store.append(&record("users_api")).await.unwrap();
        store.append(&record("orders_api")).await.unwrap();
        let results = store.query(Some("orders_api"), None, None).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].source_name, "orders_api");
    }

    #[tokio::test]
    async fn register_is_upsert_by_name() {
        let store = MemoryStore::new();
        let registered_at = Utc.with_ymd_and_hms(2021, 3, 21, 0, 0, 0).unwrap();
        store
            .register(MicroserviceEntry {
                name: "users_api".to_string(),
                description: "first".to_string(),
                registered_at,
            })
            .await
            .unwrap();
        store
            .register(MicroserviceEntry {
                name: "users_api".to_string(),
                description: "second".to_string(),
                registered_at,
            })
            .await
            .unwrap();

        let sources = store.list_sources().await.unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].description, "second");
    }
}
