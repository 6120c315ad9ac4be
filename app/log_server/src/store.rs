use chrono::DateTime;
use chrono::Utc;
use framework::exception::AppResult;
pub use memory::MemoryStore;
pub use postgres::PostgresStore;

use crate::record::LogRecord;
use crate::record::MicroserviceEntry;

mod memory;
mod postgres;

/// The persistence seam the core depends on. Enum dispatch keeps the call sites
/// free of trait objects, the backing engine owns atomicity of writes.
///
/// Appends are at-least-once from the caller's view, duplicate submissions produce
/// duplicate rows and no uniqueness is enforced. A concurrent query may observe
/// either side of an in-flight append.
pub enum Store {
    Memory(MemoryStore),
    Postgres(PostgresStore),
}

impl Store {
    pub async fn append(&self, record: &LogRecord) -> AppResult<()> {
        match self {
            Store::Memory(store) => store.append(record).await,
            Store::Postgres(store) => store.append(record).await,
        }
    }

    /// Unordered; `since` inclusive, `until` exclusive, absent bounds are unbounded.
    pub async fn query(
        &self,
        source_name: Option<&str>,
        since: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
    ) -> AppResult<Vec<LogRecord>> {
        match self {
            Store::Memory(store) => store.query(source_name, since, until).await,
            Store::Postgres(store) => store.query(source_name, since, until).await,
        }
    }

    /// Upsert by name.
    pub async fn register(&self, entry: MicroserviceEntry) -> AppResult<()> {
        match self {
            Store::Memory(store) => store.register(entry).await,
            Store::Postgres(store) => store.register(entry).await,
        }
    }

    pub async fn list_sources(&self) -> AppResult<Vec<MicroserviceEntry>> {
        match self {
            Store::Memory(store) => store.list_sources().await,
            Store::Postgres(store) => store.list_sources().await,
        }
    }
}
