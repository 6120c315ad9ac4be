#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
use std::sync::Arc;

use axum::Router;
use framework::asset::asset_path;
use framework::exception::AppResult;
use framework::json;
use framework::log;
use framework::shutdown::Shutdown;
use framework::web::server::HttpServerConfig;
use framework::web::server::start_http_server;
use serde::Deserialize;

use crate::ingest::EventTimePolicy;
use crate::store::MemoryStore;
use crate::store::PostgresStore;
use crate::store::Store;

mod aggregate;
mod ingest;
mod record;
mod severity;
mod store;
mod web;

#[derive(Debug, Deserialize, Clone)]
struct AppConfig {
    bind_address: Option<String>,
    event_time: EventTimePolicy,
    store: StoreConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
enum StoreConfig {
    Memory,
    Postgres { uri: String },
}

pub struct AppState {
    event_time: EventTimePolicy,
    store: Store,
}

impl AppState {
    async fn new(config: &AppConfig) -> AppResult<Self> {
        let store = match config.store {
            StoreConfig::Memory => Store::Memory(MemoryStore::new()),
            StoreConfig::Postgres { ref uri } => {
                let store = PostgresStore::connect(uri).await?;
                store.init().await?;
                Store::Postgres(store)
            }
        };
        Ok(AppState {
            event_time: config.event_time,
            store,
        })
    }
}

#[tokio::main]
async fn main() -> AppResult<()> {
    log::init();

    let config: AppConfig = json::load_file(&asset_path("assets/conf.json")?)?;

    let shutdown = Shutdown::new();
    let signal = shutdown.subscribe();
    shutdown.listen();

    let state = Arc::new(AppState::new(&config).await?);

    let mut server_config = HttpServerConfig::default();
    if let Some(ref bind_address) = config.bind_address {
        server_config.bind_address = bind_address.clone();
    }

    let app = Router::new();
    let app = app.merge(web::routes());
    let app = app.with_state(state);
    start_http_server(app, signal, server_config).await
}
