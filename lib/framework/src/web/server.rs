use std::time::Instant;

use axum::Router;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::Instrument;
use tracing::debug;
use tracing::info;
use tracing::info_span;

use crate::exception::AppResult;
use crate::log::id_generator;

pub struct HttpServerConfig {
    pub bind_address: String,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        HttpServerConfig {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

pub async fn start_http_server(
    router: Router,
    mut shutdown_signal: broadcast::Receiver<()>,
    config: HttpServerConfig,
) -> AppResult<()> {
    let app = Router::new();
    let app = app.merge(router);
    let app = app.layer(middleware::from_fn(http_server_layer));
    let listener = TcpListener::bind(&config.bind_address).await?;
    info!("http server started, bind={}", config.bind_address);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if shutdown_signal.recv().await.is_err() {
                debug!("shutdown channel closed");
            }
        })
        .await?;
    info!("http server stopped");

    Ok(())
}

async fn http_server_layer(request: Request, next: Next) -> Response {
    // skip log for health check, lb probes would flood the log otherwise
    if request.uri().path() == "/health-check" {
        return StatusCode::OK.into_response();
    }

    let request_id = id_generator::random_id();
    let span = info_span!("request", request_id);
    async move {
        let start_time = Instant::now();
        let method = request.method().clone();
        let path = request.uri().path().to_string();
        debug!(method = ?method, path, "[request]");
        let response = next.run(request).await;
        let status = response.status().as_u16();
        info!(status, elapsed = ?start_time.elapsed(), "{method} {path}");
        response
    }
    .instrument(span)
    .await
}
