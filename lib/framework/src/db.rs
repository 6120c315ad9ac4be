use tokio_postgres::Client;
use tokio_postgres::NoTls;
use tracing::error;
use tracing::info;

use crate::exception;
use crate::exception::AppResult;

// the spawned task drives the socket, the client handle stays usable until it stops
pub async fn connect(uri: &str) -> AppResult<Client> {
    let (client, connection) = tokio_postgres::connect(uri, NoTls)
        .await
        .map_err(|err| exception!(message = "failed to connect postgres", source = err))?;

    tokio::spawn(async move {
        if let Err(err) = connection.await {
            error!("postgres connection closed, error={err}");
        }
    });

    info!("postgres connected");
    Ok(client)
}
