use crate::domain::{
    config::EndpointConfig,
    error::{DevtermError, DevtermResult},
};
use tokio::net::TcpStream;
use tracing::{info, warn};

/// Open the single connection a session runs on.
///
/// Only the connection setup is bounded by `connect_timeout_ms`; the
/// returned stream has no read or write deadline.
pub async fn connect(endpoint: &EndpointConfig) -> DevtermResult<TcpStream> {
    let stream = tokio::time::timeout(
        endpoint.connect_timeout(),
        TcpStream::connect((endpoint.host.as_str(), endpoint.port)),
    )
    .await
    .map_err(|_| DevtermError::ConnectTimeout {
        host: endpoint.host.clone(),
        port: endpoint.port,
    })?
    .map_err(|source| DevtermError::Connect {
        host: endpoint.host.clone(),
        port: endpoint.port,
        source,
    })?;

    if endpoint.no_delay {
        if let Err(e) = stream.set_nodelay(true) {
            warn!("Failed to set TCP_NODELAY: {}", e);
        }
    }

    match stream.peer_addr() {
        Ok(addr) => info!("TCP connection established to {} ({})", endpoint, addr),
        Err(_) => info!("TCP connection established to {}", endpoint),
    }

    Ok(stream)
}
