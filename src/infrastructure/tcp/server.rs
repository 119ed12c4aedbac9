use crate::domain::error::{DevtermError, DevtermResult};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone)]
pub struct ClientConnection {
    pub addr: SocketAddr,
    pub bytes_echoed: u64,
}

/// Local peer that writes back every byte it receives.
///
/// Stands in for a device when checking framing by hand (`devterm echo`)
/// and in tests. Client handlers live in the accept task's `JoinSet`, so
/// stopping or dropping the server closes every client connection too.
pub struct EchoServer {
    listener: Option<TcpListener>,
    bind_addr: SocketAddr,
    clients: Arc<Mutex<Vec<ClientConnection>>>,
    shutdown_sender: mpsc::Sender<()>,
    shutdown_receiver: Option<mpsc::Receiver<()>>,
    server_handle: Option<tokio::task::JoinHandle<()>>,
}

impl EchoServer {
    pub async fn new(bind_addr: &str) -> DevtermResult<Self> {
        let listener = TcpListener::bind(bind_addr).await?;
        let actual_addr = listener.local_addr()?;
        let (shutdown_sender, shutdown_receiver) = mpsc::channel(1);

        info!("Echo server created on {}", actual_addr);

        Ok(Self {
            listener: Some(listener),
            bind_addr: actual_addr,
            clients: Arc::new(Mutex::new(Vec::new())),
            shutdown_sender,
            shutdown_receiver: Some(shutdown_receiver),
            server_handle: None,
        })
    }

    pub fn get_bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    pub fn start(&mut self) -> DevtermResult<()> {
        let (Some(listener), Some(mut shutdown_receiver)) =
            (self.listener.take(), self.shutdown_receiver.take())
        else {
            return Err(DevtermError::Config {
                message: "Echo server is already running".to_string(),
            });
        };

        info!("Starting echo server on {}", self.bind_addr);
        let clients = Arc::clone(&self.clients);

        let server_handle = tokio::spawn(async move {
            let mut connections = JoinSet::new();

            loop {
                tokio::select! {
                    accept_result = listener.accept() => {
                        match accept_result {
                            Ok((stream, addr)) => {
                                info!("New client connected: {}", addr);
                                clients.lock().await.push(ClientConnection {
                                    addr,
                                    bytes_echoed: 0,
                                });

                                let clients = Arc::clone(&clients);
                                connections.spawn(async move {
                                    if let Err(e) = Self::handle_client(stream, addr, &clients).await {
                                        error!("Error handling client {}: {}", addr, e);
                                    }
                                    Self::remove_client(&clients, addr).await;
                                });
                            }
                            Err(e) => {
                                error!("Failed to accept connection: {}", e);
                            }
                        }
                    }
                    Some(_) = connections.join_next(), if !connections.is_empty() => {}
                    _ = shutdown_receiver.recv() => {
                        info!("Echo server shutting down, closing {} client(s)", connections.len());
                        break;
                    }
                }
            }

            connections.shutdown().await;
            clients.lock().await.clear();
        });

        self.server_handle = Some(server_handle);
        Ok(())
    }

    async fn handle_client(
        mut stream: TcpStream,
        addr: SocketAddr,
        clients: &Mutex<Vec<ClientConnection>>,
    ) -> DevtermResult<()> {
        let mut buffer = vec![0u8; 4096];

        loop {
            let n = stream.read(&mut buffer).await?;
            if n == 0 {
                debug!("Client {} disconnected gracefully", addr);
                return Ok(());
            }

            stream.write_all(&buffer[..n]).await?;
            stream.flush().await?;
            debug!("Echoed {} bytes back to {}", n, addr);

            let mut clients = clients.lock().await;
            if let Some(client) = clients.iter_mut().find(|c| c.addr == addr) {
                client.bytes_echoed += n as u64;
            }
        }
    }

    async fn remove_client(clients: &Mutex<Vec<ClientConnection>>, addr: SocketAddr) {
        let mut clients = clients.lock().await;
        if let Some(index) = clients.iter().position(|c| c.addr == addr) {
            let client = clients.remove(index);
            info!("Client {} disconnected after {} bytes echoed", addr, client.bytes_echoed);
        }
    }

    pub async fn stop(&mut self) -> DevtermResult<()> {
        if let Some(handle) = self.server_handle.take() {
            info!("Stopping echo server");

            if let Err(e) = self.shutdown_sender.send(()).await {
                warn!("Failed to send shutdown signal: {}", e);
            }

            if let Err(e) = handle.await {
                warn!("Server task completed with error: {}", e);
            }

            info!("Echo server stopped");
        }

        Ok(())
    }

    pub async fn get_connected_clients(&self) -> Vec<ClientConnection> {
        self.clients.lock().await.clone()
    }

    pub async fn get_client_count(&self) -> usize {
        self.clients.lock().await.len()
    }
}

impl Drop for EchoServer {
    fn drop(&mut self) {
        if let Some(handle) = self.server_handle.take() {
            // Aborting the accept task drops its JoinSet, aborting every client handler.
            warn!("EchoServer dropped while still running - aborting accept loop");
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    async fn wait_for_client_count(server: &EchoServer, expected: usize) -> usize {
        let mut count = usize::MAX;
        for _ in 0..50 {
            count = server.get_client_count().await;
            if count == expected {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        count
    }

    #[tokio::test]
    async fn test_echo_server_creation() {
        let server = EchoServer::new("127.0.0.1:0").await.unwrap();

        assert_ne!(server.get_bind_addr().port(), 0);
        assert_eq!(server.get_client_count().await, 0);
    }

    #[tokio::test]
    async fn test_echo_server_start_twice_fails() {
        let mut server = EchoServer::new("127.0.0.1:0").await.unwrap();

        server.start().unwrap();
        assert!(server.start().is_err());

        server.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_echo_functionality() {
        let mut server = EchoServer::new("127.0.0.1:0").await.unwrap();
        server.start().unwrap();

        let mut client = TcpStream::connect(server.get_bind_addr()).await.unwrap();
        client.write_all(b"AUTH key1\n").await.unwrap();

        let mut buf = [0u8; 64];
        let n = client.read(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"AUTH key1\n");

        let clients = server.get_connected_clients().await;
        assert_eq!(clients.len(), 1);
        assert_eq!(clients[0].addr, client.local_addr().unwrap());

        drop(client);
        server.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_client_removed_after_disconnect() {
        let mut server = EchoServer::new("127.0.0.1:0").await.unwrap();
        server.start().unwrap();

        let mut client = TcpStream::connect(server.get_bind_addr()).await.unwrap();
        client.write_all(b"ping\n").await.unwrap();
        let mut buf = [0u8; 16];
        client.read(&mut buf).await.unwrap();
        drop(client);

        assert_eq!(wait_for_client_count(&server, 0).await, 0);

        server.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_stop_closes_connected_clients() {
        let mut server = EchoServer::new("127.0.0.1:0").await.unwrap();
        server.start().unwrap();

        let mut client = TcpStream::connect(server.get_bind_addr()).await.unwrap();
        client.write_all(b"ping\n").await.unwrap();
        let mut buf = [0u8; 16];
        let n = client.read(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"ping\n");

        server.stop().await.unwrap();
        assert_eq!(server.get_client_count().await, 0);

        // The handler is gone, so the still-open client sees EOF or a reset.
        let result = tokio::time::timeout(Duration::from_secs(2), client.read(&mut buf))
            .await
            .expect("client connection was left open after stop");
        assert!(matches!(result, Ok(0) | Err(_)));
    }
}
