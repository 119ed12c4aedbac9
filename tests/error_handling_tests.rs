use devterm::{connect, DevtermError, DevtermResult, EndpointConfig, Session, SessionConfig};
use std::error::Error;
use tokio::net::TcpListener;

/// Error handling and fail-fast tests
#[cfg(test)]
mod error_handling_tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let errors = vec![
            DevtermError::Config { message: "bad port".to_string() },
            DevtermError::ConnectTimeout { host: "ESP32_IP".to_string(), port: 7777 },
            DevtermError::PeerClosed,
            DevtermError::Logging("already set".to_string()),
        ];

        for error in errors {
            assert!(!error.to_string().is_empty());
        }

        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DevtermError>();
    }

    #[test]
    fn test_connect_error_keeps_source() {
        let error = DevtermError::Connect {
            host: "10.0.0.1".to_string(),
            port: 7777,
            source: std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused"),
        };

        assert!(error.to_string().contains("10.0.0.1:7777"));
        assert!(error.source().is_some());
    }

    #[test]
    fn test_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        let error: DevtermError = io_error.into();
        assert!(matches!(error, DevtermError::Network(_)));

        let utf8_error = String::from_utf8(vec![0xff]).unwrap_err();
        let error: DevtermError = utf8_error.into();
        assert!(matches!(error, DevtermError::Decode(_)));
    }

    #[test]
    fn test_result_type() {
        fn failing() -> DevtermResult<()> {
            Err(DevtermError::PeerClosed)
        }

        assert_eq!(failing().unwrap_err().to_string(), "Connection closed by peer");
    }

    #[tokio::test]
    async fn test_peer_closing_after_accept_fails_first_exchange() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            drop(socket);
        });

        let stream = connect(&EndpointConfig::new(addr.ip().to_string(), addr.port()))
            .await
            .unwrap();
        server.await.unwrap();

        let mut session = Session::new(stream, SessionConfig::default()).unwrap();
        let input: &[u8] = b"AUTH key1\nSTATUS\n";
        let mut output = Vec::new();

        let result = session.run(input, &mut output).await;

        assert!(matches!(
            result,
            Err(DevtermError::PeerClosed) | Err(DevtermError::Network(_))
        ));
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "Connected. Use AUTH <key>\n> "
        );
        assert_eq!(session.stats().exchanges, 0);
    }

    #[tokio::test]
    async fn test_connect_to_closed_port_fails() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let result = connect(&EndpointConfig::new("127.0.0.1", port)).await;

        assert!(matches!(result, Err(DevtermError::Connect { .. })));
    }
}
