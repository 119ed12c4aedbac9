use thiserror::Error;

/// Devterm unified error type
#[derive(Error, Debug)]
pub enum DevtermError {
    #[error("Network error: {0}")]
    Network(#[from] std::io::Error),

    #[error("Failed to connect to {host}:{port}: {source}")]
    Connect {
        host: String,
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("Connection timeout to {host}:{port}")]
    ConnectTimeout { host: String, port: u16 },

    #[error("Connection closed by peer")]
    PeerClosed,

    #[error("Reply is not valid UTF-8: {0}")]
    Decode(#[from] std::string::FromUtf8Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Logging error: {0}")]
    Logging(String),
}

pub type DevtermResult<T> = Result<T, DevtermError>;
