use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Session statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Completed command/reply pairs
    pub exchanges: u64,
    /// Total bytes sent, terminators included
    pub bytes_sent: u64,
    /// Total bytes received
    pub bytes_received: u64,
    #[serde(skip, default = "Instant::now")]
    started_at: Instant,
}

impl SessionStats {
    pub fn record_sent(&mut self, size: usize) {
        self.bytes_sent += size as u64;
    }

    /// A reply closes the exchange.
    pub fn record_received(&mut self, size: usize) {
        self.bytes_received += size as u64;
        self.exchanges += 1;
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}

impl Default for SessionStats {
    fn default() -> Self {
        Self {
            exchanges: 0,
            bytes_sent: 0,
            bytes_received: 0,
            started_at: Instant::now(),
        }
    }
}

impl std::fmt::Display for SessionStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} exchanges, {} bytes sent, {} bytes received",
            self.exchanges, self.bytes_sent, self.bytes_received
        )
    }
}
