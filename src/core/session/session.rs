use crate::core::session::state::SessionStats;
use crate::domain::{
    config::{DecodeMode, SessionConfig},
    error::{DevtermError, DevtermResult},
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, trace, warn};

/// Interactive command/response session over a single connection.
///
/// Owns the stream for its whole lifetime. Exactly one request is
/// outstanding at a time: every command is written, then exactly one
/// bounded read collects the reply.
pub struct Session<S> {
    stream: S,
    config: SessionConfig,
    buffer: Vec<u8>,
    stats: SessionStats,
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Create a session on an already established stream
    pub fn new(stream: S, config: SessionConfig) -> DevtermResult<Self> {
        config.validate()?;

        let buffer = vec![0u8; config.buffer_size];
        Ok(Self {
            stream,
            config,
            buffer,
            stats: SessionStats::default(),
        })
    }

    /// Send one command line and return the first reply chunk as text.
    ///
    /// `line` goes out followed by exactly one `\n`. The reply is a single
    /// read of at most `buffer_size` bytes; anything beyond that stays
    /// unread on the socket.
    pub async fn exchange(&mut self, line: &str) -> DevtermResult<String> {
        let mut request = Vec::with_capacity(line.len() + 1);
        request.extend_from_slice(line.as_bytes());
        request.push(b'\n');

        self.stream.write_all(&request).await?;
        self.stream.flush().await?;
        self.stats.record_sent(request.len());
        trace!(bytes = %hex::encode(&request), "Request written");

        let n = self.stream.read(&mut self.buffer).await?;
        if n == 0 {
            warn!("Peer closed the connection before replying");
            return Err(DevtermError::PeerClosed);
        }

        let chunk = &self.buffer[..n];
        trace!(bytes = %hex::encode(chunk), "Reply read");
        let reply = match self.config.decode {
            DecodeMode::Strict => String::from_utf8(chunk.to_vec())?,
            DecodeMode::Lossy => String::from_utf8_lossy(chunk).into_owned(),
        };

        self.stats.record_received(n);
        debug!(
            sent = request.len(),
            received = n,
            exchange = self.stats.exchanges,
            "Exchange completed"
        );
        Ok(reply)
    }

    /// Drive the read-send-receive-print loop until operator input ends.
    ///
    /// The hint is printed once, then the prompt before every command.
    /// Any exchange failure ends the loop and is returned as is.
    pub async fn run<R, W>(&mut self, input: R, mut output: W) -> DevtermResult<SessionStats>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();

        output.write_all(self.config.hint.as_bytes()).await?;
        output.write_all(b"\n").await?;

        loop {
            output.write_all(self.config.prompt.as_bytes()).await?;
            output.flush().await?;

            let Some(line) = lines.next_line().await? else {
                info!("Operator input closed, ending session");
                break;
            };

            let reply = self.exchange(&line).await?;
            output.write_all(reply.as_bytes()).await?;
            output.write_all(b"\n").await?;
        }

        output.flush().await?;
        Ok(self.stats.clone())
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }
}
