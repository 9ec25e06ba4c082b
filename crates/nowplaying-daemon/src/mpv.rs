/// mpv IPC property client.
///
/// ```text
///   MpvConnection::connect(socket_path)
///         │
///         └── query(name, shape)
///                ├── write  {"command":["get_property…", name]}\n
///                └── read lines until a reply arrives
///                       ├── {"event": …}          → skipped
///                       └── {"data": …, "error": …} → PropertyReply
/// ```
///
/// Exactly one query is in flight per connection; replies are matched by
/// order, so no request ids are sent.  Every dial, write and read is bounded
/// by the configured IPC timeout.
use std::path::Path;
use std::time::Duration;

use nowplaying_proto::protocol::{is_event_line, MpvCommand, PropertyReply, PropertyShape};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::time::Instant;
use tracing::debug;

#[cfg(unix)]
use tokio::net::UnixStream;

use crate::error::IpcError;

/// One connection to the player's control socket.  Owned by a single
/// request and dropped (closing the socket) when that request finishes.
pub struct MpvConnection<S> {
    stream: BufReader<S>,
    timeout: Duration,
    line: String,
}

/// Connection over mpv's unix control socket.
#[cfg(unix)]
pub type MpvSocket = MpvConnection<UnixStream>;

#[cfg(unix)]
impl MpvSocket {
    pub async fn connect(path: &Path, timeout: Duration) -> Result<Self, IpcError> {
        let stream = tokio::time::timeout(timeout, UnixStream::connect(path))
            .await
            .map_err(|_| IpcError::Timeout(timeout))?
            .map_err(|source| IpcError::Connect {
                path: path.to_path_buf(),
                source,
            })?;
        debug!("mpv: connected to {:?}", path);
        Ok(Self::new(stream, timeout))
    }
}

impl<S> MpvConnection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, timeout: Duration) -> Self {
        Self {
            stream: BufReader::new(stream),
            timeout,
            line: String::new(),
        }
    }

    /// Send one property query and wait for its reply.  Not retried.
    pub async fn query<T>(&mut self, name: &str, shape: PropertyShape) -> Result<T, IpcError>
    where
        T: DeserializeOwned + Default,
    {
        let payload = MpvCommand::get_property(name, shape).to_line()?;
        debug!("mpv: send {}", payload.trim_end());

        tokio::time::timeout(
            self.timeout,
            self.stream.get_mut().write_all(payload.as_bytes()),
        )
        .await
        .map_err(|_| IpcError::Timeout(self.timeout))??;

        let raw = self.read_reply().await?;
        let reply: PropertyReply<T> = PropertyReply::from_value(raw)?;
        reply.into_result().map_err(|status| {
            debug!("mpv: {} -> {}", name, status);
            IpcError::Protocol(status)
        })
    }

    /// Events do not extend the wait: the deadline covers the whole reply.
    async fn read_reply(&mut self) -> Result<Value, IpcError> {
        let deadline = Instant::now() + self.timeout;
        loop {
            self.line.clear();
            let n = tokio::time::timeout_at(deadline, self.stream.read_line(&mut self.line))
                .await
                .map_err(|_| IpcError::Timeout(self.timeout))??;
            if n == 0 {
                return Err(IpcError::Closed);
            }

            let trimmed = self.line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let value: Value = serde_json::from_str(trimmed)?;
            if is_event_line(&value) {
                debug!("mpv: skipping event {}", trimmed);
                continue;
            }
            return Ok(value);
        }
    }
}
