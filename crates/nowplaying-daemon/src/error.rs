use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Failure of a single property query against the mpv control socket.
#[derive(Debug, Error)]
pub enum IpcError {
    #[error("failed to connect to mpv socket {path:?}: {source}")]
    Connect {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("mpv IPC timed out after {0:?}")]
    Timeout(Duration),

    #[error("mpv IPC I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("mpv closed the IPC connection")]
    Closed,

    /// Reply was not valid JSON or did not match the requested shape.
    #[error("malformed mpv reply: {0}")]
    Decode(#[from] serde_json::Error),

    /// mpv answered with a status other than `success`.
    #[error("{0}")]
    Protocol(String),
}

impl IpcError {
    /// Anything that is not mpv itself refusing the query.
    pub fn is_transport(&self) -> bool {
        !matches!(self, IpcError::Protocol(_))
    }

    /// Whether the connection can still be trusted for another query.  A
    /// timeout may leave a reply in flight; a decode error or a refused
    /// query consumed exactly one line.
    pub fn leaves_connection_usable(&self) -> bool {
        matches!(self, IpcError::Protocol(_) | IpcError::Decode(_))
    }
}

/// Why a status line could not be produced.  `Display` is the text shown to
/// HTTP clients.
#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("Nothing is currently playing")]
    NoMedia(#[source] IpcError),

    #[error("Error occurred attempting to gather information")]
    Query {
        property: &'static str,
        #[source]
        source: IpcError,
    },
}
