//! Scripted stand-in for mpv's IPC server, shared by the unit tests.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, DuplexStream};
use tokio::net::UnixListener;

use crate::metadata::{TagReader, TrackTags};
use crate::mpv::MpvConnection;

/// How the fake answers a query for one property.
#[derive(Debug, Clone)]
pub enum Prop {
    Value(Value),
    Error(&'static str),
    /// Written as-is, for malformed replies.
    Raw(&'static str),
    /// Never answers.
    Silent,
    /// Drops the connection.
    Hangup,
}

#[derive(Clone, Default)]
pub struct FakeMpv {
    props: HashMap<String, Prop>,
    queries: Arc<Mutex<Vec<String>>>,
}

impl FakeMpv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, prop: Prop) -> Self {
        self.props.insert(name.to_string(), prop);
        self
    }

    /// Property names asked for so far, in order.
    pub fn queried(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    pub fn connect(&self) -> MpvConnection<DuplexStream> {
        self.connect_with_timeout(Duration::from_secs(1))
    }

    pub fn connect_with_timeout(&self, timeout: Duration) -> MpvConnection<DuplexStream> {
        let (client, server) = tokio::io::duplex(4096);
        tokio::spawn(self.clone().serve(server));
        MpvConnection::new(client, timeout)
    }

    /// Serve on a real unix socket at `path`, one task per connection.
    pub fn listen(&self, path: &Path) -> tokio::task::JoinHandle<()> {
        let listener = UnixListener::bind(path).unwrap();
        let mpv = self.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(mpv.clone().serve(stream));
            }
        })
    }

    async fn serve<S>(self, stream: S)
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let (read_half, mut write_half) = tokio::io::split(stream);
        let mut lines = BufReader::new(read_half).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let cmd: Value = serde_json::from_str(&line).unwrap();
            let name = cmd["command"][1].as_str().unwrap().to_string();
            self.queries.lock().unwrap().push(name.clone());

            let reply = match self.props.get(&name) {
                Some(Prop::Value(v)) => json!({"data": v, "error": "success"}).to_string(),
                Some(Prop::Error(status)) => json!({"error": status}).to_string(),
                Some(Prop::Raw(raw)) => raw.to_string(),
                Some(Prop::Silent) => continue,
                Some(Prop::Hangup) => return,
                None => json!({"error": "property unavailable"}).to_string(),
            };
            if write_half.write_all(format!("{}\n", reply).as_bytes()).await.is_err() {
                return;
            }
        }
    }
}

/// Returns fixed tags and remembers which paths it was asked about.
#[derive(Default)]
pub struct StaticTags {
    pub tags: Option<TrackTags>,
    pub paths: Mutex<Vec<std::path::PathBuf>>,
}

impl StaticTags {
    pub fn new(performer: &str, album: &str) -> Self {
        Self {
            tags: Some(TrackTags {
                performer: performer.to_string(),
                album: album.to_string(),
            }),
            paths: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self::default()
    }
}

impl TagReader for StaticTags {
    fn read_tags(&self, path: &Path) -> anyhow::Result<TrackTags> {
        self.paths.lock().unwrap().push(path.to_path_buf());
        self.tags
            .clone()
            .ok_or_else(|| anyhow::anyhow!("no tags in {:?}", path))
    }
}
