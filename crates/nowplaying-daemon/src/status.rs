//! Builds the "Now playing …" line from a fixed sequence of mpv queries.
//!
//! ```text
//!   media-title      required
//!   playback-time    required
//!   duration         best-effort
//!   file-size        best-effort  ── absent → short template, stop
//!   video-format     best-effort  ── non-empty → skip tag lookup
//!   working-directory, filename   best-effort → tag lookup
//! ```

use std::fmt;
use std::sync::Arc;

use nowplaying_proto::config::MpvConfig;
use nowplaying_proto::protocol::PropertyShape;
use serde::de::DeserializeOwned;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, warn};

use crate::error::{ComposeError, IpcError};
use crate::format::{format_clock, format_size, percent, whole_seconds};
use crate::metadata::{self, TagReader, TrackTags};
use crate::mpv::{MpvConnection, MpvSocket};

// ── query pipeline ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Failure aborts the request.
    Required,
    /// Failure is logged and the field treated as unknown.
    BestEffort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub property: &'static str,
    pub shape: PropertyShape,
    pub requirement: Requirement,
}

impl Step {
    const fn required(property: &'static str, shape: PropertyShape) -> Self {
        Self {
            property,
            shape,
            requirement: Requirement::Required,
        }
    }

    const fn best_effort(property: &'static str, shape: PropertyShape) -> Self {
        Self {
            property,
            shape,
            requirement: Requirement::BestEffort,
        }
    }
}

pub const MEDIA_TITLE: Step = Step::required("media-title", PropertyShape::String);
pub const PLAYBACK_TIME: Step = Step::required("playback-time", PropertyShape::Float);
pub const DURATION: Step = Step::best_effort("duration", PropertyShape::Float);
pub const FILE_SIZE: Step = Step::best_effort("file-size", PropertyShape::Float);
pub const VIDEO_FORMAT: Step = Step::best_effort("video-format", PropertyShape::String);
pub const WORKING_DIRECTORY: Step =
    Step::best_effort("working-directory", PropertyShape::String);
pub const FILENAME: Step = Step::best_effort("filename", PropertyShape::String);

/// All steps in query order.
pub const PIPELINE: [Step; 7] = [
    MEDIA_TITLE,
    PLAYBACK_TIME,
    DURATION,
    FILE_SIZE,
    VIDEO_FORMAT,
    WORKING_DIRECTORY,
    FILENAME,
];

struct Composer<'a, S> {
    conn: &'a mut MpvConnection<S>,
    /// Set after a timeout or I/O failure: a late reply could still arrive
    /// and be taken for the answer to the next query.
    unusable: bool,
}

impl<'a, S> Composer<'a, S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    fn new(conn: &'a mut MpvConnection<S>) -> Self {
        Self {
            conn,
            unusable: false,
        }
    }

    /// Runs one step.  Required steps never come back as `Ok(None)`.
    async fn fetch<T>(&mut self, step: Step) -> Result<Option<T>, ComposeError>
    where
        T: DeserializeOwned + Default,
    {
        let result = if self.unusable {
            Err(IpcError::Closed)
        } else {
            self.conn.query::<T>(step.property, step.shape).await
        };

        match result {
            Ok(value) => Ok(Some(value)),
            Err(source) => {
                if !source.leaves_connection_usable() {
                    self.unusable = true;
                }
                match step.requirement {
                    Requirement::Required => {
                        warn!("mpv: required property {} failed: {}", step.property, source);
                        Err(ComposeError::Query {
                            property: step.property,
                            source,
                        })
                    }
                    Requirement::BestEffort if source.is_transport() => {
                        warn!("mpv: {} lost to IPC failure: {}", step.property, source);
                        Ok(None)
                    }
                    Requirement::BestEffort => {
                        warn!("mpv: {} unavailable: {}", step.property, source);
                        Ok(None)
                    }
                }
            }
        }
    }
}

// ── result ────────────────────────────────────────────────────────────────────

/// What mpv (and the file's tags) told us about the current media.
#[derive(Debug, Clone, PartialEq)]
pub struct NowPlaying {
    pub title: String,
    pub elapsed_secs: f64,
    pub duration_secs: Option<f64>,
    /// `None` when mpv reports no size, e.g. for network streams.
    pub file_size: Option<f64>,
    /// `None` when the tag lookup was not attempted.
    pub tags: Option<TrackTags>,
}

impl NowPlaying {
    fn performer(&self) -> Option<&TrackTags> {
        self.tags.as_ref().filter(|t| !t.performer.is_empty())
    }
}

impl fmt::Display for NowPlaying {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let elapsed = format_clock(whole_seconds(self.elapsed_secs));

        let Some(size) = self.file_size else {
            return write!(f, "Now playing {} {}", self.title, elapsed);
        };

        let duration_secs = self.duration_secs.unwrap_or(0.0);
        let duration = format_clock(whole_seconds(duration_secs));
        let pct = percent(self.elapsed_secs, duration_secs);

        write!(f, "Now playing {}", self.title)?;
        if let Some(tags) = self.performer() {
            write!(f, " by {} from {}", tags.performer, tags.album)?;
        }
        write!(
            f,
            " {} {} / {} ({}%)",
            format_size(size),
            elapsed,
            duration,
            pct
        )
    }
}

// ── composition ───────────────────────────────────────────────────────────────

/// Run the query pipeline over an open connection.
pub async fn compose<S>(
    conn: &mut MpvConnection<S>,
    tag_reader: Arc<dyn TagReader>,
) -> Result<NowPlaying, ComposeError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut composer = Composer::new(conn);

    let title: String = composer.fetch(MEDIA_TITLE).await?.unwrap_or_default();
    let elapsed_secs: f64 = composer.fetch(PLAYBACK_TIME).await?.unwrap_or_default();
    let duration_secs: Option<f64> = composer.fetch(DURATION).await?;
    let file_size: Option<f64> = composer.fetch(FILE_SIZE).await?;

    let mut tags = None;
    if file_size.is_some() {
        // mpv names a format for anything it decoded itself; audio-only files
        // report nothing here, which is when the file's own tags are useful.
        let format: Option<String> = composer.fetch(VIDEO_FORMAT).await?;
        if format.unwrap_or_default().is_empty() {
            let working_directory: String = composer
                .fetch(WORKING_DIRECTORY)
                .await?
                .unwrap_or_default();
            let filename: String = composer.fetch(FILENAME).await?.unwrap_or_default();
            if filename.is_empty() {
                debug!("status: no filename, skipping tag lookup");
            } else {
                tags = Some(metadata::resolve(tag_reader, &working_directory, &filename).await);
            }
        }
    }

    Ok(NowPlaying {
        title,
        elapsed_secs,
        duration_secs,
        file_size,
        tags,
    })
}

/// Open a fresh connection to mpv and produce the status line.
pub async fn now_playing(
    mpv: &MpvConfig,
    tag_reader: Arc<dyn TagReader>,
) -> Result<String, ComposeError> {
    let mut conn = MpvSocket::connect(&mpv.socket_path, mpv.ipc_timeout())
        .await
        .map_err(|e| {
            warn!("mpv: {}", e);
            ComposeError::NoMedia(e)
        })?;

    let status = compose(&mut conn, tag_reader).await?.to_string();
    debug!("status: {}", status);
    Ok(status)
}
