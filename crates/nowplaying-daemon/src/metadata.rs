//! Performer/album lookup from the file's own tags, for media mpv cannot
//! describe by itself.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use lofty::prelude::*;
use lofty::probe::Probe;
use lofty::tag::ItemKey;
use tracing::{debug, warn};

/// Tags used in the status line.  Missing tags are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackTags {
    pub performer: String,
    pub album: String,
}

/// Capability to read tags from a media file.  Built once at startup and
/// shared by all requests.
pub trait TagReader: Send + Sync {
    fn read_tags(&self, path: &Path) -> Result<TrackTags>;
}

/// Reads tags with lofty, sniffing the container from the file contents.
#[derive(Debug, Default)]
pub struct LoftyTagReader;

impl LoftyTagReader {
    pub fn new() -> Self {
        Self
    }
}

impl TagReader for LoftyTagReader {
    fn read_tags(&self, path: &Path) -> Result<TrackTags> {
        let tagged_file = Probe::open(path)
            .with_context(|| format!("Failed to open {:?}", path))?
            .guess_file_type()?
            .read()
            .context("Failed to read audio file")?;

        let Some(tag) = tagged_file.primary_tag().or_else(|| tagged_file.first_tag()) else {
            return Ok(TrackTags::default());
        };

        let get_text = |key: &ItemKey| tag.get_string(key).map(|s| s.to_string());

        Ok(TrackTags {
            performer: get_text(&ItemKey::TrackArtist)
                .or_else(|| get_text(&ItemKey::AlbumArtist))
                .unwrap_or_default(),
            album: get_text(&ItemKey::AlbumTitle).unwrap_or_default(),
        })
    }
}

/// Look up tags for `filename` relative to mpv's working directory.
///
/// Never fails: an unreadable file or missing tags give empty fields.
pub async fn resolve(
    reader: Arc<dyn TagReader>,
    working_directory: &str,
    filename: &str,
) -> TrackTags {
    let path = Path::new(working_directory).join(filename);
    let lookup = path.clone();

    match tokio::task::spawn_blocking(move || reader.read_tags(&lookup)).await {
        Ok(Ok(tags)) => {
            debug!("metadata: {:?} -> {:?}", path, tags);
            tags
        }
        Ok(Err(e)) => {
            warn!("metadata: no tags for {:?}: {:#}", path, e);
            TrackTags::default()
        }
        Err(e) => {
            warn!("metadata: tag lookup task failed: {}", e);
            TrackTags::default()
        }
    }
}
