//! Audio inputs known to the application: locally loaded files and entries of
//! a remote project listing whose bytes are fetched only when needed.

use std::{fmt, path::Path, sync::Arc};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Result, WaveDiffError};

/// Stable identifier of an [`AudioSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceId(Uuid);

impl SourceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SourceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Encoded audio plus the name shown to the user.
#[derive(Clone)]
pub struct AudioSource {
    pub id: SourceId,
    pub name: String,
    pub bytes: Arc<[u8]>,
}

impl AudioSource {
    pub fn new(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            id: SourceId::new(),
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

impl fmt::Debug for AudioSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioSource")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// Ordered collection of every source loaded so far.
#[derive(Debug, Default, Clone)]
pub struct FileLibrary {
    items: Vec<AudioSource>,
}

impl FileLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> SourceId {
        self.insert(AudioSource::new(name, bytes))
    }

    pub fn insert(&mut self, source: AudioSource) -> SourceId {
        let id = source.id;
        tracing::debug!(%id, name = %source.name, bytes = source.bytes.len(), "added source");
        self.items.push(source);
        id
    }

    /// Reads a file from disk; its file name becomes the display name.
    pub fn add_path(&mut self, path: &Path) -> Result<SourceId> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(self.add(name, bytes))
    }

    pub fn get(&self, id: SourceId) -> Option<&AudioSource> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn items(&self) -> &[AudioSource] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Retrieves bytes behind a remote URL.
pub trait Fetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// One record of a remote project listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEntry {
    pub id: String,
    pub name: String,
    pub url: String,
}

impl RemoteEntry {
    /// Fetches the entry's bytes and wraps them as a local source.
    pub fn load(&self, fetcher: &dyn Fetcher) -> Result<AudioSource> {
        let bytes = fetcher.fetch(&self.url).map_err(|err| {
            WaveDiffError::msg(format!("failed to fetch `{}` from {}: {err}", self.name, self.url))
        })?;
        Ok(AudioSource::new(self.name.clone(), bytes))
    }
}

/// Parses a JSON array of `{ id, name, url }` records, preserving order.
pub fn parse_listing(json: &str) -> Result<Vec<RemoteEntry>> {
    Ok(serde_json::from_str(json)?)
}
