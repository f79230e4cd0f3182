//! Track-list providers.

use async_trait::async_trait;
use cadenza_core::{Result, TrackList};
use std::fmt;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Enumerates every known track list across backends.
#[async_trait]
pub trait TrackListSource: fmt::Debug + Send + Sync {
    async fn track_lists(&self) -> Result<Vec<TrackList>>;
}

/// Reads track lists from a directory tree of JSON files, one list per
/// file, in file-name order.
#[derive(Debug, Clone)]
pub struct DirectoryTrackListSource {
    root: PathBuf,
}

impl DirectoryTrackListSource {
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn is_track_list(path: &Path) -> bool {
        path.extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
    }

    fn track_list_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
        {
            let entry = entry.map_err(std::io::Error::from)?;
            let path = entry.path();
            if entry.file_type().is_file() && Self::is_track_list(path) {
                files.push(path.to_path_buf());
            }
        }
        Ok(files)
    }
}

#[async_trait]
impl TrackListSource for DirectoryTrackListSource {
    async fn track_lists(&self) -> Result<Vec<TrackList>> {
        let files = self.track_list_files()?;
        let mut lists = Vec::with_capacity(files.len());
        for path in files {
            log::debug!("Reading track list: {}", path.display());
            let raw = tokio::fs::read_to_string(&path).await?;
            let list: TrackList = serde_json::from_str(&raw)?;
            lists.push(list);
        }
        Ok(lists)
    }
}

/// A fixed set of track lists held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticTrackListSource {
    lists: Vec<TrackList>,
}

impl StaticTrackListSource {
    #[must_use]
    pub fn new(lists: Vec<TrackList>) -> Self {
        Self { lists }
    }
}

#[async_trait]
impl TrackListSource for StaticTrackListSource {
    async fn track_lists(&self) -> Result<Vec<TrackList>> {
        Ok(self.lists.clone())
    }
}
