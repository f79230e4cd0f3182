use serde::{Deserialize, Deserializer, Serialize};

/// One raw track record as enumerated by a track-list source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackRecord {
    /// The backend that can play this track (e.g. "mpd", "spop").
    pub service: String,
    /// Service-specific location of the playable item.
    pub uri: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: TrackMetadata,
}

/// Tag metadata attached to a [`TrackRecord`]. Missing or `null` text
/// fields read as empty, missing or `null` lists as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackMetadata {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub album: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub artists: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub genres: Vec<String>,
    #[serde(default)]
    pub tracknumber: Option<u32>,
    #[serde(default)]
    pub date: Option<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// An ordered, source-specific sequence of track records.
pub type TrackList = Vec<TrackRecord>;

impl TrackRecord {
    #[must_use]
    pub fn new(service: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            uri: uri.into(),
            metadata: TrackMetadata::default(),
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.metadata.title = title.into();
        self
    }

    #[must_use]
    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.metadata.album = album.into();
        self
    }

    #[must_use]
    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.metadata.artists.push(artist.into());
        self
    }

    #[must_use]
    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.metadata.genres.push(genre.into());
        self
    }

    #[must_use]
    pub fn with_tracknumber(mut self, tracknumber: u32) -> Self {
        self.metadata.tracknumber = Some(tracknumber);
        self
    }

    #[must_use]
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.metadata.date = Some(date.into());
        self
    }
}
