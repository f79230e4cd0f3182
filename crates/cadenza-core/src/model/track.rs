use serde::{Deserialize, Serialize};

use crate::model::entity::{impl_entity, Links};
use crate::model::ids::{EntityId, EntityKind};
use crate::model::value::Value;

/// A track: one song on one album, independent of where it can be played.
///
/// Parents are albums, children are playable items. The scalar fields are
/// set once, by the first record that creates the track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub tracknumber: Option<u32>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(flatten)]
    pub links: Links,
}

impl Track {
    /// Tracks are keyed by album name plus title.
    #[must_use]
    pub fn key(album: &str, title: &str) -> EntityId {
        EntityId::from_natural_key(&[album, title])
    }

    #[must_use]
    pub fn new(album: &str, title: impl Into<String>) -> Self {
        let name = title.into();
        Self {
            id: Self::key(album, &name),
            name,
            tracknumber: None,
            date: None,
            links: Links::default(),
        }
    }

    #[must_use]
    pub fn with_tracknumber(mut self, tracknumber: Option<u32>) -> Self {
        self.tracknumber = tracknumber;
        self
    }

    #[must_use]
    pub fn with_date(mut self, date: Option<String>) -> Self {
        self.date = date;
        self
    }
}

impl_entity!(Track, EntityKind::Track, |track, name| match name {
    "name" => Some(Value::text(&track.name)),
    "tracknumber" => Some(Value::from(track.tracknumber)),
    "date" => Some(Value::from(track.date.as_deref())),
    _ => None,
});
