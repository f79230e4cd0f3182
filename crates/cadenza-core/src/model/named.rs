use serde::{Deserialize, Serialize};

use crate::model::entity::{impl_entity, Links};
use crate::model::ids::{EntityId, EntityKind};
use crate::model::value::Value;

/// A genre. Its children are artists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: EntityId,
    pub name: String,
    #[serde(flatten)]
    pub links: Links,
}

/// A musical artist (person or group). Parents are genres, children are
/// albums.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub id: EntityId,
    pub name: String,
    #[serde(flatten)]
    pub links: Links,
}

/// An album. Parents are artists, children are tracks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub id: EntityId,
    pub name: String,
    #[serde(flatten)]
    pub links: Links,
}

impl Genre {
    /// Genres are keyed by name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: EntityId::from_natural_key(&[&name]),
            name,
            links: Links::default(),
        }
    }
}

impl Artist {
    /// Artists are keyed by name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: EntityId::from_natural_key(&[&name]),
            name,
            links: Links::default(),
        }
    }
}

impl Album {
    /// The one album title that is too generic to merge across artists.
    pub const GREATEST_HITS: &'static str = "Greatest Hits";

    /// Derive the album id.
    ///
    /// Albums are keyed by name alone, so tracks of one album credited to
    /// different artists still land together. "Greatest Hits" is keyed by
    /// the first artist plus the name instead.
    #[must_use]
    pub fn key(name: &str, first_artist: Option<&str>) -> EntityId {
        if name == Self::GREATEST_HITS {
            EntityId::from_natural_key(&[first_artist.unwrap_or_default(), name])
        } else {
            EntityId::from_natural_key(&[name])
        }
    }

    #[must_use]
    pub fn new(name: impl Into<String>, first_artist: Option<&str>) -> Self {
        let name = name.into();
        Self {
            id: Self::key(&name, first_artist),
            name,
            links: Links::default(),
        }
    }
}

impl_entity!(Genre, EntityKind::Genre, |genre, name| match name {
    "name" => Some(Value::text(&genre.name)),
    _ => None,
});

impl_entity!(Artist, EntityKind::Artist, |artist, name| match name {
    "name" => Some(Value::text(&artist.name)),
    _ => None,
});

impl_entity!(Album, EntityKind::Album, |album, name| match name {
    "name" => Some(Value::text(&album.name)),
    _ => None,
});
