use serde::{Deserialize, Serialize};

use crate::model::entity::{impl_entity, Links};
use crate::model::ids::{EntityId, EntityKind};
use crate::model::value::Value;

/// A playable copy of a track on one service.
///
/// Items are keyed by service plus URI only; two services offering the same
/// song yield two items under one track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: EntityId,
    pub service: String,
    pub uri: String,
    #[serde(flatten)]
    pub links: Links,
}

impl Item {
    #[must_use]
    pub fn key(service: &str, uri: &str) -> EntityId {
        EntityId::from_natural_key(&[service, uri])
    }

    #[must_use]
    pub fn new(service: impl Into<String>, uri: impl Into<String>) -> Self {
        let service = service.into();
        let uri = uri.into();
        Self {
            id: Self::key(&service, &uri),
            service,
            uri,
            links: Links::default(),
        }
    }
}

impl_entity!(Item, EntityKind::Item, |item, name| match name {
    "service" => Some(Value::text(&item.service)),
    "uri" => Some(Value::text(&item.uri)),
    _ => None,
});

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::entity::Entity;

    #[test]
    fn test_item_new() {
        let item = Item::new("mpd", "music/song.flac");
        assert_eq!(item.id, EntityId::from_natural_key(&["mpdmusic/song.flac"]));
        assert_eq!(item.field("service"), Some(Value::text("mpd")));
        assert_eq!(item.field("uri"), Some(Value::text("music/song.flac")));
        assert_eq!(item.field("name"), None);
        assert_eq!(item.kind(), EntityKind::Item);
    }
}
