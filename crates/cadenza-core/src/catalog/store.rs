use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};
use crate::index::{IndexBuilder, IndexDefinition, IndexEntry};
use crate::model::{Album, Artist, Entity, EntityId, EntityKind, EntityRef, Genre, Item, Track};
use crate::schema::SnapshotHandle;

/// Snapshot key under which the whole catalog is persisted.
pub const LIBRARY_KEY: &str = "library";

/// The in-memory catalog: one insertion-ordered collection per entity
/// kind plus the derived, named sorted indexes.
///
/// The catalog is the sole owner of every entity; edges are
/// [`EntityRef`] lookup keys into these collections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    built_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub(crate) genre: IndexMap<EntityId, Genre>,
    #[serde(default)]
    pub(crate) artist: IndexMap<EntityId, Artist>,
    #[serde(default)]
    pub(crate) album: IndexMap<EntityId, Album>,
    #[serde(default)]
    pub(crate) track: IndexMap<EntityId, Track>,
    #[serde(default)]
    pub(crate) item: IndexMap<EntityId, Item>,
    #[serde(default)]
    index: IndexMap<String, Vec<IndexEntry>>,
}

/// Collection sizes, for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub genres: usize,
    pub artists: usize,
    pub albums: usize,
    pub tracks: usize,
    pub items: usize,
    pub indexes: usize,
}

impl fmt::Display for Counts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "genres: {}, artists: {}, albums: {}, tracks: {}, items: {}, indexes: {}",
            self.genres, self.artists, self.albums, self.tracks, self.items, self.indexes
        )
    }
}

impl Catalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up any entity by reference.
    pub fn get(&self, reference: &EntityRef) -> Option<&dyn Entity> {
        let id = &reference.id;
        match reference.kind {
            EntityKind::Genre => self.genre.get(id).map(|e| e as &dyn Entity),
            EntityKind::Artist => self.artist.get(id).map(|e| e as &dyn Entity),
            EntityKind::Album => self.album.get(id).map(|e| e as &dyn Entity),
            EntityKind::Track => self.track.get(id).map(|e| e as &dyn Entity),
            EntityKind::Item => self.item.get(id).map(|e| e as &dyn Entity),
        }
    }

    fn get_mut(&mut self, reference: &EntityRef) -> Option<&mut dyn Entity> {
        let id = &reference.id;
        match reference.kind {
            EntityKind::Genre => self.genre.get_mut(id).map(|e| e as &mut dyn Entity),
            EntityKind::Artist => self.artist.get_mut(id).map(|e| e as &mut dyn Entity),
            EntityKind::Album => self.album.get_mut(id).map(|e| e as &mut dyn Entity),
            EntityKind::Track => self.track.get_mut(id).map(|e| e as &mut dyn Entity),
            EntityKind::Item => self.item.get_mut(id).map(|e| e as &mut dyn Entity),
        }
    }

    pub fn genre(&self, id: &EntityId) -> Option<&Genre> {
        self.genre.get(id)
    }

    pub fn artist(&self, id: &EntityId) -> Option<&Artist> {
        self.artist.get(id)
    }

    pub fn album(&self, id: &EntityId) -> Option<&Album> {
        self.album.get(id)
    }

    pub fn track(&self, id: &EntityId) -> Option<&Track> {
        self.track.get(id)
    }

    pub fn item(&self, id: &EntityId) -> Option<&Item> {
        self.item.get(id)
    }

    /// Number of entities of `kind`.
    pub fn len(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Genre => self.genre.len(),
            EntityKind::Artist => self.artist.len(),
            EntityKind::Album => self.album.len(),
            EntityKind::Track => self.track.len(),
            EntityKind::Item => self.item.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        EntityKind::ALL.iter().all(|kind| self.len(*kind) == 0)
    }

    /// References to every entity of `kind`, in insertion order.
    pub fn refs(&self, kind: EntityKind) -> Vec<EntityRef> {
        let ids: Box<dyn Iterator<Item = &EntityId>> = match kind {
            EntityKind::Genre => Box::new(self.genre.keys()),
            EntityKind::Artist => Box::new(self.artist.keys()),
            EntityKind::Album => Box::new(self.album.keys()),
            EntityKind::Track => Box::new(self.track.keys()),
            EntityKind::Item => Box::new(self.item.keys()),
        };
        ids.map(|id| EntityRef::new(kind, id.clone())).collect()
    }

    pub fn counts(&self) -> Counts {
        Counts {
            genres: self.genre.len(),
            artists: self.artist.len(),
            albums: self.album.len(),
            tracks: self.track.len(),
            items: self.item.len(),
            indexes: self.index.len(),
        }
    }

    /// When the catalog was last rebuilt from track lists.
    pub fn built_at(&self) -> Option<DateTime<Utc>> {
        self.built_at
    }

    pub fn mark_built(&mut self, at: DateTime<Utc>) {
        self.built_at = Some(at);
    }

    /// Insert the mirrored edge pair `parent -> child` and `child -> parent`.
    ///
    /// Both entities must already exist. Edge sets dedup, so relinking is a
    /// no-op.
    pub fn link(&mut self, parent: &EntityRef, child: &EntityRef) -> Result<()> {
        if self.get(parent).is_none() {
            return Err(missing(parent));
        }
        let child_entity = self.get_mut(child).ok_or_else(|| missing(child))?;
        child_entity.links_mut().parents.insert(parent.clone());
        if let Some(parent_entity) = self.get_mut(parent) {
            parent_entity.links_mut().children.insert(child.clone());
        }
        Ok(())
    }

    /// A stored sorted index, by name.
    pub fn index(&self, name: &str) -> Option<&[IndexEntry]> {
        self.index.get(name).map(Vec::as_slice)
    }

    pub fn index_names(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(String::as_str)
    }

    /// Replace every stored index with freshly built ones.
    ///
    /// Nothing is replaced if any definition fails to build.
    pub fn rebuild_indexes(&mut self, definitions: &[IndexDefinition]) -> Result<()> {
        let mut built = IndexMap::with_capacity(definitions.len());
        {
            let builder = IndexBuilder::new(self);
            for definition in definitions {
                log::debug!("Building index {}", definition.name);
                let refs = self.refs(definition.kind);
                let entries = builder.build(&refs, &definition.sort_by, definition.fields.as_slice())?;
                built.insert(definition.name.clone(), entries);
            }
        }
        self.index = built;
        Ok(())
    }

    /// Read a complete catalog from the snapshot store.
    pub fn load_from(handle: &dyn SnapshotHandle) -> Result<Self> {
        let raw = handle.get(LIBRARY_KEY)?.ok_or(Error::NotFound {
            entity: "snapshot",
            id: LIBRARY_KEY.to_string(),
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Persist the whole catalog as a single snapshot value.
    pub fn save_to(&self, handle: &mut dyn SnapshotHandle) -> Result<()> {
        let raw = serde_json::to_string(self)?;
        handle.put(LIBRARY_KEY, &raw)
    }
}

fn missing(reference: &EntityRef) -> Error {
    Error::NotFound {
        entity: reference.kind.as_str(),
        id: reference.id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::MemorySnapshotStore;
    use crate::schema::SnapshotStore;

    fn sample() -> (Catalog, EntityRef, EntityRef) {
        let mut catalog = Catalog::new();
        let genre = Genre::new("Jazz");
        let artist = Artist::new("Miles Davis");
        let genre_ref = genre.reference();
        let artist_ref = artist.reference();
        catalog.genre.insert(genre.id.clone(), genre);
        catalog.artist.insert(artist.id.clone(), artist);
        (catalog, genre_ref, artist_ref)
    }

    #[test]
    fn test_new_catalog_is_empty() {
        let catalog = Catalog::new();
        assert!(catalog.is_empty());
        assert_eq!(catalog.counts(), Counts::default());
        assert!(catalog.built_at().is_none());
    }

    #[test]
    fn test_link_is_mirrored() {
        let (mut catalog, genre, artist) = sample();
        catalog.link(&genre, &artist).unwrap();

        let genre_entity = catalog.get(&genre).unwrap();
        let artist_entity = catalog.get(&artist).unwrap();
        assert!(genre_entity.links().children.contains(&artist));
        assert!(artist_entity.links().parents.contains(&genre));
    }

    #[test]
    fn test_relink_does_not_duplicate() {
        let (mut catalog, genre, artist) = sample();
        catalog.link(&genre, &artist).unwrap();
        catalog.link(&genre, &artist).unwrap();
        assert_eq!(catalog.get(&genre).unwrap().links().children.len(), 1);
    }

    #[test]
    fn test_link_to_missing_entity_fails_without_mutation() {
        let (mut catalog, genre, _) = sample();
        let ghost = EntityRef::new(EntityKind::Artist, EntityId::from_natural_key(&["Nobody"]));
        assert!(catalog.link(&genre, &ghost).is_err());
        assert!(catalog.link(&ghost, &genre).is_err());
        assert!(catalog.get(&genre).unwrap().links().children.is_empty());
        assert!(catalog.get(&genre).unwrap().links().parents.is_empty());
    }

    #[test]
    fn test_refs_in_insertion_order() {
        let mut catalog = Catalog::new();
        for name in ["Zydeco", "Ambient", "Metal"] {
            let genre = Genre::new(name);
            catalog.genre.insert(genre.id.clone(), genre);
        }
        let names: Vec<String> = catalog
            .refs(EntityKind::Genre)
            .iter()
            .map(|r| catalog.genre(&r.id).unwrap().name.clone())
            .collect();
        assert_eq!(names, vec!["Zydeco", "Ambient", "Metal"]);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let (mut catalog, genre, artist) = sample();
        catalog.link(&genre, &artist).unwrap();
        catalog.mark_built(Utc::now());

        let store = MemorySnapshotStore::new();
        let mut handle = store.open().unwrap();
        catalog.save_to(&mut *handle).unwrap();
        let loaded = Catalog::load_from(&*handle).unwrap();
        handle.close().unwrap();

        assert_eq!(loaded, catalog);
    }

    #[test]
    fn test_load_from_empty_store_is_not_found() {
        let store = MemorySnapshotStore::new();
        let handle = store.open().unwrap();
        let err = Catalog::load_from(&*handle).unwrap_err();
        assert!(matches!(err, Error::NotFound { entity: "snapshot", .. }));
    }

    #[test]
    fn test_counts_display() {
        let (catalog, _, _) = sample();
        assert_eq!(
            catalog.counts().to_string(),
            "genres: 1, artists: 1, albums: 0, tracks: 0, items: 0, indexes: 0"
        );
    }
}
