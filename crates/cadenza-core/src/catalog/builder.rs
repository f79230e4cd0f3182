use crate::catalog::Catalog;
use crate::error::Result;
use crate::model::{Album, Artist, EntityKind, EntityRef, Genre, Item, Track};
use crate::record::TrackRecord;

/// Ingests flat track records into a [`Catalog`], creating entities on
/// first sight and linking them into the genre → artist → album → track →
/// item graph.
///
/// Every entity is insert-or-get by its derived key, and every edge is
/// inserted as a mirrored pair, so ingestion is idempotent and the final
/// graph does not depend on record order. Scalar attributes are
/// first-write-wins.
#[derive(Debug)]
pub struct CatalogBuilder<'a> {
    catalog: &'a mut Catalog,
}

impl<'a> CatalogBuilder<'a> {
    pub fn new(catalog: &'a mut Catalog) -> Self {
        Self { catalog }
    }

    /// Ingest every record of one track list, returning how many were
    /// ingested.
    pub fn ingest_track_list(&mut self, records: &[TrackRecord]) -> Result<usize> {
        for record in records {
            self.ingest(record)?;
        }
        Ok(records.len())
    }

    /// Ingest a single track record.
    pub fn ingest(&mut self, record: &TrackRecord) -> Result<()> {
        let metadata = &record.metadata;

        let item = self.item(&record.service, &record.uri);

        let track = self.track(record);
        self.catalog.link(&track, &item)?;

        let first_artist = metadata.artists.first().map(String::as_str);
        let album = self.album(&metadata.album, first_artist);
        self.catalog.link(&album, &track)?;

        // Genres hang off artists, not albums or tracks.
        for artist_name in &metadata.artists {
            let artist = self.artist(artist_name);
            self.catalog.link(&artist, &album)?;

            for genre_name in &metadata.genres {
                let genre = self.genre(genre_name);
                self.catalog.link(&genre, &artist)?;
            }
        }

        Ok(())
    }

    fn item(&mut self, service: &str, uri: &str) -> EntityRef {
        let id = Item::key(service, uri);
        self.catalog
            .item
            .entry(id.clone())
            .or_insert_with(|| Item::new(service, uri));
        EntityRef::new(EntityKind::Item, id)
    }

    fn track(&mut self, record: &TrackRecord) -> EntityRef {
        let metadata = &record.metadata;
        let id = Track::key(&metadata.album, &metadata.title);
        self.catalog.track.entry(id.clone()).or_insert_with(|| {
            Track::new(&metadata.album, metadata.title.clone())
                .with_tracknumber(metadata.tracknumber)
                .with_date(metadata.date.clone())
        });
        EntityRef::new(EntityKind::Track, id)
    }

    fn album(&mut self, name: &str, first_artist: Option<&str>) -> EntityRef {
        let id = Album::key(name, first_artist);
        self.catalog
            .album
            .entry(id.clone())
            .or_insert_with(|| Album::new(name, first_artist));
        EntityRef::new(EntityKind::Album, id)
    }

    fn artist(&mut self, name: &str) -> EntityRef {
        let artist = Artist::new(name);
        let reference = EntityRef::new(EntityKind::Artist, artist.id.clone());
        self.catalog.artist.entry(artist.id.clone()).or_insert(artist);
        reference
    }

    fn genre(&mut self, name: &str) -> EntityRef {
        let genre = Genre::new(name);
        let reference = EntityRef::new(EntityKind::Genre, genre.id.clone());
        self.catalog.genre.entry(genre.id.clone()).or_insert(genre);
        reference
    }
}
