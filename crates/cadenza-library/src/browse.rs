//! Browse queries against a ready catalog.

use cadenza_core::model::{EntityKind, EntityRef};
use cadenza_core::{Catalog, IndexBuilder, IndexDefinition, IndexEntry, NavigationError};

use crate::error::LibraryResult;

const INDEX_PREFIX: &str = "index";

/// Default sort path and field projection for listing the children of an
/// entity of a given kind.
#[derive(Debug, Clone, Copy)]
pub struct ChildListing {
    pub sort_by: &'static str,
    pub fields: &'static [(&'static str, &'static str)],
}

impl ChildListing {
    /// `None` for items, whose listing is reserved.
    pub fn for_kind(kind: EntityKind) -> Option<Self> {
        let listing = match kind {
            // Artists in a genre.
            EntityKind::Genre => Self {
                sort_by: "name",
                fields: &[("name", "name"), ("genres", "parents:#:name")],
            },
            // Albums by an artist, dated by their first track.
            EntityKind::Artist => Self {
                sort_by: "children:#0:date",
                fields: &[
                    ("name", "name"),
                    ("artists", "parents:#:name"),
                    ("date", "children:#0:date"),
                ],
            },
            // Tracks on an album.
            EntityKind::Album => Self {
                sort_by: "tracknumber",
                fields: &[
                    ("name", "name"),
                    ("album", "parents:#0:name"),
                    ("artists", "parents:#0:parents:#:name"),
                    ("tracknumber", "tracknumber"),
                    ("date", "date"),
                ],
            },
            // Playable versions of a track across services.
            EntityKind::Track => Self {
                sort_by: "service",
                fields: &[("service", "service"), ("uri", "uri")],
            },
            EntityKind::Item => return None,
        };
        Some(listing)
    }
}

/// Answer a browse query.
///
/// - `""` lists the predefined indexes as `index:<name>` pseudo-entities;
/// - `index:<name>` returns that stored index;
/// - `item:<id>` is reserved and lists nothing;
/// - `<type>:<id>` lists the entity's children.
pub fn browse(
    catalog: &Catalog,
    definitions: &[IndexDefinition],
    reference: &str,
    sort_override: Option<&str>,
) -> LibraryResult<Vec<IndexEntry>> {
    if reference.is_empty() {
        return Ok(index_directory(definitions));
    }

    if let Some(name) = reference
        .strip_prefix(INDEX_PREFIX)
        .and_then(|rest| rest.strip_prefix(':'))
    {
        let index = catalog.index(name).ok_or_else(|| {
            NavigationError::new(
                name,
                "no such index",
                &catalog.index_names().collect::<Vec<_>>().join(", "),
            )
        })?;
        return Ok(index.to_vec());
    }

    let reference: EntityRef = reference
        .parse()
        .map_err(|_| NavigationError::new(reference, "unknown reference", reference))?;
    let Some(listing) = ChildListing::for_kind(reference.kind) else {
        return Ok(Vec::new());
    };

    let entity = catalog
        .get(&reference)
        .ok_or_else(|| NavigationError::new(reference.to_string(), "no such entity", ""))?;
    let children: Vec<EntityRef> = entity.links().children.iter().cloned().collect();
    let sort_by = sort_override.unwrap_or(listing.sort_by);

    Ok(IndexBuilder::new(catalog).build(&children, sort_by, listing.fields)?)
}

fn index_directory(definitions: &[IndexDefinition]) -> Vec<IndexEntry> {
    definitions
        .iter()
        .map(|definition| IndexEntry {
            id: format!("{INDEX_PREFIX}:{}", definition.name),
            values: [("name".to_string(), definition.name.clone())]
                .into_iter()
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadenza_core::{CatalogBuilder, TrackRecord};

    fn catalog() -> Catalog {
        let records = [
            TrackRecord::new("mpd", "file:///b.flac")
                .with_title("Second")
                .with_album("Record")
                .with_artist("Band")
                .with_genre("Rock")
                .with_tracknumber(2)
                .with_date("1999"),
            TrackRecord::new("mpd", "file:///a.flac")
                .with_title("First")
                .with_album("Record")
                .with_artist("Band")
                .with_genre("Rock")
                .with_tracknumber(1)
                .with_date("1999"),
            TrackRecord::new("spotify", "spotify:track:1")
                .with_title("First")
                .with_album("Record")
                .with_artist("Band"),
            TrackRecord::new("mpd", "file:///c.flac")
                .with_title("Opener")
                .with_album("Debut")
                .with_artist("Band")
                .with_tracknumber(1)
                .with_date("1990"),
        ];
        let mut catalog = Catalog::new();
        CatalogBuilder::new(&mut catalog)
            .ingest_track_list(&records)
            .unwrap();
        catalog
            .rebuild_indexes(&IndexDefinition::predefined())
            .unwrap();
        catalog
    }

    fn first(catalog: &Catalog, kind: EntityKind) -> String {
        catalog.refs(kind)[0].to_string()
    }

    fn column<'a>(entries: &'a [IndexEntry], field: &str) -> Vec<&'a str> {
        entries.iter().map(|e| e.values[field].as_str()).collect()
    }

    #[test]
    fn test_empty_reference_lists_indexes() {
        let catalog = catalog();
        let definitions = IndexDefinition::predefined();
        let entries = browse(&catalog, &definitions, "", None).unwrap();
        assert_eq!(entries.len(), definitions.len());
        assert_eq!(entries[0].id, "index:Genres by Name");
        assert_eq!(entries[0].values["name"], "Genres by Name");
    }

    #[test]
    fn test_index_reference_returns_stored_index() {
        let catalog = catalog();
        let entries = browse(&catalog, &[], "index:Tracks by Name", None).unwrap();
        assert_eq!(entries, catalog.index("Tracks by Name").unwrap());
        assert_eq!(column(&entries, "name"), vec!["First", "Opener", "Second"]);
    }

    #[test]
    fn test_unknown_index_is_navigation_error() {
        let catalog = catalog();
        let err = browse(&catalog, &[], "index:Nope", None).unwrap_err();
        assert!(err.is_navigation());
    }

    #[test]
    fn test_album_lists_tracks_by_number() {
        let catalog = catalog();
        let album = catalog
            .refs(EntityKind::Album)
            .into_iter()
            .find(|r| catalog.album(&r.id).unwrap().name == "Record")
            .unwrap();
        let entries = browse(&catalog, &[], &album.to_string(), None).unwrap();
        assert_eq!(column(&entries, "name"), vec!["First", "Second"]);
        assert_eq!(column(&entries, "tracknumber"), vec!["1", "2"]);
        assert_eq!(column(&entries, "album"), vec!["Record", "Record"]);
        assert_eq!(column(&entries, "artists"), vec!["Band", "Band"]);
    }

    #[test]
    fn test_artist_lists_albums_by_date() {
        let catalog = catalog();
        let artist = first(&catalog, EntityKind::Artist);
        let entries = browse(&catalog, &[], &artist, None).unwrap();
        assert_eq!(column(&entries, "name"), vec!["Debut", "Record"]);
        assert_eq!(column(&entries, "date"), vec!["1990", "1999"]);
    }

    #[test]
    fn test_sort_override() {
        let catalog = catalog();
        let artist = first(&catalog, EntityKind::Artist);
        let entries = browse(&catalog, &[], &artist, Some("name")).unwrap();
        assert_eq!(column(&entries, "name"), vec!["Debut", "Record"]);
        let entries = browse(&catalog, &[], &artist, Some("children:#0:name")).unwrap();
        assert_eq!(column(&entries, "name"), vec!["Debut", "Record"]);
    }

    #[test]
    fn test_genre_lists_artists() {
        let catalog = catalog();
        let genre = first(&catalog, EntityKind::Genre);
        let entries = browse(&catalog, &[], &genre, None).unwrap();
        assert_eq!(column(&entries, "name"), vec!["Band"]);
        assert_eq!(column(&entries, "genres"), vec!["Rock"]);
        assert!(entries[0].id.starts_with("artist:"));
    }

    #[test]
    fn test_track_lists_items_by_service() {
        let catalog = catalog();
        let track = catalog
            .refs(EntityKind::Track)
            .into_iter()
            .find(|r| catalog.track(&r.id).unwrap().name == "First")
            .unwrap();
        let entries = browse(&catalog, &[], &track.to_string(), None).unwrap();
        assert_eq!(column(&entries, "service"), vec!["mpd", "spotify"]);
        assert_eq!(column(&entries, "uri"), vec!["file:///a.flac", "spotify:track:1"]);
    }

    #[test]
    fn test_item_listing_is_empty() {
        let catalog = catalog();
        let item = first(&catalog, EntityKind::Item);
        assert!(browse(&catalog, &[], &item, None).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_prefix_and_missing_entity() {
        let catalog = catalog();
        assert!(browse(&catalog, &[], "playlist:abc", None)
            .unwrap_err()
            .is_navigation());
        assert!(browse(&catalog, &[], "album:missing", None)
            .unwrap_err()
            .is_navigation());
    }

    #[test]
    fn test_bad_sort_override_is_navigation_error() {
        let catalog = catalog();
        let genre = first(&catalog, EntityKind::Genre);
        let err = browse(&catalog, &[], &genre, Some("tracknumber")).unwrap_err();
        assert!(err.is_navigation());
    }
}
