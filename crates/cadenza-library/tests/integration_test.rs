//! Integration tests for the load → rebuild → browse lifecycle.
//!
//! These tests drive `LibraryService` against real SQLite snapshot files in
//! temporary directories and against in-memory stores and sources.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::{oneshot, Mutex};

use cadenza_core::schema::{MemorySnapshotStore, SqliteSnapshotStore};
use cadenza_core::{TrackList, TrackRecord};
use cadenza_library::{
    DirectoryTrackListSource, LibraryError, LibraryService, LibraryState, Readiness,
    StaticTrackListSource, TrackListSource,
};

fn song() -> TrackRecord {
    TrackRecord::new("s1", "u1")
        .with_title("Song")
        .with_album("Album1")
        .with_artist("Artist1")
        .with_genre("Rock")
        .with_tracknumber(1)
        .with_date("2020")
}

fn static_source(lists: Vec<TrackList>) -> Arc<dyn TrackListSource> {
    Arc::new(StaticTrackListSource::new(lists))
}

/// Fails on demand, to exercise rebuild failures after a good cycle.
#[derive(Debug)]
struct FlakySource {
    lists: Vec<TrackList>,
    failing: AtomicBool,
}

#[async_trait]
impl TrackListSource for FlakySource {
    async fn track_lists(&self) -> cadenza_core::Result<Vec<TrackList>> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(cadenza_core::Error::InvalidData(
                "provider unavailable".to_string(),
            ));
        }
        Ok(self.lists.clone())
    }
}

/// Blocks its first caller until released, to observe the service
/// mid-rebuild.
#[derive(Debug)]
struct GatedSource {
    gate: Mutex<Option<oneshot::Receiver<()>>>,
    lists: Vec<TrackList>,
    calls: AtomicUsize,
}

impl GatedSource {
    fn new(gate: oneshot::Receiver<()>, lists: Vec<TrackList>) -> Self {
        Self {
            gate: Mutex::new(Some(gate)),
            lists,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl TrackListSource for GatedSource {
    async fn track_lists(&self) -> cadenza_core::Result<Vec<TrackList>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = self.gate.lock().await.take() {
            if gate.await.is_err() {
                return Err(cadenza_core::Error::InvalidData("gate dropped".to_string()));
            }
        }
        Ok(self.lists.clone())
    }
}

#[tokio::test]
async fn test_rebuild_then_browse_end_to_end() {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(SqliteSnapshotStore::new(temp_dir.path().join("library.db")));
    let service = LibraryService::new(store, static_source(vec![vec![song()]]));

    let counts = service.rebuild().await.unwrap();
    assert_eq!(
        (counts.genres, counts.artists, counts.albums, counts.tracks, counts.items),
        (1, 1, 1, 1, 1)
    );
    assert_eq!(counts.indexes, 5);
    assert_eq!(service.state().await, LibraryState::Ready);

    let tracks = service
        .browse("index:Tracks by Name", None, None, None)
        .await
        .unwrap();
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].values["name"], "Song");
    assert_eq!(tracks[0].values["album"], "Album1");
    assert_eq!(tracks[0].values["artists"], "Artist1");
    assert_eq!(tracks[0].values.len(), 3);

    let name = service
        .resolve(Some(&tracks[0].id), "parents:#0:parents:#0:parents:#0:name")
        .await
        .unwrap();
    assert_eq!(name.as_text(), Some("Rock"));
}

#[tokio::test]
async fn test_snapshot_survives_restart() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("library.db");

    let first = LibraryService::new(
        Arc::new(SqliteSnapshotStore::new(&path)),
        static_source(vec![vec![song()]]),
    );
    first.rebuild().await.unwrap();
    let before = first.browse("", None, None, None).await.unwrap();

    let second = LibraryService::new(
        Arc::new(SqliteSnapshotStore::new(&path)),
        static_source(Vec::new()),
    );
    let counts = second.load().await.unwrap();
    assert_eq!(counts, first.catalog().await.counts());
    assert_eq!(second.catalog().await.as_ref(), first.catalog().await.as_ref());
    assert!(second.catalog().await.built_at().is_some());

    let after = second.browse("", None, None, None).await.unwrap();
    assert_eq!(before, after);
    let albums = second
        .browse("index:Albums by Name", None, None, None)
        .await
        .unwrap();
    assert_eq!(albums[0].values["artists"], "Artist1");
}

#[tokio::test]
async fn test_browse_before_load_is_rejected() {
    let service = LibraryService::new(
        Arc::new(MemorySnapshotStore::new()),
        static_source(Vec::new()),
    );
    assert_eq!(service.state().await, LibraryState::Unloaded);

    let err = service.browse("", None, None, None).await.unwrap_err();
    match err {
        LibraryError::NotReady(reason) => assert_eq!(reason, "library not yet loaded"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_load_without_snapshot_fails_and_releases_handle() {
    let store = MemorySnapshotStore::new();
    let service = LibraryService::new(Arc::new(store.clone()), static_source(Vec::new()));

    let err = service.load().await.unwrap_err();
    assert!(matches!(err, LibraryError::Load(_)));
    assert_eq!(service.state().await, LibraryState::Failed);
    assert_eq!(store.open_handles(), 0);
    assert!(service
        .browse("", None, None, None)
        .await
        .unwrap_err()
        .is_not_ready());
}

#[tokio::test]
async fn test_load_of_corrupt_snapshot_fails() {
    let store = MemorySnapshotStore::new();
    store.insert("library", "{not json");
    let service = LibraryService::new(Arc::new(store.clone()), static_source(Vec::new()));

    assert!(matches!(service.load().await, Err(LibraryError::Load(_))));
    assert_eq!(store.open_handles(), 0);
}

#[tokio::test]
async fn test_persistence_failure_keeps_previous_catalog() {
    let store = MemorySnapshotStore::new().read_only();
    let service = LibraryService::new(Arc::new(store.clone()), static_source(vec![vec![song()]]));

    let err = service.rebuild().await.unwrap_err();
    assert!(matches!(err, LibraryError::Persistence(_)));
    assert_eq!(store.open_handles(), 0);
    assert!(service.catalog().await.is_empty());
    assert_eq!(service.state().await, LibraryState::Failed);
    assert!(matches!(
        service.readiness().await.peek(),
        Some(Readiness::Rejected(_))
    ));
}

#[tokio::test]
async fn test_failed_rebuild_keeps_last_good_catalog() {
    let source = Arc::new(FlakySource {
        lists: vec![vec![song()]],
        failing: AtomicBool::new(false),
    });
    let store = MemorySnapshotStore::new();
    let service = LibraryService::new(Arc::new(store.clone()), source.clone());

    let good = service.rebuild().await.unwrap();
    source.failing.store(true, Ordering::SeqCst);

    let err = service.rebuild().await.unwrap_err();
    assert!(matches!(err, LibraryError::Rebuild(_)));
    assert_eq!(service.catalog().await.counts(), good);
    assert_eq!(store.open_handles(), 0);

    let err = service.browse("", None, None, None).await.unwrap_err();
    assert!(err.to_string().contains("provider unavailable"));
}

#[tokio::test]
async fn test_stale_signal_is_not_updated() {
    let service = LibraryService::new(
        Arc::new(MemorySnapshotStore::new()),
        static_source(vec![vec![song()]]),
    );
    let stale = service.readiness().await;

    service.rebuild().await.unwrap();

    assert!(matches!(stale.wait().await, Readiness::Rejected(_)));
    assert_eq!(service.readiness().await.wait().await, Readiness::Ready);
}

#[tokio::test]
async fn test_browse_waits_for_rebuild() {
    let (release, gate) = oneshot::channel();
    let source = Arc::new(GatedSource::new(gate, vec![vec![song()]]));
    let service = Arc::new(LibraryService::new(
        Arc::new(MemorySnapshotStore::new()),
        source,
    ));

    let rebuild = tokio::spawn({
        let service = Arc::clone(&service);
        async move { service.rebuild().await }
    });
    while service.state().await != LibraryState::Rebuilding {
        tokio::task::yield_now().await;
    }

    let browse = tokio::spawn({
        let service = Arc::clone(&service);
        async move {
            service
                .browse("index:Genres by Name", None, Some(10), Some(0))
                .await
        }
    });
    tokio::task::yield_now().await;
    assert!(!browse.is_finished());

    release.send(()).unwrap();
    rebuild.await.unwrap().unwrap();
    let genres = browse.await.unwrap().unwrap();
    assert_eq!(genres.len(), 1);
    assert_eq!(genres[0].values["name"], "Rock");
}

#[tokio::test]
async fn test_load_waits_for_running_rebuild() {
    let (release, gate) = oneshot::channel();
    let source = Arc::new(GatedSource::new(gate, vec![vec![song()]]));
    let store = MemorySnapshotStore::new();
    let service = Arc::new(LibraryService::new(
        Arc::new(store.clone()),
        source.clone(),
    ));

    let rebuild = tokio::spawn({
        let service = Arc::clone(&service);
        async move { service.rebuild().await }
    });
    while service.state().await != LibraryState::Rebuilding {
        tokio::task::yield_now().await;
    }
    let pending = service.readiness().await;

    let load = tokio::spawn({
        let service = Arc::clone(&service);
        async move { service.load().await }
    });
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    assert!(!load.is_finished());
    assert_eq!(service.state().await, LibraryState::Rebuilding);
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    assert_eq!(service.readiness().await.peek(), None);
    assert_eq!(pending.peek(), None);

    release.send(()).unwrap();
    let rebuilt = rebuild.await.unwrap().unwrap();
    // The load only succeeds if it ran after the rebuild saved a snapshot.
    let loaded = load.await.unwrap().unwrap();
    assert_eq!(loaded, rebuilt);
    assert_eq!(pending.wait().await, Readiness::Ready);
    assert_eq!(service.state().await, LibraryState::Ready);
    assert_eq!(store.open_handles(), 0);
}

#[tokio::test]
async fn test_cancelled_rebuild_marks_library_failed() {
    let (release, gate) = oneshot::channel::<()>();
    let source = Arc::new(GatedSource::new(gate, vec![vec![song()]]));
    let store = MemorySnapshotStore::new();
    let service = Arc::new(LibraryService::new(Arc::new(store.clone()), source));

    let rebuild = tokio::spawn({
        let service = Arc::clone(&service);
        async move { service.rebuild().await }
    });
    while service.state().await != LibraryState::Rebuilding {
        tokio::task::yield_now().await;
    }
    let pending = service.readiness().await;

    rebuild.abort();
    assert!(rebuild.await.unwrap_err().is_cancelled());
    drop(release);

    assert_eq!(service.state().await, LibraryState::Failed);
    assert!(matches!(pending.wait().await, Readiness::Rejected(_)));
    assert!(store.get("library").is_none());
    assert!(service
        .browse("", None, None, None)
        .await
        .unwrap_err()
        .is_not_ready());

    // The lifecycle lock was released, so a later rebuild still runs.
    service.rebuild().await.unwrap();
    assert_eq!(service.state().await, LibraryState::Ready);
}

#[tokio::test]
async fn test_navigation_errors_leave_library_ready() {
    let service = LibraryService::new(
        Arc::new(MemorySnapshotStore::new()),
        static_source(vec![vec![song()]]),
    );
    service.rebuild().await.unwrap();

    let err = service
        .browse("index:Missing", None, None, None)
        .await
        .unwrap_err();
    assert!(err.is_navigation());
    let err = service.resolve(None, "track:nope:name").await.unwrap_err();
    assert!(err.is_navigation());

    assert_eq!(service.state().await, LibraryState::Ready);
    assert!(service.browse("", None, None, None).await.is_ok());
}

#[tokio::test]
async fn test_rebuild_from_directory_of_track_lists() {
    let temp_dir = TempDir::new().unwrap();
    let lists_dir = temp_dir.path().join("tracklists");
    std::fs::create_dir_all(&lists_dir).unwrap();
    std::fs::write(
        lists_dir.join("mpd.json"),
        serde_json::to_string(&vec![song()]).unwrap(),
    )
    .unwrap();
    std::fs::write(
        lists_dir.join("spotify.json"),
        serde_json::to_string(&vec![TrackRecord::new("s2", "u2")
            .with_title("Song")
            .with_album("Album1")
            .with_artist("Artist1")])
        .unwrap(),
    )
    .unwrap();

    let service = LibraryService::new(
        Arc::new(SqliteSnapshotStore::new(temp_dir.path().join("library.db"))),
        Arc::new(DirectoryTrackListSource::new(lists_dir)),
    );
    let counts = service.rebuild().await.unwrap();
    assert_eq!((counts.tracks, counts.items), (1, 2));

    let tracks = service
        .browse("index:Tracks by Name", None, None, None)
        .await
        .unwrap();
    let versions = service
        .browse(&tracks[0].id, None, None, None)
        .await
        .unwrap();
    let services: Vec<&str> = versions
        .iter()
        .map(|v| v.values["service"].as_str())
        .collect();
    assert_eq!(services, vec!["s1", "s2"]);
}
