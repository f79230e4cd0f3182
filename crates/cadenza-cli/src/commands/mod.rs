pub mod browse;
pub mod config;
pub mod rebuild;
pub mod resolve;
pub mod status;

use std::path::Path;
use std::sync::Arc;

use cadenza_core::schema::SqliteSnapshotStore;
use cadenza_library::{Config, DirectoryTrackListSource, LibraryService};

pub use browse::{run_browse, BrowseRequest};
pub use rebuild::run_rebuild;
pub use resolve::run_resolve;
pub use status::show_status;

/// A service over the configured snapshot, reading track lists from
/// `tracklists`.
fn open_service(config: &Config, tracklists: &Path) -> LibraryService {
    LibraryService::new(
        Arc::new(SqliteSnapshotStore::new(&config.snapshot_path)),
        Arc::new(DirectoryTrackListSource::new(tracklists.to_path_buf())),
    )
}

/// A service with the persisted snapshot loaded.
async fn loaded_service(config: &Config) -> anyhow::Result<LibraryService> {
    let service = open_service(config, &config.tracklists_dir);
    service.load().await.map_err(|e| {
        anyhow::anyhow!(
            "{e}\n\nRun `cadenza rebuild` to build the catalog from your track lists"
        )
    })?;
    Ok(service)
}
