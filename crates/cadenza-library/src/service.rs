//! The library service: load, rebuild, and browse cycles over one catalog.

use chrono::Utc;
use std::fmt;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use tokio::sync::{Mutex, RwLock};

use cadenza_core::model::{EntityRef, Value};
use cadenza_core::schema::{SnapshotHandle, SnapshotStore};
use cadenza_core::{
    Catalog, CatalogBuilder, Counts, IndexDefinition, IndexEntry, NavigationError, Navigator,
    Start,
};

use crate::browse;
use crate::error::{LibraryError, LibraryResult};
use crate::signal::{self, Readiness, ReadinessResolver, ReadinessSignal};
use crate::source::TrackListSource;

/// Lifecycle of the service's catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibraryState {
    Unloaded,
    Loading,
    Ready,
    Rebuilding,
    Failed,
}

impl fmt::Display for LibraryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unloaded => "unloaded",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Rebuilding => "rebuilding",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Owns the catalog and its snapshot store, and gates queries on the
/// outcome of the latest load or rebuild.
///
/// Loads and rebuilds are serialized. Each builds a complete catalog off to
/// the side and swaps it in only on success, so readers always see a whole
/// catalog.
pub struct LibraryService {
    store: Arc<dyn SnapshotStore>,
    source: Arc<dyn TrackListSource>,
    definitions: Vec<IndexDefinition>,
    lifecycle: Mutex<()>,
    catalog: RwLock<Arc<Catalog>>,
    signal: RwLock<ReadinessSignal>,
    state: StdMutex<LibraryState>,
}

impl fmt::Debug for LibraryService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LibraryService")
            .field("store", &self.store)
            .field("source", &self.source)
            .field("definitions", &self.definitions.len())
            .finish_non_exhaustive()
    }
}

impl LibraryService {
    pub fn new(store: Arc<dyn SnapshotStore>, source: Arc<dyn TrackListSource>) -> Self {
        Self {
            store,
            source,
            definitions: IndexDefinition::predefined(),
            lifecycle: Mutex::new(()),
            catalog: RwLock::new(Arc::new(Catalog::new())),
            signal: RwLock::new(ReadinessSignal::rejected("library not yet loaded")),
            state: StdMutex::new(LibraryState::Unloaded),
        }
    }

    /// Replace the indexes built on every rebuild.
    #[must_use]
    pub fn with_definitions(mut self, definitions: Vec<IndexDefinition>) -> Self {
        self.definitions = definitions;
        self
    }

    pub async fn state(&self) -> LibraryState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The signal for the latest load or rebuild.
    pub async fn readiness(&self) -> ReadinessSignal {
        self.signal.read().await.clone()
    }

    /// The current catalog. Empty until a load or rebuild succeeds.
    pub async fn catalog(&self) -> Arc<Catalog> {
        Arc::clone(&*self.catalog.read().await)
    }

    /// Replace the catalog with the persisted snapshot.
    pub async fn load(&self) -> LibraryResult<Counts> {
        let _guard = self.lifecycle.lock().await;
        let cycle = self.begin(LibraryState::Loading).await;
        log::info!("Loading library snapshot");
        let outcome = self.read_snapshot();
        let catalog = self.finish(cycle, outcome).await?;
        Ok(catalog.counts())
    }

    /// Rebuild the catalog from every track list, build the indexes, and
    /// persist the result as one snapshot.
    pub async fn rebuild(&self) -> LibraryResult<Counts> {
        let _guard = self.lifecycle.lock().await;
        let cycle = self.begin(LibraryState::Rebuilding).await;
        log::info!("Rebuilding library");
        let outcome = self.rebuild_and_persist().await;
        let catalog = self.finish(cycle, outcome).await?;
        Ok(catalog.counts())
    }

    /// List a browse reference once the library is ready.
    ///
    /// `page_size` and `page_offset` are accepted for API compatibility;
    /// the full listing is always returned.
    pub async fn browse(
        &self,
        reference: &str,
        sort_override: Option<&str>,
        page_size: Option<usize>,
        page_offset: Option<usize>,
    ) -> LibraryResult<Vec<IndexEntry>> {
        log::debug!(
            "Browsing {:?} (sort: {:?}, page size: {:?}, offset: {:?})",
            reference,
            sort_override,
            page_size,
            page_offset
        );
        let catalog = self.ready_catalog().await?;
        browse::browse(&catalog, &self.definitions, reference, sort_override)
    }

    /// Resolve a path against the ready catalog, from the root or from
    /// `start` (a `"<type>:<id>"` reference).
    pub async fn resolve(&self, start: Option<&str>, path: &str) -> LibraryResult<Value> {
        let catalog = self.ready_catalog().await?;
        let start = start
            .map(|text| {
                text.parse::<EntityRef>()
                    .map_err(|_| NavigationError::new(text, "unknown reference", text))
            })
            .transpose()?;
        let navigator = Navigator::new(&catalog);
        let value = match &start {
            Some(reference) => navigator.resolve(Start::At(reference), path)?,
            None => navigator.resolve(Start::Root, path)?,
        };
        Ok(value)
    }

    async fn ready_catalog(&self) -> LibraryResult<Arc<Catalog>> {
        let signal = self.readiness().await;
        match signal.wait().await {
            Readiness::Ready => Ok(self.catalog().await),
            Readiness::Rejected(reason) => {
                log::warn!("Library not ready: {}", reason);
                Err(LibraryError::NotReady(reason))
            }
        }
    }

    /// Install a fresh pending signal and enter `state`.
    async fn begin(&self, state: LibraryState) -> Cycle<'_> {
        let (resolver, signal) = signal::channel();
        *self.signal.write().await = signal;
        set_state(&self.state, state);
        Cycle {
            state: &self.state,
            resolver: Some(resolver),
        }
    }

    /// Swap in a successful catalog or record the failure, settling the
    /// signal either way.
    async fn finish(
        &self,
        mut cycle: Cycle<'_>,
        outcome: LibraryResult<Catalog>,
    ) -> LibraryResult<Arc<Catalog>> {
        match outcome {
            Ok(catalog) => {
                let catalog = Arc::new(catalog);
                log::info!("Library ready ({})", catalog.counts());
                *self.catalog.write().await = Arc::clone(&catalog);
                cycle.settle(LibraryState::Ready, Readiness::Ready);
                Ok(catalog)
            }
            Err(e) => {
                log::error!("Library cycle failed: {}", e);
                cycle.settle(LibraryState::Failed, Readiness::Rejected(e.to_string()));
                Err(e)
            }
        }
    }

    fn read_snapshot(&self) -> LibraryResult<Catalog> {
        let handle = self.store.open().map_err(LibraryError::Persistence)?;
        let loaded = Catalog::load_from(&*handle).map_err(LibraryError::Load);
        let closed = handle.close().map_err(LibraryError::Persistence);
        let catalog = loaded?;
        closed?;
        Ok(catalog)
    }

    async fn rebuild_and_persist(&self) -> LibraryResult<Catalog> {
        let mut handle = self.store.open().map_err(LibraryError::Persistence)?;
        let built = self.build_and_save(&mut *handle).await;
        let closed = handle.close().map_err(LibraryError::Persistence);
        let catalog = built?;
        closed?;
        Ok(catalog)
    }

    async fn build_and_save(&self, handle: &mut dyn SnapshotHandle) -> LibraryResult<Catalog> {
        let track_lists = self
            .source
            .track_lists()
            .await
            .map_err(LibraryError::Rebuild)?;
        log::info!("Populating library from {} track lists", track_lists.len());

        let mut catalog = Catalog::new();
        let mut builder = CatalogBuilder::new(&mut catalog);
        for (i, list) in track_lists.iter().enumerate() {
            let ingested = builder
                .ingest_track_list(list)
                .map_err(LibraryError::Rebuild)?;
            log::debug!("Ingested track list {} ({} records)", i, ingested);
        }
        log::info!("Generating {} indexes", self.definitions.len());
        catalog
            .rebuild_indexes(&self.definitions)
            .map_err(LibraryError::Rebuild)?;
        catalog.mark_built(Utc::now());

        log::info!("Storing library snapshot");
        catalog
            .save_to(handle)
            .map_err(LibraryError::Persistence)?;
        Ok(catalog)
    }
}

fn set_state(cell: &StdMutex<LibraryState>, state: LibraryState) {
    *cell.lock().unwrap_or_else(PoisonError::into_inner) = state;
}

/// One in-flight load or rebuild. Dropping it unsettled, as when the
/// calling future is cancelled, marks the library failed and abandons the
/// readiness signal.
struct Cycle<'a> {
    state: &'a StdMutex<LibraryState>,
    resolver: Option<ReadinessResolver>,
}

impl Cycle<'_> {
    fn settle(&mut self, state: LibraryState, readiness: Readiness) {
        set_state(self.state, state);
        if let Some(resolver) = self.resolver.take() {
            resolver.settle(readiness);
        }
    }
}

impl Drop for Cycle<'_> {
    fn drop(&mut self) {
        if self.resolver.is_some() {
            log::warn!("Library cycle cancelled before it settled");
            set_state(self.state, LibraryState::Failed);
        }
    }
}
