// Explicit session state replacing process-wide globals.
//
// A `Snapshot` is everything one run resolves against. `SharedSnapshot`
// lets a long-lived process serve many readers while a refresh builds a new
// snapshot off to the side and swaps it in; readers holding the old `Arc`
// keep a consistent view until they drop it.

use parking_lot::RwLock;
use std::sync::Arc;
use tracing::info;

use crate::entity::{Entity, EntityKind};
use crate::ingest::MappingRecord;
use crate::linker::{LinkedRecord, Linker};
use crate::scrape::ScrapedPlayer;
use crate::store::ReferenceStore;

/// Reference tables, match mappings, and scraped stats for one session.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub store: ReferenceStore,
    pub mappings: Vec<MappingRecord>,
    pub scraped: Vec<ScrapedPlayer>,
}

impl Snapshot {
    pub fn new(store: ReferenceStore, mappings: Vec<MappingRecord>, scraped: Vec<ScrapedPlayer>) -> Self {
        Self {
            store,
            mappings,
            scraped,
        }
    }

    /// Link this snapshot's mappings against its own store.
    pub fn link(&self, linker: &Linker) -> Vec<LinkedRecord> {
        linker.link(&self.mappings, &self.store)
    }

    /// Scraped rows as generic records, for query resolution.
    pub fn scraped_entities(&self) -> Vec<Entity> {
        self.scraped.iter().map(ScrapedPlayer::to_entity).collect()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} players, {} teams, {} tournaments, {} leagues, {} mappings, {} scraped",
            self.store.len(EntityKind::Player),
            self.store.len(EntityKind::Team),
            self.store.len(EntityKind::Tournament),
            self.store.len(EntityKind::League),
            self.mappings.len(),
            self.scraped.len(),
        )
    }
}

/// Read-mostly holder for the current snapshot with swap-on-refresh.
#[derive(Debug, Default)]
pub struct SharedSnapshot {
    current: RwLock<Arc<Snapshot>>,
}

impl SharedSnapshot {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// A stable handle to the current snapshot. The lock is held only long
    /// enough to clone the `Arc`.
    pub fn current(&self) -> Arc<Snapshot> {
        Arc::clone(&self.current.read())
    }

    /// Install a freshly built snapshot, returning the one it replaced.
    pub fn replace(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let next = Arc::new(snapshot);
        info!(summary = %next.summary(), "installing refreshed snapshot");
        std::mem::replace(&mut *self.current.write(), next)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
