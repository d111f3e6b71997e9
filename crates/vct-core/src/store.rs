// In-memory reference tables keyed by normalized identifier.
//
// Tables are `BTreeMap`s so that iterating candidate keys (fuzzy fallback)
// always happens in the same order, which makes tie-breaking reproducible.
// Merge policy: when several sources feed one table, the entry loaded last
// wins on key collision.

use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::entity::{normalize_key, Entity, EntityKind};

/// Four independent lookup tables: players, teams, tournaments, leagues.
#[derive(Debug, Clone, Default)]
pub struct ReferenceStore {
    players: BTreeMap<String, Entity>,
    teams: BTreeMap<String, Entity>,
    tournaments: BTreeMap<String, Entity>,
    leagues: BTreeMap<String, Entity>,
}

impl ReferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self, kind: EntityKind) -> &BTreeMap<String, Entity> {
        match kind {
            EntityKind::Player => &self.players,
            EntityKind::Team => &self.teams,
            EntityKind::Tournament => &self.tournaments,
            EntityKind::League => &self.leagues,
        }
    }

    fn table_mut(&mut self, kind: EntityKind) -> &mut BTreeMap<String, Entity> {
        match kind {
            EntityKind::Player => &mut self.players,
            EntityKind::Team => &mut self.teams,
            EntityKind::Tournament => &mut self.tournaments,
            EntityKind::League => &mut self.leagues,
        }
    }

    /// Insert or overwrite. The key is normalized before storage; the
    /// previous entity under that key, if any, is returned.
    pub fn put(&mut self, kind: EntityKind, key: &str, entity: Entity) -> Option<Entity> {
        let key = normalize_key(key);
        let previous = self.table_mut(kind).insert(key.clone(), entity);
        if previous.is_some() {
            debug!(%kind, key = %key, "overwrote existing reference entry");
        }
        previous
    }

    /// Look up by any spelling of the key; absence is a normal outcome.
    pub fn get(&self, kind: EntityKind, key: &str) -> Option<&Entity> {
        self.table(kind).get(&normalize_key(key))
    }

    /// Look up by an already-normalized key, skipping re-normalization.
    pub(crate) fn get_normalized(&self, kind: EntityKind, key: &str) -> Option<&Entity> {
        self.table(kind).get(key)
    }

    /// Insert a record under the key carried in its own fields. Returns
    /// `false` (and logs) when the record has no usable key.
    pub fn insert_record(&mut self, kind: EntityKind, entity: Entity) -> bool {
        match entity.key(kind) {
            Some(key) => {
                self.put(kind, &key, entity);
                true
            }
            None => {
                warn!(%kind, fields = ?kind.key_fields(), "skipping record without a key");
                false
            }
        }
    }

    /// Merge a source collection into a table. Accepts either a single object
    /// or a list of objects and returns the number of records stored.
    pub fn extend(&mut self, kind: EntityKind, value: Value) -> usize {
        let items = match value {
            Value::Array(items) => items,
            other => vec![other],
        };

        let mut stored = 0;
        for item in items {
            match Entity::from_value(item) {
                Some(entity) => {
                    if self.insert_record(kind, entity) {
                        stored += 1;
                    }
                }
                None => warn!(%kind, "skipping non-object reference entry"),
            }
        }
        stored
    }

    /// Normalized keys of one table, in sorted order.
    pub fn keys(&self, kind: EntityKind) -> impl Iterator<Item = &str> + '_ {
        self.table(kind).keys().map(String::as_str)
    }

    /// Entities of one table, in key order.
    pub fn entities(&self, kind: EntityKind) -> impl Iterator<Item = &Entity> + '_ {
        self.table(kind).values()
    }

    pub fn len(&self, kind: EntityKind) -> usize {
        self.table(kind).len()
    }

    pub fn is_empty(&self) -> bool {
        EntityKind::ALL.iter().all(|k| self.table(*k).is_empty())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
