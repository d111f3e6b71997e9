// Linker: joins mapping records to the reference tables.
//
// Each `MappingRecord` becomes exactly one `LinkedRecord`, in input order.
// Team and participant ids are resolved by normalized exact lookup first,
// then (when the policy allows it for that kind) by fuzzy fallback over all
// known keys of the table. Unresolved references are dropped, never stored
// as placeholders. Tournament and league info come from direct lookups only.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::entity::{id_string, normalize_key, Entity, EntityKind};
use crate::fuzzy::FuzzyResolver;
use crate::ingest::MappingRecord;
use crate::similarity::DEFAULT_THRESHOLD;
use crate::store::ReferenceStore;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// When to fall back to fuzzy matching and how strict to be.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkPolicy {
    /// Minimum fuzzy score on the 0-100 scale. Inclusive: a candidate
    /// scoring exactly `threshold` is accepted (`score >= threshold`), so
    /// the default of 80 accepts a score of 80.0 rather than requiring a
    /// score above it.
    pub threshold: f64,
    pub fuzzy_teams: bool,
    pub fuzzy_participants: bool,
}

impl Default for LinkPolicy {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            fuzzy_teams: true,
            fuzzy_participants: true,
        }
    }
}

impl LinkPolicy {
    fn fuzzy_enabled(&self, kind: EntityKind) -> bool {
        match kind {
            EntityKind::Team => self.fuzzy_teams,
            EntityKind::Player => self.fuzzy_participants,
            EntityKind::Tournament | EntityKind::League => false,
        }
    }
}

/// Denormalized view of one match.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedRecord {
    pub platform_game_id: String,
    pub tournament_id: String,
    /// Resolved team key to team record.
    pub teams: BTreeMap<String, Entity>,
    /// Resolved player key to player record.
    pub participants: BTreeMap<String, Entity>,
    /// Empty when the tournament is unknown.
    pub tournament_info: Entity,
    /// Empty when the tournament or its league is unknown.
    pub league_info: Entity,
}

/// Resolution counters for one linking pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStats {
    pub records: usize,
    pub exact: usize,
    pub fuzzy: usize,
    pub unresolved: usize,
}

// ---------------------------------------------------------------------------
// Linker
// ---------------------------------------------------------------------------

/// Stateless apart from its policy and scorer; safe to share across callers
/// reading the same store snapshot.
#[derive(Debug, Clone, Default)]
pub struct Linker {
    policy: LinkPolicy,
    resolver: FuzzyResolver,
}

impl Linker {
    pub fn new(policy: LinkPolicy, resolver: FuzzyResolver) -> Self {
        Self { policy, resolver }
    }

    pub fn policy(&self) -> &LinkPolicy {
        &self.policy
    }

    /// Link every record against `store`. Output order matches input order.
    pub fn link(&self, records: &[MappingRecord], store: &ReferenceStore) -> Vec<LinkedRecord> {
        self.link_with_stats(records, store).0
    }

    /// `link`, also returning how each reference was resolved.
    pub fn link_with_stats(
        &self,
        records: &[MappingRecord],
        store: &ReferenceStore,
    ) -> (Vec<LinkedRecord>, LinkStats) {
        let mut stats = LinkStats {
            records: records.len(),
            ..LinkStats::default()
        };

        let linked: Vec<LinkedRecord> = records
            .iter()
            .map(|record| self.link_one(record, store, &mut stats))
            .collect();

        info!(
            records = stats.records,
            exact = stats.exact,
            fuzzy = stats.fuzzy,
            unresolved = stats.unresolved,
            "linked mapping records"
        );
        (linked, stats)
    }

    fn link_one(
        &self,
        record: &MappingRecord,
        store: &ReferenceStore,
        stats: &mut LinkStats,
    ) -> LinkedRecord {
        let teams = self.resolve_all(EntityKind::Team, record.team_mapping.values(), store, stats);
        let participants = self.resolve_all(
            EntityKind::Player,
            record.participant_mapping.values(),
            store,
            stats,
        );

        let tournament_info = store
            .get(EntityKind::Tournament, &record.tournament_id)
            .cloned()
            .unwrap_or_default();

        let league_info = tournament_info
            .get("league_id")
            .and_then(id_string)
            .and_then(|league_id| store.get(EntityKind::League, &league_id))
            .cloned()
            .unwrap_or_default();

        LinkedRecord {
            platform_game_id: record.platform_game_id.clone(),
            tournament_id: record.tournament_id.clone(),
            teams,
            participants,
            tournament_info,
            league_info,
        }
    }

    fn resolve_all<'r>(
        &self,
        kind: EntityKind,
        ids: impl Iterator<Item = &'r String>,
        store: &ReferenceStore,
        stats: &mut LinkStats,
    ) -> BTreeMap<String, Entity> {
        let mut resolved = BTreeMap::new();
        for raw in ids {
            match self.resolve(kind, raw, store, stats) {
                Some((key, entity)) => {
                    resolved.insert(key, entity.clone());
                }
                None => stats.unresolved += 1,
            }
        }
        resolved
    }

    /// Resolve one id to `(store key, entity)`.
    fn resolve<'s>(
        &self,
        kind: EntityKind,
        raw: &str,
        store: &'s ReferenceStore,
        stats: &mut LinkStats,
    ) -> Option<(String, &'s Entity)> {
        let key = normalize_key(raw);
        if key.is_empty() {
            return None;
        }

        if let Some(entity) = store.get_normalized(kind, &key) {
            stats.exact += 1;
            return Some((key, entity));
        }

        if !self.policy.fuzzy_enabled(kind) {
            debug!(%kind, id = %key, "no exact match, fuzzy fallback disabled");
            return None;
        }

        let Some(candidate) = self.resolver.best_match(&key, store.keys(kind)) else {
            debug!(%kind, id = %key, "no exact match and no candidates");
            return None;
        };

        if !candidate.clears(self.policy.threshold) {
            debug!(
                %kind,
                id = %key,
                best = candidate.key,
                score = candidate.score,
                "fuzzy candidate below threshold"
            );
            return None;
        }

        debug!(
            %kind,
            id = %key,
            matched = candidate.key,
            score = candidate.score,
            "fuzzy-resolved reference"
        );
        stats.fuzzy += 1;
        let entity = store.get_normalized(kind, candidate.key)?;
        Some((candidate.key.to_string(), entity))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
