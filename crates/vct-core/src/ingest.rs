// Mapping ingest: raw per-match descriptors to uniform `MappingRecord`s.
//
// Source files are either a list of match objects or a single object, and
// fields go missing between data versions. Missing fields default rather
// than fail, and repeated ingest calls accumulate so a base file and its
// incremental `_v2` files end up in one ordered sequence.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, warn};

use crate::entity::id_string;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("invalid mapping JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// One played match: which teams and participants filled which slots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingRecord {
    pub platform_game_id: String,
    pub tournament_id: String,
    /// Slot label to team id.
    pub team_mapping: BTreeMap<String, String>,
    /// Slot label to participant (player) id.
    pub participant_mapping: BTreeMap<String, String>,
}

impl MappingRecord {
    /// Build a record from one raw JSON object, defaulting missing fields.
    pub fn from_object(obj: &Map<String, Value>) -> Self {
        Self {
            platform_game_id: obj.get("platformGameId").and_then(id_string).unwrap_or_default(),
            tournament_id: obj.get("tournamentId").and_then(id_string).unwrap_or_default(),
            team_mapping: slot_mapping(obj.get("teamMapping")),
            participant_mapping: slot_mapping(obj.get("participantMapping")),
        }
    }
}

/// Read a slot → id object. Anything that is not an object yields an empty
/// mapping; slots whose id is null or not a scalar are dropped.
fn slot_mapping(value: Option<&Value>) -> BTreeMap<String, String> {
    let Some(Value::Object(map)) = value else {
        return BTreeMap::new();
    };
    map.iter()
        .filter_map(|(slot, id)| id_string(id).map(|id| (slot.clone(), id)))
        .collect()
}

/// Accumulates mapping records across any number of source payloads.
#[derive(Debug, Clone, Default)]
pub struct MappingIngest {
    records: Vec<MappingRecord>,
}

impl MappingIngest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the records described by an already-parsed payload (list or
    /// single object). Returns how many records were added.
    pub fn ingest_value(&mut self, value: Value) -> usize {
        let items = match value {
            Value::Array(items) => items,
            other => vec![other],
        };

        let before = self.records.len();
        for item in &items {
            match item {
                Value::Object(obj) => self.records.push(MappingRecord::from_object(obj)),
                _ => warn!("skipping non-object mapping entry"),
            }
        }
        let added = self.records.len() - before;
        debug!(added, total = self.records.len(), "ingested mapping records");
        added
    }

    /// Parse raw bytes and append. A parse failure leaves prior records intact.
    pub fn ingest_slice(&mut self, bytes: &[u8]) -> Result<usize, IngestError> {
        let value: Value = serde_json::from_slice(bytes)?;
        Ok(self.ingest_value(value))
    }

    pub fn records(&self) -> &[MappingRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<MappingRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
