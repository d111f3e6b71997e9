// Generic reference records and identifier normalization.
//
// Source tables (players, teams, tournaments, leagues) arrive as loosely
// shaped JSON objects, so an `Entity` is just the object itself. The only
// structure imposed is which field carries the unique key for each kind.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

// ---------------------------------------------------------------------------
// EntityKind
// ---------------------------------------------------------------------------

/// The four reference tables held by a `ReferenceStore`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Player,
    Team,
    Tournament,
    League,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Player,
        EntityKind::Team,
        EntityKind::Tournament,
        EntityKind::League,
    ];

    /// Fields consulted, in order, for a record's unique key.
    pub fn key_fields(&self) -> &'static [&'static str] {
        match self {
            EntityKind::Player | EntityKind::Team => &["id"],
            EntityKind::Tournament => &["id", "tournamentId"],
            EntityKind::League => &["league_id"],
        }
    }

    /// Plural table name, also used as the source file-name prefix.
    pub fn table_name(&self) -> &'static str {
        match self {
            EntityKind::Player => "players",
            EntityKind::Team => "teams",
            EntityKind::Tournament => "tournaments",
            EntityKind::League => "leagues",
        }
    }

    pub fn from_table_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.table_name() == name)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EntityKind::Player => "player",
            EntityKind::Team => "team",
            EntityKind::Tournament => "tournament",
            EntityKind::League => "league",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Key normalization
// ---------------------------------------------------------------------------

/// Canonical form for identifiers: surrounding whitespace removed, lowercased.
pub fn normalize_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Read an identifier out of a JSON value. Source files mix string and
/// integer ids, so both are accepted; anything else is not an id.
pub(crate) fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// Field names that may hold a human-readable name, in lookup order.
const NAME_FIELDS: &[&str] = &["name", "handle", "player"];

/// A single reference record: field name to JSON value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entity(Map<String, Value>);

impl Entity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a JSON value. Returns `None` unless the value is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Builder-style field insertion, mostly for fixtures.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// The raw (un-normalized) key for this record under `kind`, taken from
    /// the first key field that holds a non-blank string or number.
    pub fn key(&self, kind: EntityKind) -> Option<String> {
        kind.key_fields()
            .iter()
            .filter_map(|field| self.0.get(*field).and_then(id_string))
            .find(|id| !id.trim().is_empty())
    }

    /// Human-readable name, if the record carries one.
    pub fn display_name(&self) -> Option<&str> {
        NAME_FIELDS
            .iter()
            .filter_map(|field| self.get_str(field))
            .map(str::trim)
            .find(|name| !name.is_empty())
    }
}

impl From<Map<String, Value>> for Entity {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
