// Scraped per-player statistics.
//
// The stats site exposes one table row per player; the fetcher (outside this
// crate) turns rows into JSON, wrapped as `{"data": {"status", "segments"}}`.
// Stat cells are kept as text because the site mixes numbers, percentages
// and placeholders.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::entity::Entity;

/// Placeholder for a stat cell the scrape did not provide.
pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("stats source responded with status {0}")]
    Status(u64),

    #[error("unexpected scrape payload: {0}")]
    Shape(String),

    #[error("invalid scrape JSON: {0}")]
    Json(#[from] serde_json::Error),
}

fn not_available() -> String {
    NOT_AVAILABLE.to_string()
}

/// Accept text or numeric cells; anything else becomes the placeholder.
fn stat_cell<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => not_available(),
    })
}

/// One row of the scraped stats table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapedPlayer {
    pub player: String,
    #[serde(default = "not_available", deserialize_with = "stat_cell")]
    pub org: String,
    #[serde(default)]
    pub agents: Vec<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default = "not_available", deserialize_with = "stat_cell")]
    pub rounds_played: String,
    #[serde(default = "not_available", deserialize_with = "stat_cell")]
    pub rating: String,
    #[serde(default = "not_available", deserialize_with = "stat_cell")]
    pub average_combat_score: String,
    #[serde(default = "not_available", deserialize_with = "stat_cell")]
    pub kill_deaths: String,
    #[serde(default = "not_available", deserialize_with = "stat_cell")]
    pub kill_assists_survived_traded: String,
    #[serde(default = "not_available", deserialize_with = "stat_cell")]
    pub average_damage_per_round: String,
    #[serde(default = "not_available", deserialize_with = "stat_cell")]
    pub kills_per_round: String,
    #[serde(default = "not_available", deserialize_with = "stat_cell")]
    pub assists_per_round: String,
    #[serde(default = "not_available", deserialize_with = "stat_cell")]
    pub first_kills_per_round: String,
    #[serde(default = "not_available", deserialize_with = "stat_cell")]
    pub first_deaths_per_round: String,
    #[serde(default = "not_available", deserialize_with = "stat_cell")]
    pub headshot_percentage: String,
    #[serde(default = "not_available", deserialize_with = "stat_cell")]
    pub clutch_success_percentage: String,
}

impl ScrapedPlayer {
    /// View this row as a generic record so the query resolver can search
    /// scraped players and reference players alike.
    pub fn to_entity(&self) -> Entity {
        serde_json::to_value(self)
            .ok()
            .and_then(Entity::from_value)
            .unwrap_or_default()
    }
}

/// Role played by an agent. Unknown agents map to `"Unknown"`.
pub fn agent_role(agent: &str) -> &'static str {
    match agent.trim().to_lowercase().as_str() {
        "brimstone" | "viper" | "omen" | "astra" | "harbor" | "clove" => "Controller",
        "killjoy" | "cypher" | "sage" | "chamber" | "deadlock" | "vyse" => "Sentinel",
        "sova" | "breach" | "skye" | "kayo" | "kay/o" | "fade" | "gekko" => "Initiator",
        "phoenix" | "jett" | "reyna" | "raze" | "yoru" | "neon" | "iso" => "Duelist",
        _ => "Unknown",
    }
}

/// Parse a scrape payload: the `{"data": {"status", "segments"}}` envelope
/// or a bare list of rows. Rows that do not parse are skipped.
pub fn parse_scrape(value: Value) -> Result<Vec<ScrapedPlayer>, ScrapeError> {
    let rows = match value {
        Value::Array(rows) => rows,
        Value::Object(mut obj) => {
            let Some(Value::Object(mut data)) = obj.remove("data") else {
                return Err(ScrapeError::Shape("missing `data` object".into()));
            };
            if let Some(status) = data.get("status").and_then(Value::as_u64) {
                if status != 200 {
                    return Err(ScrapeError::Status(status));
                }
            }
            match data.remove("segments") {
                Some(Value::Array(rows)) => rows,
                _ => return Err(ScrapeError::Shape("missing `segments` list".into())),
            }
        }
        _ => return Err(ScrapeError::Shape("expected an object or a list".into())),
    };

    let mut players = Vec::with_capacity(rows.len());
    for row in rows {
        match serde_json::from_value::<ScrapedPlayer>(row) {
            Ok(mut player) => {
                if player.roles.is_empty() {
                    player.roles = player.agents.iter().map(|a| agent_role(a).to_string()).collect();
                }
                players.push(player);
            }
            Err(e) => warn!("skipping malformed scrape row: {}", e),
        }
    }
    debug!(players = players.len(), "parsed scraped player stats");
    Ok(players)
}

/// `parse_scrape` over raw bytes.
pub fn parse_scrape_slice(bytes: &[u8]) -> Result<Vec<ScrapedPlayer>, ScrapeError> {
    parse_scrape(serde_json::from_slice(bytes)?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_parsed() {
        let players = parse_scrape(json!({
            "data": {
                "status": 200,
                "segments": [{
                    "player": "TenZ",
                    "org": "SEN",
                    "agents": ["jett", "raze"],
                    "roles": ["Duelist", "Duelist"],
                    "rounds_played": "412",
                    "rating": "1.21",
                    "average_combat_score": "245.3",
                    "headshot_percentage": "28%"
                }]
            }
        }))
        .unwrap();
        assert_eq!(players.len(), 1);
        let p = &players[0];
        assert_eq!(p.player, "TenZ");
        assert_eq!(p.rating, "1.21");
        assert_eq!(p.headshot_percentage, "28%");
        assert_eq!(p.clutch_success_percentage, NOT_AVAILABLE);
    }

    #[test]
    fn bare_list_and_numeric_cells() {
        let players = parse_scrape(json!([{"player": "aspas", "rating": 1.3, "org": ""}])).unwrap();
        assert_eq!(players[0].rating, "1.3");
        assert_eq!(players[0].org, NOT_AVAILABLE);
    }

    #[test]
    fn non_ok_status_is_error() {
        let err = parse_scrape(json!({"data": {"status": 503, "segments": []}})).unwrap_err();
        assert!(matches!(err, ScrapeError::Status(503)));
    }

    #[test]
    fn wrong_shape_is_error() {
        assert!(matches!(parse_scrape(json!("x")), Err(ScrapeError::Shape(_))));
        assert!(matches!(parse_scrape(json!({"data": {}})), Err(ScrapeError::Shape(_))));
        assert!(matches!(parse_scrape_slice(b"nope"), Err(ScrapeError::Json(_))));
    }

    #[test]
    fn rows_without_player_skipped() {
        let players = parse_scrape(json!([{"org": "SEN"}, {"player": "zekken"}])).unwrap();
        assert_eq!(players.len(), 1);
        assert_eq!(players[0].player, "zekken");
    }

    #[test]
    fn missing_roles_derived_from_agents() {
        let players = parse_scrape(json!([{"player": "Boaster", "agents": ["astra", "Fade", "mystery"]}])).unwrap();
        assert_eq!(players[0].roles, vec!["Controller", "Initiator", "Unknown"]);
    }

    #[test]
    fn agent_roles() {
        assert_eq!(agent_role("jett"), "Duelist");
        assert_eq!(agent_role("Killjoy"), "Sentinel");
        assert_eq!(agent_role("viper"), "Controller");
        assert_eq!(agent_role("sova"), "Initiator");
        assert_eq!(agent_role("tejo"), "Unknown");
    }

    #[test]
    fn entity_view_has_display_name() {
        let players = parse_scrape(json!([{"player": "TenZ", "org": "SEN"}])).unwrap();
        let entity = players[0].to_entity();
        assert_eq!(entity.display_name(), Some("TenZ"));
        assert_eq!(entity.get_str("org"), Some("SEN"));
    }
}
