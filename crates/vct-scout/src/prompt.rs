// Prompt text for the team-builder chat model.
//
// Turns linked matches, scraped player stats, and the resolved focus entity
// into one compact prompt. Delivering it to a hosted model is left to the
// caller.

use serde_json::Value;
use std::collections::BTreeMap;

use vct_core::{Entity, LinkedRecord, QueryOutcome, ScrapedPlayer};

use crate::config::PromptConfig;

const NOT_AVAILABLE: &str = "N/A";

// ---------------------------------------------------------------------------
// System prompt
// ---------------------------------------------------------------------------

pub fn system_prompt() -> String {
    "You are a chatbot that helps analyze player stats and build teams for the \
     Valorant Champions Tour (VCT) based on game data.\n\
     Use only the statistics and match records provided below. If the data does \
     not cover a player or team, say so instead of guessing."
        .to_string()
}

// ---------------------------------------------------------------------------
// Context blocks
// ---------------------------------------------------------------------------

/// One line per linked match, at most `limit` lines.
pub fn format_linked_records(records: &[LinkedRecord], limit: usize) -> String {
    let mut s = String::new();
    for record in records.iter().take(limit) {
        s.push_str(&format!(
            "- Platform Game ID: {}, Teams: {}, Participants: {}, Tournament: {}, League: {}\n",
            record.platform_game_id,
            name_list(&record.teams),
            name_list(&record.participants),
            record.tournament_info.display_name().unwrap_or(NOT_AVAILABLE),
            record.league_info.display_name().unwrap_or(NOT_AVAILABLE),
        ));
    }
    if records.len() > limit {
        s.push_str(&format!("- ... {} more matches not shown\n", records.len() - limit));
    }
    s
}

/// One line per scraped player, at most `limit` lines.
pub fn format_player_stats(players: &[ScrapedPlayer], limit: usize) -> String {
    let mut s = String::new();
    for p in players.iter().take(limit) {
        s.push_str(&format!(
            "- Player: {}, Org: {}, Agents: {}, Roles: {}, Rounds Played: {}, Rating: {}, \
             ACS: {}, Avg Dmg per round: {}, Headshot %: {}, Clutch %: {}\n",
            p.player,
            p.org,
            p.agents.join("/"),
            p.roles.join("/"),
            p.rounds_played,
            p.rating,
            p.average_combat_score,
            p.average_damage_per_round,
            p.headshot_percentage,
            p.clutch_success_percentage,
        ));
    }
    s
}

/// `field: value` pairs of a record on one line, in field order.
pub fn format_entity(entity: &Entity) -> String {
    entity
        .as_map()
        .iter()
        .map(|(field, value)| match value {
            Value::String(text) => format!("{field}: {text}"),
            other => format!("{field}: {other}"),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn name_list(entities: &BTreeMap<String, Entity>) -> String {
    if entities.is_empty() {
        return "none".to_string();
    }
    entities
        .iter()
        .map(|(key, entity)| entity.display_name().unwrap_or(key).to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

// ---------------------------------------------------------------------------
// Full prompt
// ---------------------------------------------------------------------------

/// Assemble the full prompt for one user question.
pub fn build_prompt(
    question: &str,
    focus: &QueryOutcome<'_>,
    linked: &[LinkedRecord],
    players: &[ScrapedPlayer],
    limits: &PromptConfig,
) -> String {
    let mut prompt = String::with_capacity(2048);

    prompt.push_str(&system_prompt());
    prompt.push_str("\n\n## QUESTION\n");
    prompt.push_str(question.trim());
    prompt.push_str("\n\n");

    match focus {
        QueryOutcome::Found { entity, .. } => {
            prompt.push_str("## FOCUS\n");
            prompt.push_str(&format_entity(entity));
            prompt.push_str("\n\n");
        }
        QueryOutcome::NotFound { .. } => {
            prompt.push_str("## FOCUS\n");
            prompt.push_str(&focus.to_string());
            prompt.push_str("\n\n");
        }
        QueryOutcome::NoEntityImplied => {}
    }

    if !players.is_empty() {
        prompt.push_str("## PLAYER STATISTICS\n");
        prompt.push_str(&format_player_stats(players, limits.max_players));
        prompt.push('\n');
    }

    if !linked.is_empty() {
        prompt.push_str("## TOURNAMENT INFORMATION\n");
        prompt.push_str(&format_linked_records(linked, limits.max_matches));
    }

    prompt
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
