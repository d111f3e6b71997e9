// Query-time name resolution for free-text chat questions.
//
// A name fragment is pulled out of the question ("who is tenz?" -> "tenz"),
// then matched against candidate display names: case-insensitive equality
// first, then partial (containment-tolerant) scoring with the shared scorer
// and threshold. A miss is reported as `NotFound`, never as an empty record.

use std::fmt;

use crate::entity::{Entity, EntityKind};
use crate::fuzzy::FuzzyResolver;
use crate::similarity::DEFAULT_THRESHOLD;
use crate::store::ReferenceStore;
use tracing::debug;

// ---------------------------------------------------------------------------
// Name extraction
// ---------------------------------------------------------------------------

/// Which table a question seems to be about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetHint {
    Player,
    Team,
    Any,
}

/// The name fragment a question refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTarget {
    pub name: String,
    pub hint: TargetHint,
}

const KEYWORDS: &[(&str, TargetHint)] = &[
    ("who is", TargetHint::Any),
    ("who's", TargetHint::Any),
    ("tell me about", TargetHint::Any),
    ("stats for", TargetHint::Any),
    ("player", TargetHint::Player),
    ("team", TargetHint::Team),
];

const ARTICLES: &[&str] = &["the", "a", "an"];

/// Find the earliest recognised keyword and take the first token after it
/// that is neither an article nor another keyword.
/// Returns `None` when the text implies no particular entity.
pub fn extract_target(text: &str) -> Option<QueryTarget> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() || matches!(c, '\'' | '_' | '-') {
                c
            } else {
                ' '
            }
        })
        .collect();
    let tokens: Vec<&str> = cleaned.split_whitespace().collect();

    let mut earliest: Option<(usize, usize, TargetHint)> = None;
    for (phrase, hint) in KEYWORDS {
        let words: Vec<&str> = phrase.split_whitespace().collect();
        let Some(pos) = tokens
            .windows(words.len())
            .position(|w| w == words.as_slice())
        else {
            continue;
        };
        if earliest.map_or(true, |(p, _, _)| pos < p) {
            earliest = Some((pos, words.len(), *hint));
        }
    }

    let (pos, len, mut hint) = earliest?;
    for token in &tokens[pos + len..] {
        if ARTICLES.contains(token) {
            continue;
        }
        // "who is team sentinels": a one-word keyword narrows the hint.
        if let Some(narrowed) = keyword_hint(token) {
            hint = narrowed;
            continue;
        }
        return Some(QueryTarget {
            name: (*token).to_string(),
            hint,
        });
    }
    None
}

fn keyword_hint(token: &str) -> Option<TargetHint> {
    KEYWORDS
        .iter()
        .find(|(phrase, _)| *phrase == token)
        .map(|(_, hint)| *hint)
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchKind {
    Exact,
    Fuzzy { score: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome<'a> {
    Found {
        entity: &'a Entity,
        match_kind: MatchKind,
    },
    /// A name was asked about but nothing cleared the threshold.
    NotFound { name: String },
    /// The question did not point at any entity.
    NoEntityImplied,
}

impl<'a> QueryOutcome<'a> {
    pub fn entity(&self) -> Option<&'a Entity> {
        match self {
            QueryOutcome::Found { entity, .. } => Some(*entity),
            _ => None,
        }
    }
}

impl fmt::Display for QueryOutcome<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryOutcome::Found { entity, .. } => {
                write!(f, "{}", entity.display_name().unwrap_or("(unnamed)"))
            }
            QueryOutcome::NotFound { name } => write!(f, "no data available for {name}"),
            QueryOutcome::NoEntityImplied => f.write_str("no specific player or team in question"),
        }
    }
}

// ---------------------------------------------------------------------------
// QueryResolver
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct QueryResolver {
    resolver: FuzzyResolver,
    threshold: f64,
}

impl Default for QueryResolver {
    fn default() -> Self {
        Self::new(FuzzyResolver::default(), DEFAULT_THRESHOLD)
    }
}

impl QueryResolver {
    pub fn new(resolver: FuzzyResolver, threshold: f64) -> Self {
        Self {
            resolver,
            threshold,
        }
    }

    /// Resolve a free-text question against a flat candidate list (e.g.
    /// scraped players).
    pub fn resolve<'a>(&self, text: &str, candidates: &'a [Entity]) -> QueryOutcome<'a> {
        match extract_target(text) {
            Some(target) => self.resolve_name(&target.name, candidates),
            None => QueryOutcome::NoEntityImplied,
        }
    }

    /// Resolve a free-text question against the reference tables, using the
    /// keyword hint to pick players, teams, or both (players first).
    pub fn resolve_in_store<'a>(&self, text: &str, store: &'a ReferenceStore) -> QueryOutcome<'a> {
        self.resolve_across(text, store, &[])
    }

    /// Resolve against the hinted store tables and a list of extra player
    /// records (scraped rows). The exact pass covers every source before
    /// any partial scoring; partial scoring tries the store first. A
    /// team-only question never searches `players`.
    pub fn resolve_across<'a>(
        &self,
        text: &str,
        store: &'a ReferenceStore,
        players: &'a [Entity],
    ) -> QueryOutcome<'a> {
        let Some(target) = extract_target(text) else {
            return QueryOutcome::NoEntityImplied;
        };
        let wanted = target.name.trim().to_lowercase();
        let tables = store_candidates(target.hint, store);
        let extra: &'a [Entity] = match target.hint {
            TargetHint::Team => &[],
            TargetHint::Player | TargetHint::Any => players,
        };

        if let Some(entity) = exact_match(&wanted, tables.iter().copied().chain(extra)) {
            debug!(name = %wanted, "exact name match");
            return QueryOutcome::Found {
                entity,
                match_kind: MatchKind::Exact,
            };
        }

        let partial = self
            .partial_match(&wanted, tables.iter().copied())
            .or_else(|| self.partial_match(&wanted, extra));
        self.finish(wanted, partial)
    }

    /// Match an already-extracted name against candidates' display names.
    pub fn resolve_name<'a, I>(&self, name: &str, candidates: I) -> QueryOutcome<'a>
    where
        I: IntoIterator<Item = &'a Entity>,
    {
        let wanted = name.trim().to_lowercase();
        let candidates: Vec<&'a Entity> = candidates.into_iter().collect();

        if let Some(entity) = exact_match(&wanted, candidates.iter().copied()) {
            debug!(name = %wanted, "exact name match");
            return QueryOutcome::Found {
                entity,
                match_kind: MatchKind::Exact,
            };
        }

        let partial = self.partial_match(&wanted, candidates);
        self.finish(wanted, partial)
    }

    /// Best partial score over the candidates' display names, if it clears
    /// the threshold. Ties keep the first candidate.
    fn partial_match<'a, I>(&self, wanted: &str, candidates: I) -> Option<(f64, &'a Entity)>
    where
        I: IntoIterator<Item = &'a Entity>,
    {
        let scorer = self.resolver.scorer();
        let mut best: Option<(f64, &'a Entity)> = None;
        for entity in candidates {
            let Some(name) = entity.display_name() else {
                continue;
            };
            let score = scorer.partial_score(wanted, &name.to_lowercase());
            if best.map_or(true, |(s, _)| score > s) {
                best = Some((score, entity));
            }
        }
        best.filter(|(score, _)| *score >= self.threshold)
    }

    fn finish<'a>(&self, wanted: String, partial: Option<(f64, &'a Entity)>) -> QueryOutcome<'a> {
        match partial {
            Some((score, entity)) => {
                debug!(name = %wanted, score, "fuzzy name match");
                QueryOutcome::Found {
                    entity,
                    match_kind: MatchKind::Fuzzy { score },
                }
            }
            None => {
                debug!(name = %wanted, "no name match");
                QueryOutcome::NotFound { name: wanted }
            }
        }
    }
}

fn store_candidates(hint: TargetHint, store: &ReferenceStore) -> Vec<&Entity> {
    match hint {
        TargetHint::Player => store.entities(EntityKind::Player).collect(),
        TargetHint::Team => store.entities(EntityKind::Team).collect(),
        TargetHint::Any => store
            .entities(EntityKind::Player)
            .chain(store.entities(EntityKind::Team))
            .collect(),
    }
}

/// First candidate whose display name equals `wanted` ignoring case.
fn exact_match<'a, I>(wanted: &str, candidates: I) -> Option<&'a Entity>
where
    I: IntoIterator<Item = &'a Entity>,
{
    candidates
        .into_iter()
        .find(|entity| entity.display_name().is_some_and(|n| n.to_lowercase() == wanted))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
