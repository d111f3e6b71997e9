// Session: config, the current data snapshot, and the resolvers built from
// config, passed explicitly to whatever answers questions.

use std::sync::Arc;
use tracing::info;

use vct_core::{
    Entity, LinkedRecord, Linker, QueryOutcome, QueryResolver, SharedSnapshot, Snapshot,
};

use crate::config::Config;
use crate::loader::{DataSource, LoadError};
use crate::prompt;

/// Resolve a question against the reference tables and the scraped player
/// list. An exact name in either source beats a partial match in the
/// tables.
pub fn resolve_question<'a>(
    resolver: &QueryResolver,
    snapshot: &'a Snapshot,
    scraped: &'a [Entity],
    text: &str,
) -> QueryOutcome<'a> {
    resolver.resolve_across(text, &snapshot.store, scraped)
}

/// Render a query outcome for terminal output.
pub fn render_outcome(outcome: &QueryOutcome<'_>) -> String {
    match outcome {
        QueryOutcome::Found { entity, .. } => {
            format!("{}\n{}", outcome, prompt::format_entity(entity))
        }
        other => other.to_string(),
    }
}

pub struct Session {
    config: Config,
    snapshot: SharedSnapshot,
    linker: Linker,
    query: QueryResolver,
}

impl Session {
    /// Build a session from config and an initial load of `source`.
    pub fn open(config: Config, source: &dyn DataSource) -> Result<Self, LoadError> {
        let snapshot = source.load()?;
        info!("session opened with {}", snapshot.summary());
        Ok(Self {
            linker: config.linker(),
            query: config.query_resolver(),
            snapshot: SharedSnapshot::new(snapshot),
            config,
        })
    }

    /// Rebuild from `source` and swap the result in. On failure the current
    /// snapshot stays in place.
    pub fn refresh(&self, source: &dyn DataSource) -> Result<Arc<Snapshot>, LoadError> {
        let snapshot = source.load()?;
        self.snapshot.replace(snapshot);
        Ok(self.snapshot.current())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot.current()
    }

    /// Link the current snapshot's mappings.
    pub fn linked(&self) -> Vec<LinkedRecord> {
        self.snapshot.current().link(&self.linker)
    }

    /// Answer "who is X"-style questions directly from the data.
    pub fn answer(&self, text: &str) -> String {
        let snapshot = self.snapshot.current();
        let scraped = snapshot.scraped_entities();
        let outcome = resolve_question(&self.query, &snapshot, &scraped, text);
        render_outcome(&outcome)
    }

    /// Full model prompt for a question.
    pub fn prompt(&self, text: &str) -> String {
        let snapshot = self.snapshot.current();
        let scraped = snapshot.scraped_entities();
        let focus = resolve_question(&self.query, &snapshot, &scraped, text);
        let linked = snapshot.link(&self.linker);
        prompt::build_prompt(text, &focus, &linked, &snapshot.scraped, &self.config.prompt)
    }
}
