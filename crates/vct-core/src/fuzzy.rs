// Best-candidate fuzzy resolution.
//
// The resolver only ranks; it always reports the top candidate, however
// poor. Callers decide acceptance against their threshold.

use std::fmt;
use std::sync::Arc;

use crate::similarity::{Scorer, SequenceRatio};

/// The highest-scoring candidate for a query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuzzyMatch<'a> {
    pub key: &'a str,
    pub score: f64,
}

impl FuzzyMatch<'_> {
    /// Whether this match clears `threshold` (inclusive).
    pub fn clears(&self, threshold: f64) -> bool {
        self.score >= threshold
    }
}

/// Ranks candidate strings against a query with an injected `Scorer`.
#[derive(Clone)]
pub struct FuzzyResolver {
    scorer: Arc<dyn Scorer>,
}

impl FuzzyResolver {
    pub fn new(scorer: impl Scorer + 'static) -> Self {
        Self {
            scorer: Arc::new(scorer),
        }
    }

    pub fn from_shared(scorer: Arc<dyn Scorer>) -> Self {
        Self { scorer }
    }

    pub fn scorer(&self) -> &dyn Scorer {
        self.scorer.as_ref()
    }

    /// Score `query` against every candidate and return the best one.
    ///
    /// Ties keep the first candidate seen. Returns `None` only when there
    /// are no candidates.
    pub fn best_match<'a, I>(&self, query: &str, candidates: I) -> Option<FuzzyMatch<'a>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut best: Option<FuzzyMatch<'a>> = None;
        for key in candidates {
            let score = self.scorer.score(query, key);
            match best {
                Some(current) if current.score >= score => {}
                _ => best = Some(FuzzyMatch { key, score }),
            }
        }
        best
    }

    /// `best_match`, filtered by an inclusive acceptance threshold.
    pub fn best_accepted<'a, I>(
        &self,
        query: &str,
        candidates: I,
        threshold: f64,
    ) -> Option<FuzzyMatch<'a>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.best_match(query, candidates)
            .filter(|m| m.clears(threshold))
    }
}

impl Default for FuzzyResolver {
    fn default() -> Self {
        Self::new(SequenceRatio)
    }
}

impl fmt::Debug for FuzzyResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FuzzyResolver").finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
