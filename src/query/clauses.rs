//! Building patterns from boolean clause lists.
//!
//! Query front-ends that speak "must / should / must not" (as in Lucene's
//! boolean queries) collect their clauses here and get a single pattern back.

use tracing::debug;

use super::pattern::Pattern;
use crate::error::{QueryError, QueryResult};

/// Clause occurrence
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Occur {
    Must,
    Should,
    MustNot,
}

/// Collects occurrence-tagged clauses.
#[derive(Clone, Debug, Default)]
pub struct BooleanClauseBuilder {
    clauses: Vec<(Occur, Pattern)>,
}

impl BooleanClauseBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, occur: Occur, pattern: Pattern) -> &mut Self {
        self.clauses.push((occur, pattern));
        self
    }

    /// Builder-style [`add`](Self::add).
    pub fn clause(mut self, occur: Occur, pattern: Pattern) -> Self {
        self.clauses.push((occur, pattern));
        self
    }

    pub fn must(self, pattern: Pattern) -> Self {
        self.clause(Occur::Must, pattern)
    }

    pub fn should(self, pattern: Pattern) -> Self {
        self.clause(Occur::Should, pattern)
    }

    pub fn must_not(self, pattern: Pattern) -> Self {
        self.clause(Occur::MustNot, pattern)
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Combine the clauses.
    ///
    /// MUST clauses are ANDed, SHOULD clauses ORed; with both present the
    /// result is `AND(must, should)`. MUST NOT clauses are ANDed together and
    /// excluded at document level: `DOCANDNOT([positive], [must_not])`.
    ///
    /// Fails with [`QueryError::NoIncludedTerms`] if there is no MUST or
    /// SHOULD clause, whatever the MUST NOT clauses.
    pub fn build(&self) -> QueryResult<Pattern> {
        let mut must = Vec::new();
        let mut should = Vec::new();
        let mut must_not = Vec::new();
        for (occur, pattern) in &self.clauses {
            match occur {
                Occur::Must => must.push(pattern.clone()),
                Occur::Should => should.push(pattern.clone()),
                Occur::MustNot => must_not.push(pattern.clone()),
            }
        }
        debug!(
            must = must.len(),
            should = should.len(),
            must_not = must_not.len(),
            "building boolean clauses"
        );

        let must = collapse(must, |clauses| Pattern::and(clauses));
        let should = collapse(should, |clauses| Pattern::or(clauses));
        let positive = match (must, should) {
            (Some(must), Some(should)) => Pattern::and([must, should]),
            (Some(only), None) | (None, Some(only)) => only,
            (None, None) => return Err(QueryError::NoIncludedTerms),
        };

        match collapse(must_not, |clauses| Pattern::and(clauses)) {
            Some(excluded) => Ok(Pattern::and_not([positive], [excluded])),
            None => Ok(positive),
        }
    }
}

/// `None` for no clauses, the clause itself for one, `combine` otherwise.
fn collapse(mut clauses: Vec<Pattern>, combine: fn(Vec<Pattern>) -> Pattern) -> Option<Pattern> {
    match clauses.len() {
        0 => None,
        1 => clauses.pop(),
        _ => Some(combine(clauses)),
    }
}
