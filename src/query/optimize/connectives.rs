//! Rules for NOT, AND, AND-NOT and OR.
//!
//! The goal is negation placement: a negative-only clause (`NOT x`, or a
//! conjunction with nothing included) has no hits of its own to drive
//! matching, so it must end up on the exclude side of a conjunction or at the
//! very top of the tree.

use super::{fired, rewrite_node};
use crate::query::pattern::{Pattern, PatternNode};

/// Which conjunction is being normalized. Flattening only splices nested
/// conjunctions of the same kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Conjunction {
    /// Token-level `AND`
    Token,
    /// Document-level `ANDNOT`
    Document,
}

impl Conjunction {
    fn build(self, include: Vec<Pattern>, exclude: Vec<Pattern>) -> Pattern {
        match self {
            Conjunction::Token => Pattern::and_except(include, exclude),
            Conjunction::Document => Pattern::and_not(include, exclude),
        }
    }

    fn lists_of(self, pattern: &Pattern) -> Option<(&[Pattern], &[Pattern])> {
        match (self, pattern.node()) {
            (Conjunction::Token, PatternNode::And { include, exclude })
            | (Conjunction::Document, PatternNode::AndNot { include, exclude }) => {
                Some((include, exclude))
            }
            _ => None,
        }
    }
}

// NOT(NOT(x)) → x, NOT(WITHIN) → NOTWITHIN
pub(super) fn rewrite_not(pattern: &Pattern, inner: &Pattern) -> Pattern {
    let rewritten = rewrite_node(inner);
    if rewritten.ptr_eq(inner) && !rewritten.is_free_to_invert() {
        return pattern.clone();
    }
    let result = rewritten.invert();
    fired("not.invert", pattern, &result);
    result
}

/// Clause lists being collected for a conjunction.
struct Clauses {
    kind: Conjunction,
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
    changed: bool,
}

impl Clauses {
    fn new(kind: Conjunction, capacity: usize) -> Self {
        Clauses {
            kind,
            include: Vec::with_capacity(capacity),
            exclude: Vec::new(),
            changed: false,
        }
    }

    /// Place a clause that must match.
    fn add_positive(&mut self, clause: Pattern) {
        if let Some((include, exclude)) = self.kind.lists_of(&clause) {
            // AND(AND(x, y), z) → AND(x, y, z)
            self.include.extend_from_slice(include);
            self.exclude.extend_from_slice(exclude);
            self.changed = true;
        } else if clause.is_negative_only() && clause.is_free_to_invert() {
            // AND(x, NOT(y)) → ANDNOT([x], [y])
            self.changed = true;
            self.add_negative(clause.invert());
        } else {
            self.include.push(clause);
        }
    }

    /// Place a clause that must not match.
    fn add_negative(&mut self, clause: Pattern) {
        match clause.node() {
            PatternNode::Or { clauses } if !clauses.is_empty() => {
                // ANDNOT([x], [OR(y, z)]) → ANDNOT([x], [y, z])
                self.changed = true;
                for nested in clauses {
                    self.add_negative(nested.clone());
                }
                return;
            }
            _ => {}
        }
        if clause.is_negative_only() && clause.is_free_to_invert() {
            // ANDNOT([x], [NOT(y)]) → AND(x, y)
            self.changed = true;
            self.add_positive(clause.invert());
        } else {
            self.exclude.push(clause);
        }
    }
}

pub(super) fn rewrite_conjunction(
    pattern: &Pattern,
    kind: Conjunction,
    include: &[Pattern],
    exclude: &[Pattern],
) -> Pattern {
    let mut clauses = Clauses::new(kind, include.len());
    for child in include {
        let rewritten = rewrite_node(child);
        clauses.changed |= !rewritten.ptr_eq(child);
        clauses.add_positive(rewritten);
    }
    for child in exclude {
        let rewritten = rewrite_node(child);
        clauses.changed |= !rewritten.ptr_eq(child);
        clauses.add_negative(rewritten);
    }

    if clauses.include.is_empty() {
        if clauses.exclude.is_empty() {
            // AND() → ANYTOKEN(1, 1): nothing to rule out, any single token
            let result = Pattern::any_token(1, Some(1));
            fired("conjunction.empty", pattern, &result);
            return result;
        }
        // AND(NOT(x), NOT(y)) → NOT(OR(x, y))
        let complement = match kind {
            Conjunction::Document if clauses.exclude.len() == 1 => clauses.exclude[0].invert(),
            _ => Pattern::or(clauses.exclude).invert(),
        };
        let result = rewrite_node(&complement);
        fired("conjunction.all_negative", pattern, &result);
        return result;
    }

    if !clauses.changed {
        return pattern.clone();
    }
    let result = kind.build(clauses.include, clauses.exclude);
    fired("conjunction.normalize", pattern, &result);
    result
}

pub(super) fn rewrite_or(pattern: &Pattern, clauses: &[Pattern]) -> Pattern {
    let mut changed = false;
    let mut flat = Vec::with_capacity(clauses.len());
    for child in clauses {
        let rewritten = rewrite_node(child);
        changed |= !rewritten.ptr_eq(child);
        if let PatternNode::Or { clauses: nested } = rewritten.node() {
            // OR(OR(x, y), z) → OR(x, y, z)
            flat.extend_from_slice(nested);
            changed = true;
        } else {
            flat.push(rewritten);
        }
    }

    if flat.len() == 1 {
        if let Some(only) = flat.pop() {
            fired("or.single", pattern, &only);
            return only;
        }
    }

    if invertible_disjunction(&flat) {
        // OR(x, NOT(y)) → NOT(AND(NOT(x), y)), normalized to NOT(ANDNOT([y], [x]))
        let inverted: Vec<Pattern> = flat.iter().map(Pattern::invert).collect();
        let complement = Pattern::and(inverted).invert();
        let result = rewrite_node(&complement);
        fired("or.de_morgan", pattern, &result);
        return result;
    }

    if !changed {
        return pattern.clone();
    }
    let result = Pattern::or(flat);
    fired("or.flatten", pattern, &result);
    result
}

/// Should a disjunction with negative clauses be turned into a negated
/// conjunction?
///
/// Only single-token disjunctions qualify, and every negative clause must
/// invert into a positive one. A clause-less conjunction is negative-only
/// but inverts into another negation, so it never qualifies.
fn invertible_disjunction(clauses: &[Pattern]) -> bool {
    clauses.iter().any(|clause| clause.is_negative_only())
        && clauses.iter().all(|clause| {
            clause.produces_single_tokens()
                && (!clause.is_negative_only() || clause.is_free_to_invert())
        })
}
