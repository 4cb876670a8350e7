//! Pattern rewriter using algebraic laws.
//!
//! Normalizes a pattern tree before it is handed to a translator:
//! - Single-pass bottom-up rewriting (children first, then the node's rules)
//! - No cost model, only simplification and negation placement
//! - Validated by proptests (idempotence, length invariance, negativity)
//!
//! Key rewrites:
//! - NOT(NOT(x)) → x
//! - NOT(WITHIN(x, y)) → NOTWITHIN(x, y)
//! - AND(x, NOT(y)) → ANDNOT([x], [y])
//! - AND(AND(x, y), z) → AND(x, y, z)
//! - AND(NOT(x), NOT(y)) → NOT(OR(x, y)), AND() → ANYTOKEN(1, 1)
//! - OR(OR(x, y), z) → OR(x, y, z)
//! - OR(x, NOT(y)) → NOT(ANDNOT([y], [x])) when every clause is a single token
//! - OR(x) → x, SEQ(x) → x, REP(x, 1, 1) → x
//! - POSFILTER(ANYTOKEN(n, m), f, op) → FILTERNGRAMS(f, op, n, m)
//! - SEQ(x, x) → REP(x, 2, 2), SEQ(ANYTOKEN, x) → EXPAND(x, LEFT, ..)
//! - SEQ(x, NOT(y)) → POSFILTER(EXPAND(x, RIGHT, 1, 1), y, CONTAINING, inverted, ..)
//!
//! After rewriting, no conjunction has a negative-only clause left in it and
//! every `AND`/`ANDNOT` has at least one include clause. A disjunction keeps
//! a negative clause only when its clauses are not all single tokens.
//!
//! Nothing is mutated. A node whose subtree is already normal is returned as
//! the same shared handle, so `rewrite(&rewrite(p))` is pointer-identical to
//! `rewrite(p)`.

mod connectives;
mod sequence;

use tracing::{debug, trace};

use super::pattern::{Operation, Pattern, PatternNode};

/// Rewrite a pattern into normal form.
///
/// Returns an equivalent pattern: same hits, same length bounds, same
/// empty-match behavior. Returns `pattern` itself (same handle) when no rule
/// applies anywhere in the tree.
pub fn rewrite(pattern: &Pattern) -> Pattern {
    let rewritten = rewrite_node(pattern);
    if rewritten.ptr_eq(pattern) {
        debug!(pattern = %pattern, "pattern already in normal form");
    } else {
        debug!(before = %pattern, after = %rewritten, "rewrote pattern");
    }
    rewritten
}

/// Bottom-up rewrite of one node. Rules that build a new composite from
/// already-rewritten parts call back into this to normalize the result.
fn rewrite_node(pattern: &Pattern) -> Pattern {
    use PatternNode::*;
    match pattern.node() {
        Term { .. } | Regex { .. } | Wildcard { .. } | Prefix { .. } | Fuzzy { .. }
        | Tags { .. } | AnyToken { .. } => pattern.clone(),

        Not { inner } => connectives::rewrite_not(pattern, inner),

        And { include, exclude } => {
            connectives::rewrite_conjunction(pattern, connectives::Conjunction::Token, include, exclude)
        }

        AndNot { include, exclude } => connectives::rewrite_conjunction(
            pattern,
            connectives::Conjunction::Document,
            include,
            exclude,
        ),

        Or { clauses } => connectives::rewrite_or(pattern, clauses),

        Sequence { clauses } => sequence::rewrite_sequence(pattern, clauses),

        PositionFilter {
            producer,
            filter,
            operation,
            invert,
            left_adjust,
            right_adjust,
        } => rewrite_position_filter(
            pattern,
            producer,
            filter,
            *operation,
            *invert,
            (*left_adjust, *right_adjust),
        ),

        // REP(x, 1, 1) → x
        Repetition {
            inner,
            min: 1,
            max: Some(1),
        } => {
            let result = rewrite_node(inner);
            fired("repetition.single", pattern, &result);
            result
        }

        Property { .. } | Sensitive { .. } | CaptureGroup { .. } | Within { .. }
        | FilterNGrams { .. } | Repetition { .. } | Expansion { .. } => rewrite_children(pattern),
    }
}

/// Rewrite all children; rebuild only if one of them changed.
fn rewrite_children(pattern: &Pattern) -> Pattern {
    let children = pattern.children();
    let rewritten: Vec<Pattern> = children.iter().map(rewrite_node).collect();
    if children.iter().zip(&rewritten).all(|(old, new)| old.ptr_eq(new)) {
        return pattern.clone();
    }
    pattern
        .with_children(rewritten)
        .unwrap_or_else(|| pattern.clone())
}

// POSFILTER(ANYTOKEN(n, m), f, op) → FILTERNGRAMS(f, op, n, m)
fn rewrite_position_filter(
    pattern: &Pattern,
    producer: &Pattern,
    filter: &Pattern,
    operation: Operation,
    invert: bool,
    (left_adjust, right_adjust): (i32, i32),
) -> Pattern {
    let new_producer = rewrite_node(producer);
    let new_filter = rewrite_node(filter);

    if let PatternNode::AnyToken { min, max } = new_producer.node() {
        let ngram_operation = !matches!(operation, Operation::StartsAt | Operation::EndsAt);
        if !invert && ngram_operation && left_adjust == 0 && right_adjust == 0 {
            let result = Pattern::filter_ngrams(new_filter, operation, *min, *max);
            fired("position_filter.ngrams", pattern, &result);
            return result;
        }
    }

    if new_producer.ptr_eq(producer) && new_filter.ptr_eq(filter) {
        return pattern.clone();
    }
    Pattern::position_filter_adjusted(
        new_producer,
        new_filter,
        operation,
        invert,
        left_adjust,
        right_adjust,
    )
}

fn fired(rule: &'static str, before: &Pattern, after: &Pattern) {
    trace!(target: "corpus_query::rewrite", rule, before = %before, after = %after, "rule fired");
}
