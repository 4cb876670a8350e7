//! Rules for sequences.
//!
//! - SEQ(SEQ(x, y), z) → SEQ(x, y, z)
//! - SEQ(ANYTOKEN(a, b), ANYTOKEN(c, d)) → ANYTOKEN(a + c, b + d)
//! - SEQ(ANYTOKEN(n, m), x) → EXPAND(x, LEFT, n, m), and likewise on the right
//! - SEQ(REP(x, a, b), x) → REP(x, a + 1, b + 1)
//! - SEQ(EXPAND(x, LEFT, n, m), y) → EXPAND(SEQ(x, y), LEFT, n, m) for n < m
//! - SEQ(POSFILTER(p, f, ..), c) → POSFILTER(SEQ(p, c), f, .., right_adjust - |c|)
//!   for constant-length `c`, and likewise on the left
//! - SEQ(c, NOT(t)) → POSFILTER(EXPAND(c, RIGHT, 1, 1), t, CONTAINING, inverted, |c|, 0)
//!   for constant-length `c` and single-token `t`, and likewise on the left
//! - SEQ(x, OPT(y)) → OR(SEQ(x, y), x) when the sequence as a whole cannot
//!   match empty but some of its parts can

use super::{fired, rewrite_node};
use crate::query::pattern::{Operation, Pattern, PatternNode};
use crate::query::props::add_max;

/// Beyond this many optional parts the alternatives are not spelled out.
const MAX_OPTIONAL_PARTS: usize = 8;

pub(super) fn rewrite_sequence(pattern: &Pattern, clauses: &[Pattern]) -> Pattern {
    let mut changed = false;
    let mut parts = Vec::with_capacity(clauses.len());
    for child in clauses {
        let rewritten = rewrite_node(child);
        changed |= !rewritten.ptr_eq(child);
        if let PatternNode::Sequence { clauses: nested } = rewritten.node() {
            parts.extend_from_slice(nested);
            changed = true;
        } else {
            parts.push(rewritten);
        }
    }

    let (mut parts, combined) = combine_parts(parts);
    changed |= combined;

    if let Some(alternatives) = empty_match_alternatives(&parts) {
        let result = rewrite_node(&Pattern::or(alternatives));
        fired("sequence.alternatives", pattern, &result);
        return result;
    }

    if parts.len() == 1 {
        if let Some(only) = parts.pop() {
            fired("sequence.single", pattern, &only);
            return only;
        }
    }

    if !changed {
        return pattern.clone();
    }
    let result = Pattern::sequence(parts);
    fired("sequence.combine", pattern, &result);
    result
}

/// Merge adjacent parts left to right until no pair combines.
///
/// A merged part is rewritten and then tried against its new left neighbor
/// again, so e.g. `x x x` collapses all the way to `REP(x, 3, 3)`.
fn combine_parts(parts: Vec<Pattern>) -> (Vec<Pattern>, bool) {
    let mut combined_any = false;
    let mut stack: Vec<Pattern> = Vec::with_capacity(parts.len());
    for part in parts {
        let mut current = part;
        while let Some(combined) = stack.last().and_then(|previous| combine(previous, &current)) {
            stack.pop();
            current = rewrite_node(&combined);
            combined_any = true;
        }
        stack.push(current);
    }
    (stack, combined_any)
}

/// Try to replace two adjacent parts by a single equivalent one.
fn combine(previous: &Pattern, current: &Pattern) -> Option<Pattern> {
    use PatternNode::*;
    match (previous.node(), current.node()) {
        (AnyToken { min: a, max: a_max }, AnyToken { min: b, max: b_max }) => {
            return Some(Pattern::any_token(a.saturating_add(*b), add_max(*a_max, *b_max)));
        }
        (AnyToken { min, max }, _) => {
            return Some(Pattern::expansion(current.clone(), true, *min, *max));
        }
        (_, AnyToken { min, max }) => {
            return Some(Pattern::expansion(previous.clone(), false, *min, *max));
        }
        _ => {}
    }

    if let Some(repetition) = merge_repetitions(previous, current) {
        return Some(repetition);
    }

    // A left expansion over a range takes its right neighbor inside, so the
    // neighbor narrows the hits before they are expanded.
    if let Expansion {
        inner,
        expand_to_left: true,
        min,
        max,
    } = previous.node()
    {
        if Some(*min) != *max {
            return Some(Pattern::expansion(
                Pattern::sequence([inner.clone(), current.clone()]),
                true,
                *min,
                *max,
            ));
        }
    }

    // A position filter swallows a constant-length neighbor and shifts its
    // window so the filter still applies to the original producer's span.
    if let PositionFilter {
        producer,
        filter,
        operation,
        invert,
        left_adjust,
        right_adjust,
    } = previous.node()
    {
        if current.has_constant_length() {
            return Some(Pattern::position_filter_adjusted(
                Pattern::sequence([producer.clone(), current.clone()]),
                filter.clone(),
                *operation,
                *invert,
                *left_adjust,
                right_adjust.saturating_sub(adjustment(current)),
            ));
        }
    }
    if let PositionFilter {
        producer,
        filter,
        operation,
        invert,
        left_adjust,
        right_adjust,
    } = current.node()
    {
        if previous.has_constant_length() {
            return Some(Pattern::position_filter_adjusted(
                Pattern::sequence([previous.clone(), producer.clone()]),
                filter.clone(),
                *operation,
                *invert,
                left_adjust.saturating_add(adjustment(previous)),
                *right_adjust,
            ));
        }
    }

    // A single-token negation next to a constant-length part becomes a
    // "not containing" filter on the token it stands for.
    if previous.has_constant_length() && is_single_token_not(current) {
        return Some(Pattern::position_filter_adjusted(
            Pattern::expansion(previous.clone(), false, 1, Some(1)),
            current.invert(),
            Operation::Containing,
            true,
            adjustment(previous),
            0,
        ));
    }
    if current.has_constant_length() && is_single_token_not(previous) {
        return Some(Pattern::position_filter_adjusted(
            Pattern::expansion(current.clone(), true, 1, Some(1)),
            previous.invert(),
            Operation::Containing,
            true,
            0,
            -adjustment(current),
        ));
    }

    None
}

fn is_single_token_not(part: &Pattern) -> bool {
    part.is_negative_only() && part.is_free_to_invert() && part.produces_single_tokens()
}

// SEQ(REP(x, a, b), REP(x, c, d)) → REP(x, a + c, b + d), a bare x counting as REP(x, 1, 1)
fn merge_repetitions(previous: &Pattern, current: &Pattern) -> Option<Pattern> {
    let (left, left_min, left_max) = repeated(previous);
    let (right, right_min, right_max) = repeated(current);
    if left != right {
        return None;
    }
    Some(Pattern::repetition(
        left.clone(),
        left_min.saturating_add(right_min),
        add_max(left_max, right_max),
    ))
}

fn repeated(pattern: &Pattern) -> (&Pattern, u32, Option<u32>) {
    match pattern.node() {
        PatternNode::Repetition { inner, min, max } => (inner, *min, *max),
        _ => (pattern, 1, Some(1)),
    }
}

fn adjustment(part: &Pattern) -> i32 {
    i32::try_from(part.min_length()).unwrap_or(i32::MAX)
}

/// Expand a sequence whose optional parts would otherwise let a hit start or
/// end on nothing: each such part is either present (in its non-empty form)
/// or absent.
///
/// Only applies when the sequence as a whole cannot match empty and every
/// optional part has a known non-empty form.
fn empty_match_alternatives(parts: &[Pattern]) -> Option<Vec<Pattern>> {
    let optional = parts.iter().filter(|part| part.matches_empty_sequence()).count();
    if parts.len() < 2 || optional == 0 || optional == parts.len() || optional > MAX_OPTIONAL_PARTS {
        return None;
    }

    let mut alternatives: Vec<Vec<Pattern>> = vec![Vec::with_capacity(parts.len())];
    for part in parts {
        if !part.matches_empty_sequence() {
            for alternative in &mut alternatives {
                alternative.push(part.clone());
            }
            continue;
        }
        let present = if part.only_matches_empty() {
            None
        } else {
            Some(part.non_empty()?)
        };
        let mut next = Vec::with_capacity(alternatives.len() * 2);
        for alternative in alternatives {
            if let Some(present) = &present {
                let mut with_part = alternative.clone();
                with_part.push(present.clone());
                next.push(with_part);
            }
            next.push(alternative);
        }
        alternatives = next;
    }

    Some(
        alternatives
            .into_iter()
            .map(|mut alternative| {
                if alternative.len() == 1 {
                    alternative.remove(0)
                } else {
                    Pattern::sequence(alternative)
                }
            })
            .collect(),
    )
}
