//! Proptest generators for pattern trees
//!
//! Provides `Strategy` implementations for generating patterns of bounded
//! depth, with and without negation.

#![allow(dead_code)]

use corpus_query::{Attributes, Operation, Pattern};
use proptest::collection::vec;
use proptest::prelude::*;

// ============================================================================
// Leaves
// ============================================================================

/// Short lowercase word; a small alphabet makes equal leaves likely
pub fn arb_word() -> impl Strategy<Value = String> {
    "[a-c]{1,2}".prop_map(String::from)
}

/// Optional upper bound, at least `min`
fn arb_bounds() -> impl Strategy<Value = (u32, Option<u32>)> {
    (0..3u32, prop::option::of(0..3u32)).prop_map(|(min, extra)| (min, extra.map(|e| min + e)))
}

pub fn arb_operation() -> impl Strategy<Value = Operation> {
    prop_oneof![
        Just(Operation::Containing),
        Just(Operation::Within),
        Just(Operation::StartsAt),
        Just(Operation::EndsAt),
        Just(Operation::Matches),
        Just(Operation::ContainingAtStart),
        Just(Operation::ContainingAtEnd),
    ]
}

pub fn arb_tags() -> impl Strategy<Value = Pattern> {
    (
        prop_oneof![Just("s"), Just("p"), Just("ne")],
        prop::option::of(arb_word()),
    )
        .prop_map(|(element, attribute)| {
            let mut attributes = Attributes::new();
            if let Some(value) = attribute {
                attributes.insert("type".to_string(), value);
            }
            Pattern::tags_with_attributes(element, attributes)
        })
}

/// Single-token leaves
pub fn arb_token_leaf() -> impl Strategy<Value = Pattern> {
    prop_oneof![
        4 => arb_word().prop_map(|w| Pattern::term(w)),
        1 => arb_word().prop_map(|w| Pattern::regex(format!("{w}.*"))),
        1 => arb_word().prop_map(|w| Pattern::wildcard(format!("{w}*"))),
        1 => arb_word().prop_map(|w| Pattern::prefix(w)),
        1 => (arb_word(), 0..3u32, 0..2u32).prop_map(|(w, e, p)| Pattern::fuzzy(w, e, p)),
    ]
}

pub fn arb_leaf() -> impl Strategy<Value = Pattern> {
    prop_oneof![
        6 => arb_token_leaf(),
        1 => arb_tags(),
        1 => arb_bounds().prop_map(|(min, max)| Pattern::any_token(min, max)),
    ]
}

// ============================================================================
// Composites
// ============================================================================

/// Patterns without negation: no NOT, no exclude clauses, no ANDNOT
pub fn arb_positive_pattern() -> impl Strategy<Value = Pattern> {
    arb_leaf().prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            vec(inner.clone(), 1..4).prop_map(|clauses| Pattern::and(clauses)),
            vec(inner.clone(), 1..4).prop_map(|clauses| Pattern::or(clauses)),
            vec(inner.clone(), 2..4).prop_map(|clauses| Pattern::sequence(clauses)),
            (inner.clone(), arb_bounds())
                .prop_map(|(p, (min, max))| Pattern::repetition(p, min, max)),
            (inner.clone(), any::<bool>(), arb_bounds())
                .prop_map(|(p, left, (min, max))| Pattern::expansion(p, left, min, max)),
            (inner.clone(), inner.clone(), arb_operation(), any::<bool>())
                .prop_map(|(p, f, op, invert)| Pattern::position_filter(p, f, op, invert)),
            (inner.clone(), arb_tags(), any::<bool>()).prop_map(|(p, t, invert)| {
                if invert {
                    Pattern::not_within(p, t)
                } else {
                    Pattern::within(p, t)
                }
            }),
            (prop_oneof![Just("lemma"), Just("pos"), Just("pos:noun")], inner.clone())
                .prop_map(|(name, p)| Pattern::property(name, p)),
            (any::<bool>(), any::<bool>(), inner.clone())
                .prop_map(|(c, d, p)| Pattern::sensitive(c, d, p)),
            (inner, arb_word()).prop_map(|(p, name)| Pattern::capture(p, name)),
        ]
    })
}

/// Arbitrary patterns, negation included
pub fn arb_pattern() -> impl Strategy<Value = Pattern> {
    arb_leaf().prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            2 => inner.clone().prop_map(Pattern::not),
            2 => conjunction_lists(inner.clone())
                .prop_map(|(include, exclude)| Pattern::and_except(include, exclude)),
            1 => conjunction_lists(inner.clone())
                .prop_map(|(include, exclude)| Pattern::and_not(include, exclude)),
            2 => vec(inner.clone(), 1..4).prop_map(|clauses| Pattern::or(clauses)),
            1 => vec(inner.clone(), 2..4).prop_map(|clauses| Pattern::sequence(clauses)),
            1 => (inner.clone(), arb_bounds())
                .prop_map(|(p, (min, max))| Pattern::repetition(p, min, max)),
            1 => (inner.clone(), inner.clone(), arb_operation(), any::<bool>())
                .prop_map(|(p, f, op, invert)| Pattern::position_filter(p, f, op, invert)),
            1 => (inner.clone(), arb_tags()).prop_map(|(p, t)| Pattern::within(p, t)),
            1 => (prop_oneof![Just("lemma"), Just("pos")], inner.clone())
                .prop_map(|(name, p)| Pattern::property(name, p)),
            1 => (inner, arb_word()).prop_map(|(p, name)| Pattern::capture(p, name)),
        ]
    })
}

/// Include/exclude lists, either or both possibly empty
fn conjunction_lists(
    inner: impl Strategy<Value = Pattern> + Clone,
) -> impl Strategy<Value = (Vec<Pattern>, Vec<Pattern>)> {
    (vec(inner.clone(), 0..3), vec(inner, 0..3))
}

/// Patterns whose hits are always exactly one token, negation included
pub fn arb_single_token_pattern() -> impl Strategy<Value = Pattern> {
    arb_token_leaf().prop_recursive(3, 16, 3, |inner| {
        prop_oneof![
            2 => inner.clone().prop_map(Pattern::not),
            1 => (vec(inner.clone(), 1..3), vec(inner.clone(), 0..2))
                .prop_map(|(include, exclude)| Pattern::and_except(include, exclude)),
            2 => vec(inner.clone(), 1..3).prop_map(|clauses| Pattern::or(clauses)),
            1 => (prop_oneof![Just("lemma"), Just("pos")], inner)
                .prop_map(|(name, p)| Pattern::property(name, p)),
        ]
    })
}

// ============================================================================
// Tree inspection
// ============================================================================

/// Visit every node of a pattern tree, parents first
pub fn walk(pattern: &Pattern, visit: &mut dyn FnMut(&Pattern)) {
    visit(pattern);
    for child in pattern.children() {
        walk(&child, visit);
    }
}
