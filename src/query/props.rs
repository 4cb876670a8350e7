//! Structural queries over pattern nodes.
//!
//! These are pure functions of a node and its subtree. The rewriter relies on
//! them to decide which laws apply, and must itself leave every one of them
//! unchanged (except the negativity queries, which rewriting is allowed to
//! improve).
//!
//! `NOT x` spans what `x` spans. A conjunction is measured over all of its
//! clauses, included and excluded alike, so moving a clause between the two
//! lists or inverting it never changes the bounds. A clause-less conjunction
//! counts as a single token.

use super::pattern::{Pattern, PatternNode};

impl PatternNode {
    /// Can this pattern match a zero-length hit?
    pub fn matches_empty_sequence(&self) -> bool {
        use PatternNode::*;
        match self {
            Term { .. } | Regex { .. } | Wildcard { .. } | Prefix { .. } | Fuzzy { .. }
            | Tags { .. } => false,
            Not { inner }
            | Property { inner, .. }
            | Sensitive { inner, .. }
            | CaptureGroup { inner, .. } => inner.matches_empty_sequence(),
            And { include, exclude } | AndNot { include, exclude } => {
                include.iter().chain(exclude).any(|clause| clause.matches_empty_sequence())
            }
            Or { clauses } => clauses.iter().any(|clause| clause.matches_empty_sequence()),
            Within { search, .. } => search.matches_empty_sequence(),
            PositionFilter { producer, .. } => producer.matches_empty_sequence(),
            AnyToken { min, .. } | FilterNGrams { min, .. } => *min == 0,
            Repetition { inner, min, .. } => *min == 0 || inner.matches_empty_sequence(),
            Sequence { clauses } => clauses.iter().all(|clause| clause.matches_empty_sequence()),
            Expansion { inner, min, .. } => *min == 0 && inner.matches_empty_sequence(),
        }
    }

    /// Do all hits have the same length?
    pub fn has_constant_length(&self) -> bool {
        use PatternNode::*;
        match self {
            Term { .. } | Regex { .. } | Wildcard { .. } | Prefix { .. } | Fuzzy { .. } => true,
            Tags { .. } => false,
            Not { inner }
            | Property { inner, .. }
            | Sensitive { inner, .. }
            | CaptureGroup { inner, .. } => inner.has_constant_length(),
            And { include, exclude } | AndNot { include, exclude } => {
                all_same_constant_length(include.iter().chain(exclude))
            }
            Or { clauses } => all_same_constant_length(clauses.iter()),
            Within { search, .. } => search.has_constant_length(),
            PositionFilter { producer, .. } => producer.has_constant_length(),
            AnyToken { min, max } | FilterNGrams { min, max, .. } => Some(*min) == *max,
            Repetition { inner, min, max } | Expansion { inner, min, max, .. } => {
                inner.has_constant_length() && Some(*min) == *max
            }
            Sequence { clauses } => clauses.iter().all(|clause| clause.has_constant_length()),
        }
    }

    /// Shortest possible hit, in tokens.
    pub fn min_length(&self) -> u32 {
        use PatternNode::*;
        match self {
            Term { .. } | Regex { .. } | Wildcard { .. } | Prefix { .. } | Fuzzy { .. }
            | Tags { .. } => 1,
            Not { inner }
            | Property { inner, .. }
            | Sensitive { inner, .. }
            | CaptureGroup { inner, .. } => inner.min_length(),
            And { include, exclude } | AndNot { include, exclude } => include
                .iter()
                .chain(exclude)
                .map(|clause| clause.min_length())
                .min()
                .unwrap_or(1),
            Or { clauses } => clauses
                .iter()
                .map(|clause| clause.min_length())
                .min()
                .unwrap_or(0),
            Within { search, .. } => search.min_length(),
            PositionFilter { producer, .. } => producer.min_length(),
            AnyToken { min, .. } | FilterNGrams { min, .. } => *min,
            Repetition { inner, min, .. } => inner.min_length().saturating_mul(*min),
            Sequence { clauses } => clauses
                .iter()
                .fold(0u32, |sum, clause| sum.saturating_add(clause.min_length())),
            Expansion { inner, min, .. } => inner.min_length().saturating_add(*min),
        }
    }

    /// Longest possible hit, in tokens; `None` if unbounded.
    pub fn max_length(&self) -> Option<u32> {
        use PatternNode::*;
        match self {
            Term { .. } | Regex { .. } | Wildcard { .. } | Prefix { .. } | Fuzzy { .. } => Some(1),
            Tags { .. } => None,
            Not { inner }
            | Property { inner, .. }
            | Sensitive { inner, .. }
            | CaptureGroup { inner, .. } => inner.max_length(),
            And { include, exclude } | AndNot { include, exclude } => {
                if include.is_empty() && exclude.is_empty() {
                    return Some(1);
                }
                include
                    .iter()
                    .chain(exclude)
                    .try_fold(0u32, |longest, clause| Some(longest.max(clause.max_length()?)))
            }
            Or { clauses } => clauses
                .iter()
                .try_fold(0u32, |longest, clause| Some(longest.max(clause.max_length()?))),
            Within { search, .. } => search.max_length(),
            PositionFilter { producer, .. } => producer.max_length(),
            AnyToken { max, .. } | FilterNGrams { max, .. } => *max,
            Repetition { inner, max, .. } => mul_max(inner.max_length(), *max),
            Sequence { clauses } => clauses
                .iter()
                .try_fold(0u32, |sum, clause| Some(sum.saturating_add(clause.max_length()?))),
            Expansion { inner, max, .. } => add_max(inner.max_length(), *max),
        }
    }

    /// Constant length of exactly one token.
    pub fn produces_single_tokens(&self) -> bool {
        self.has_constant_length() && self.min_length() == 1
    }

    /// Does this pattern only describe what must be absent?
    ///
    /// True for `NOT` and for conjunctions without any include clause. Such a
    /// pattern has no positive clause to drive matching, so it cannot be
    /// translated on its own.
    pub fn is_negative_only(&self) -> bool {
        match self {
            PatternNode::Not { .. } => true,
            PatternNode::And { include, .. } | PatternNode::AndNot { include, .. } => {
                include.is_empty()
            }
            _ => false,
        }
    }

    /// Can [`Pattern::invert`] produce the complement without wrapping the
    /// pattern in another `NOT`?
    pub fn is_free_to_invert(&self) -> bool {
        matches!(self, PatternNode::Not { .. } | PatternNode::Within { .. })
    }
}

impl Pattern {
    /// The complement of this pattern.
    ///
    /// `NOT(x)` inverts to `x` and `WITHIN` flips its invert flag; anything
    /// else gets wrapped in `NOT`.
    pub fn invert(&self) -> Pattern {
        match self.node() {
            PatternNode::Not { inner } => inner.clone(),
            PatternNode::Within {
                search,
                container,
                invert,
            } => Pattern::new(PatternNode::Within {
                search: search.clone(),
                container: container.clone(),
                invert: !invert,
            }),
            _ => Pattern::not(self.clone()),
        }
    }

    /// This pattern minus its zero-length hits.
    ///
    /// Returns the pattern itself if it never matches empty, and `None` if no
    /// structural form is known (or the pattern matches nothing but the empty
    /// sequence).
    pub fn non_empty(&self) -> Option<Pattern> {
        if !self.matches_empty_sequence() {
            return Some(self.clone());
        }
        match self.node() {
            PatternNode::AnyToken { max, .. } if *max != Some(0) => {
                Some(Pattern::any_token(1, *max))
            }
            PatternNode::Repetition { inner, min: 0, max }
                if *max != Some(0) && !inner.matches_empty_sequence() =>
            {
                Some(Pattern::repetition(inner.clone(), 1, *max))
            }
            PatternNode::Or { clauses } => {
                let mut kept = Vec::with_capacity(clauses.len());
                for clause in clauses {
                    if !clause.matches_empty_sequence() {
                        kept.push(clause.clone());
                    } else if let Some(non_empty) = clause.non_empty() {
                        kept.push(non_empty);
                    } else if !clause.only_matches_empty() {
                        return None;
                    }
                }
                match kept.len() {
                    0 => None,
                    1 => kept.pop(),
                    _ => Some(Pattern::or(kept)),
                }
            }
            _ => None,
        }
    }

    /// Zero-length hits are the only hits.
    pub(crate) fn only_matches_empty(&self) -> bool {
        self.max_length() == Some(0)
    }
}

/// Every clause has the same constant length (vacuously true for none).
fn all_same_constant_length<'a>(mut clauses: impl Iterator<Item = &'a Pattern>) -> bool {
    let Some(first) = clauses.next() else {
        return true;
    };
    first.has_constant_length()
        && clauses.all(|clause| {
            clause.has_constant_length() && clause.min_length() == first.min_length()
        })
}

pub(crate) fn add_max(a: Option<u32>, b: Option<u32>) -> Option<u32> {
    Some(a?.saturating_add(b?))
}

fn mul_max(a: Option<u32>, b: Option<u32>) -> Option<u32> {
    match (a, b) {
        (Some(0), _) | (_, Some(0)) => Some(0),
        (Some(a), Some(b)) => Some(a.saturating_mul(b)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_token_leaves() {
        let term = Pattern::term("cow");
        assert!(term.produces_single_tokens());
        assert!(!term.matches_empty_sequence());
        assert_eq!(term.max_length(), Some(1));
    }

    #[test]
    fn test_tags_are_unbounded() {
        let tags = Pattern::tags("s");
        assert!(!tags.has_constant_length());
        assert_eq!(tags.min_length(), 1);
        assert_eq!(tags.max_length(), None);
    }

    #[test]
    fn test_or_lengths() {
        let or = Pattern::or([Pattern::term("a"), Pattern::any_token(0, Some(3))]);
        assert_eq!(or.min_length(), 0);
        assert_eq!(or.max_length(), Some(3));
        assert!(or.matches_empty_sequence());
        assert!(!or.has_constant_length());

        let same = Pattern::or([Pattern::term("a"), Pattern::term("b")]);
        assert!(same.has_constant_length());
    }

    #[test]
    fn test_sequence_and_repetition_lengths() {
        let seq = Pattern::sequence([
            Pattern::term("a"),
            Pattern::repetition(Pattern::term("b"), 2, Some(3)),
            Pattern::any_token(0, None),
        ]);
        assert_eq!(seq.min_length(), 3);
        assert_eq!(seq.max_length(), None);

        let rep = Pattern::repetition(Pattern::tags("s"), 0, Some(0));
        assert_eq!(rep.max_length(), Some(0));
    }

    #[test]
    fn test_negativity() {
        assert!(Pattern::not(Pattern::term("x")).is_negative_only());
        assert!(Pattern::and_except([], [Pattern::term("x")]).is_negative_only());
        assert!(!Pattern::and([Pattern::term("x")]).is_negative_only());
        // Wrappers do not look through
        assert!(!Pattern::property("lemma", Pattern::not(Pattern::term("x"))).is_negative_only());
    }

    #[test]
    fn test_negation_keeps_shape() {
        let tags = Pattern::tags("s");
        let not = Pattern::not(tags.clone());
        assert_eq!(not.max_length(), None);
        assert!(!not.has_constant_length());

        let and = Pattern::and_except([Pattern::term("a")], [Pattern::any_token(0, Some(2))]);
        assert_eq!(and.min_length(), 0);
        assert_eq!(and.max_length(), Some(2));
        assert!(and.matches_empty_sequence());
        // Flipping the excluded clause keeps the bounds
        let flipped = Pattern::and([
            Pattern::term("a"),
            Pattern::not(Pattern::any_token(0, Some(2))),
        ]);
        assert_eq!(flipped.min_length(), and.min_length());
        assert_eq!(flipped.max_length(), and.max_length());

        let empty = Pattern::and(Vec::<Pattern>::new());
        assert!(empty.produces_single_tokens());
    }

    #[test]
    fn test_invert() {
        let x = Pattern::term("x");
        assert!(Pattern::not(x.clone()).invert().ptr_eq(&x));
        assert_eq!(x.invert(), Pattern::not(x.clone()));

        let within = Pattern::within(x.clone(), Pattern::tags("s"));
        assert_eq!(within.invert(), Pattern::not_within(x, Pattern::tags("s")));
        assert_eq!(within.invert().invert(), within);
    }

    #[test]
    fn test_non_empty_versions() {
        assert_eq!(
            Pattern::any_token(0, Some(2)).non_empty(),
            Some(Pattern::any_token(1, Some(2)))
        );
        assert_eq!(Pattern::any_token(0, Some(0)).non_empty(), None);
        assert_eq!(
            Pattern::repetition(Pattern::term("a"), 0, None).non_empty(),
            Some(Pattern::repetition(Pattern::term("a"), 1, None))
        );
        // Expansion of an empty-matching pattern has no known form
        let expansion = Pattern::expansion(Pattern::any_token(0, Some(1)), false, 0, Some(1));
        assert_eq!(expansion.non_empty(), None);
    }
}
