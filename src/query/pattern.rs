//! Pattern trees.
//!
//! A [`Pattern`] is a cheap, shareable handle to an immutable [`PatternNode`].
//! Nothing here mutates a node after construction: the rewriter builds new
//! nodes from rewritten children and hands back the original handle when
//! nothing changed, so a no-op can be detected with [`Pattern::ptr_eq`].
//!
//! Equality is structural, with one exception: two distinct capture groups are
//! never equal, even if their subtrees are. A capture group only equals the
//! very same shared node. Capture points must stay distinguishable, so e.g. the
//! sequence optimizer never merges `CAPTURE(x, a) CAPTURE(x, a)` into a
//! repetition.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Tag attributes, in the order they were given.
pub type Attributes = IndexMap<String, String>;

/// How a position filter relates producer hits to filter hits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operation {
    /// Producer hit contains a filter hit
    Containing,
    /// Producer hit lies within a filter hit
    Within,
    /// Producer hit starts where a filter hit starts
    StartsAt,
    /// Producer hit ends where a filter hit ends
    EndsAt,
    /// Producer hit and filter hit cover the same span
    Matches,
    /// Producer hit contains a filter hit at its start
    ContainingAtStart,
    /// Producer hit contains a filter hit at its end
    ContainingAtEnd,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Containing => "CONTAINING",
            Operation::Within => "WITHIN",
            Operation::StartsAt => "STARTS_AT",
            Operation::EndsAt => "ENDS_AT",
            Operation::Matches => "MATCHES",
            Operation::ContainingAtStart => "CONTAINING_AT_START",
            Operation::ContainingAtEnd => "CONTAINING_AT_END",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shared handle to an immutable pattern node.
#[derive(Clone)]
pub struct Pattern(Arc<PatternNode>);

/// One node of a pattern tree.
///
/// Lengths are token counts; a maximum of `None` means unbounded.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PatternNode {
    /// Exact term in the selected annotation
    Term { value: String },
    Regex { value: String },
    Wildcard { value: String },
    Prefix { value: String },
    Fuzzy {
        value: String,
        max_edits: u32,
        #[serde(default)]
        prefix_length: u32,
    },
    /// Structural element (e.g. `<s/>`), optionally filtered on attributes
    Tags {
        element: String,
        #[serde(default)]
        attributes: Attributes,
    },
    /// Select an annotation (word, lemma, pos, ...) for the subtree
    Property { name: String, inner: Pattern },
    /// Override case/diacritics sensitivity for the subtree
    Sensitive {
        case_sensitive: bool,
        diacritics_sensitive: bool,
        inner: Pattern,
    },
    /// Token-level conjunction: all of `include`, none of `exclude`
    And {
        include: Vec<Pattern>,
        #[serde(default)]
        exclude: Vec<Pattern>,
    },
    Or { clauses: Vec<Pattern> },
    Not { inner: Pattern },
    /// Document-level conjunction used for boolean filtering: all of
    /// `include`, none of `exclude`
    AndNot {
        include: Vec<Pattern>,
        #[serde(default)]
        exclude: Vec<Pattern>,
    },
    /// Hits of `search` (not, if `invert`) inside a hit of `container`
    Within {
        search: Pattern,
        container: Pattern,
        #[serde(default)]
        invert: bool,
    },
    /// Hits of `producer` whose window, shifted by the adjustments, stands in
    /// `operation` to some hit of `filter` (or to none, if `invert`)
    PositionFilter {
        producer: Pattern,
        filter: Pattern,
        operation: Operation,
        #[serde(default)]
        invert: bool,
        #[serde(default)]
        left_adjust: i32,
        #[serde(default)]
        right_adjust: i32,
    },
    CaptureGroup { inner: Pattern, name: String },
    /// Any `min..=max` tokens
    AnyToken {
        min: u32,
        #[serde(default)]
        max: Option<u32>,
    },
    /// N-grams of `min..=max` tokens filtered by `filter`; only introduced by
    /// the rewriter
    FilterNGrams {
        filter: Pattern,
        operation: Operation,
        min: u32,
        #[serde(default)]
        max: Option<u32>,
    },
    Repetition {
        inner: Pattern,
        min: u32,
        #[serde(default)]
        max: Option<u32>,
    },
    Sequence { clauses: Vec<Pattern> },
    /// Hits of `inner` widened by `min..=max` arbitrary tokens on one side
    Expansion {
        inner: Pattern,
        expand_to_left: bool,
        min: u32,
        #[serde(default)]
        max: Option<u32>,
    },
}

impl Pattern {
    pub fn new(node: PatternNode) -> Self {
        Pattern(Arc::new(node))
    }

    pub fn node(&self) -> &PatternNode {
        &self.0
    }

    /// Are these handles to the very same node?
    pub fn ptr_eq(&self, other: &Pattern) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    // ============ Constructors ============

    pub fn term(value: impl Into<String>) -> Self {
        Self::new(PatternNode::Term { value: value.into() })
    }

    pub fn regex(value: impl Into<String>) -> Self {
        Self::new(PatternNode::Regex { value: value.into() })
    }

    pub fn wildcard(value: impl Into<String>) -> Self {
        Self::new(PatternNode::Wildcard { value: value.into() })
    }

    pub fn prefix(value: impl Into<String>) -> Self {
        Self::new(PatternNode::Prefix { value: value.into() })
    }

    pub fn fuzzy(value: impl Into<String>, max_edits: u32, prefix_length: u32) -> Self {
        Self::new(PatternNode::Fuzzy {
            value: value.into(),
            max_edits,
            prefix_length,
        })
    }

    pub fn tags(element: impl Into<String>) -> Self {
        Self::tags_with_attributes(element, Attributes::new())
    }

    pub fn tags_with_attributes(element: impl Into<String>, attributes: Attributes) -> Self {
        Self::new(PatternNode::Tags {
            element: element.into(),
            attributes,
        })
    }

    pub fn property(name: impl Into<String>, inner: Pattern) -> Self {
        Self::new(PatternNode::Property {
            name: name.into(),
            inner,
        })
    }

    pub fn sensitive(case_sensitive: bool, diacritics_sensitive: bool, inner: Pattern) -> Self {
        Self::new(PatternNode::Sensitive {
            case_sensitive,
            diacritics_sensitive,
            inner,
        })
    }

    /// Token-level AND of positive clauses.
    pub fn and(include: impl IntoIterator<Item = Pattern>) -> Self {
        Self::and_except(include, Vec::new())
    }

    /// Token-level AND with excluded clauses.
    pub fn and_except(
        include: impl IntoIterator<Item = Pattern>,
        exclude: impl IntoIterator<Item = Pattern>,
    ) -> Self {
        Self::new(PatternNode::And {
            include: include.into_iter().collect(),
            exclude: exclude.into_iter().collect(),
        })
    }

    /// Document-level AND-NOT.
    pub fn and_not(
        include: impl IntoIterator<Item = Pattern>,
        exclude: impl IntoIterator<Item = Pattern>,
    ) -> Self {
        Self::new(PatternNode::AndNot {
            include: include.into_iter().collect(),
            exclude: exclude.into_iter().collect(),
        })
    }

    pub fn or(clauses: impl IntoIterator<Item = Pattern>) -> Self {
        Self::new(PatternNode::Or {
            clauses: clauses.into_iter().collect(),
        })
    }

    pub fn not(inner: Pattern) -> Self {
        Self::new(PatternNode::Not { inner })
    }

    pub fn within(search: Pattern, container: Pattern) -> Self {
        Self::new(PatternNode::Within {
            search,
            container,
            invert: false,
        })
    }

    pub fn not_within(search: Pattern, container: Pattern) -> Self {
        Self::new(PatternNode::Within {
            search,
            container,
            invert: true,
        })
    }

    pub fn position_filter(
        producer: Pattern,
        filter: Pattern,
        operation: Operation,
        invert: bool,
    ) -> Self {
        Self::position_filter_adjusted(producer, filter, operation, invert, 0, 0)
    }

    pub fn position_filter_adjusted(
        producer: Pattern,
        filter: Pattern,
        operation: Operation,
        invert: bool,
        left_adjust: i32,
        right_adjust: i32,
    ) -> Self {
        Self::new(PatternNode::PositionFilter {
            producer,
            filter,
            operation,
            invert,
            left_adjust,
            right_adjust,
        })
    }

    pub fn capture(inner: Pattern, name: impl Into<String>) -> Self {
        Self::new(PatternNode::CaptureGroup {
            inner,
            name: name.into(),
        })
    }

    pub fn any_token(min: u32, max: Option<u32>) -> Self {
        Self::new(PatternNode::AnyToken { min, max })
    }

    pub fn filter_ngrams(filter: Pattern, operation: Operation, min: u32, max: Option<u32>) -> Self {
        Self::new(PatternNode::FilterNGrams {
            filter,
            operation,
            min,
            max,
        })
    }

    pub fn repetition(inner: Pattern, min: u32, max: Option<u32>) -> Self {
        Self::new(PatternNode::Repetition { inner, min, max })
    }

    pub fn sequence(clauses: impl IntoIterator<Item = Pattern>) -> Self {
        Self::new(PatternNode::Sequence {
            clauses: clauses.into_iter().collect(),
        })
    }

    pub fn expansion(inner: Pattern, expand_to_left: bool, min: u32, max: Option<u32>) -> Self {
        Self::new(PatternNode::Expansion {
            inner,
            expand_to_left,
            min,
            max,
        })
    }
}

impl Deref for Pattern {
    type Target = PatternNode;

    fn deref(&self) -> &PatternNode {
        &self.0
    }
}

impl From<PatternNode> for Pattern {
    fn from(node: PatternNode) -> Self {
        Pattern::new(node)
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.0 == *other.0
    }
}

impl PartialEq for PatternNode {
    fn eq(&self, other: &Self) -> bool {
        use PatternNode::*;
        match (self, other) {
            (Term { value: a }, Term { value: b })
            | (Regex { value: a }, Regex { value: b })
            | (Wildcard { value: a }, Wildcard { value: b })
            | (Prefix { value: a }, Prefix { value: b }) => a == b,
            (
                Fuzzy { value: a, max_edits: ae, prefix_length: ap },
                Fuzzy { value: b, max_edits: be, prefix_length: bp },
            ) => a == b && ae == be && ap == bp,
            (
                Tags { element: a, attributes: aa },
                Tags { element: b, attributes: ba },
            ) => a == b && aa == ba,
            (Property { name: a, inner: ai }, Property { name: b, inner: bi }) => {
                a == b && ai == bi
            }
            (
                Sensitive { case_sensitive: ac, diacritics_sensitive: ad, inner: ai },
                Sensitive { case_sensitive: bc, diacritics_sensitive: bd, inner: bi },
            ) => ac == bc && ad == bd && ai == bi,
            (And { include: ai, exclude: ae }, And { include: bi, exclude: be })
            | (AndNot { include: ai, exclude: ae }, AndNot { include: bi, exclude: be }) => {
                ai == bi && ae == be
            }
            (Or { clauses: a }, Or { clauses: b }) | (Sequence { clauses: a }, Sequence { clauses: b }) => {
                a == b
            }
            (Not { inner: a }, Not { inner: b }) => a == b,
            (
                Within { search: a_s, container: a_c, invert: a_i },
                Within { search: b_s, container: b_c, invert: b_i },
            ) => a_i == b_i && a_s == b_s && a_c == b_c,
            (
                PositionFilter {
                    producer: ap,
                    filter: af,
                    operation: ao,
                    invert: ai,
                    left_adjust: al,
                    right_adjust: ar,
                },
                PositionFilter {
                    producer: bp,
                    filter: bf,
                    operation: bo,
                    invert: bi,
                    left_adjust: bl,
                    right_adjust: br,
                },
            ) => ao == bo && ai == bi && al == bl && ar == br && ap == bp && af == bf,
            // Distinct capture points never compare equal; see module docs.
            (CaptureGroup { .. }, CaptureGroup { .. }) => false,
            (AnyToken { min: a, max: am }, AnyToken { min: b, max: bm }) => a == b && am == bm,
            (
                FilterNGrams { filter: af, operation: ao, min: a, max: am },
                FilterNGrams { filter: bf, operation: bo, min: b, max: bm },
            ) => ao == bo && a == b && am == bm && af == bf,
            (
                Repetition { inner: ai, min: a, max: am },
                Repetition { inner: bi, min: b, max: bm },
            ) => a == b && am == bm && ai == bi,
            (
                Expansion { inner: ai, expand_to_left: al, min: a, max: am },
                Expansion { inner: bi, expand_to_left: bl, min: b, max: bm },
            ) => al == bl && a == b && am == bm && ai == bi,
            _ => false,
        }
    }
}

// ============================================================================
// Children
// ============================================================================

impl PatternNode {
    /// Child patterns, in order. For `And`/`AndNot` the include clauses come
    /// first, then the exclude clauses.
    pub fn children(&self) -> Vec<Pattern> {
        use PatternNode::*;
        match self {
            Term { .. } | Regex { .. } | Wildcard { .. } | Prefix { .. } | Fuzzy { .. }
            | Tags { .. } | AnyToken { .. } => Vec::new(),
            Property { inner, .. }
            | Sensitive { inner, .. }
            | Not { inner }
            | CaptureGroup { inner, .. }
            | Repetition { inner, .. }
            | Expansion { inner, .. } => vec![inner.clone()],
            FilterNGrams { filter, .. } => vec![filter.clone()],
            And { include, exclude } | AndNot { include, exclude } => {
                include.iter().chain(exclude).cloned().collect()
            }
            Or { clauses } | Sequence { clauses } => clauses.clone(),
            Within { search, container, .. } => vec![search.clone(), container.clone()],
            PositionFilter { producer, filter, .. } => vec![producer.clone(), filter.clone()],
        }
    }

    /// Does this variant hold child patterns?
    pub fn is_combinator(&self) -> bool {
        !matches!(
            self,
            PatternNode::Term { .. }
                | PatternNode::Regex { .. }
                | PatternNode::Wildcard { .. }
                | PatternNode::Prefix { .. }
                | PatternNode::Fuzzy { .. }
                | PatternNode::Tags { .. }
                | PatternNode::AnyToken { .. }
        )
    }
}

impl Pattern {
    /// The same variant with new children, given in [`PatternNode::children`]
    /// order.
    ///
    /// Returns `None` if the number of children doesn't fit the variant. For
    /// `And`/`AndNot` the include list keeps its current length; any further
    /// children become exclude clauses.
    pub fn with_children(&self, children: Vec<Pattern>) -> Option<Pattern> {
        use PatternNode::*;
        let node = match self.node() {
            Term { .. } | Regex { .. } | Wildcard { .. } | Prefix { .. } | Fuzzy { .. }
            | Tags { .. } | AnyToken { .. } => {
                return children.is_empty().then(|| self.clone());
            }
            And { include, .. } => {
                let (include, exclude) = split_clauses(children, include.len())?;
                And { include, exclude }
            }
            AndNot { include, .. } => {
                let (include, exclude) = split_clauses(children, include.len())?;
                AndNot { include, exclude }
            }
            Or { .. } => Or { clauses: children },
            Sequence { .. } => Sequence { clauses: children },
            Within { invert, .. } => {
                let [search, container] = two(children)?;
                Within {
                    search,
                    container,
                    invert: *invert,
                }
            }
            PositionFilter {
                operation,
                invert,
                left_adjust,
                right_adjust,
                ..
            } => {
                let [producer, filter] = two(children)?;
                PositionFilter {
                    producer,
                    filter,
                    operation: *operation,
                    invert: *invert,
                    left_adjust: *left_adjust,
                    right_adjust: *right_adjust,
                }
            }
            Property { name, .. } => Property {
                name: name.clone(),
                inner: one(children)?,
            },
            Sensitive {
                case_sensitive,
                diacritics_sensitive,
                ..
            } => Sensitive {
                case_sensitive: *case_sensitive,
                diacritics_sensitive: *diacritics_sensitive,
                inner: one(children)?,
            },
            Not { .. } => Not {
                inner: one(children)?,
            },
            CaptureGroup { name, .. } => CaptureGroup {
                inner: one(children)?,
                name: name.clone(),
            },
            Repetition { min, max, .. } => Repetition {
                inner: one(children)?,
                min: *min,
                max: *max,
            },
            Expansion {
                expand_to_left,
                min,
                max,
                ..
            } => Expansion {
                inner: one(children)?,
                expand_to_left: *expand_to_left,
                min: *min,
                max: *max,
            },
            FilterNGrams {
                operation, min, max, ..
            } => FilterNGrams {
                filter: one(children)?,
                operation: *operation,
                min: *min,
                max: *max,
            },
        };
        Some(Pattern::new(node))
    }

    /// Replace the child instance `old` (matched by identity) with zero or
    /// more replacements.
    ///
    /// List-valued slots (`Or`, `Sequence`, `And`/`AndNot` clause lists)
    /// accept any number of replacements; fixed slots need exactly one.
    /// Returns `None` if `old` is not a child of this node.
    pub fn replace_child(&self, old: &Pattern, replacements: &[Pattern]) -> Option<Pattern> {
        match self.node() {
            PatternNode::And { .. } | PatternNode::AndNot { .. } => self
                .replace_include(old, replacements)
                .or_else(|| self.replace_exclude(old, replacements)),
            PatternNode::Or { clauses } => splice(clauses, old, replacements).map(Pattern::or),
            PatternNode::Sequence { clauses } => {
                splice(clauses, old, replacements).map(Pattern::sequence)
            }
            _ => {
                let [replacement] = replacements else {
                    return None;
                };
                let mut children = self.children();
                let slot = children.iter_mut().find(|child| child.ptr_eq(old))?;
                *slot = replacement.clone();
                self.with_children(children)
            }
        }
    }

    /// Replace an include clause of an `And`/`AndNot` node.
    pub fn replace_include(&self, old: &Pattern, replacements: &[Pattern]) -> Option<Pattern> {
        match self.node() {
            PatternNode::And { include, exclude } => splice(include, old, replacements)
                .map(|include| Pattern::and_except(include, exclude.clone())),
            PatternNode::AndNot { include, exclude } => splice(include, old, replacements)
                .map(|include| Pattern::and_not(include, exclude.clone())),
            _ => None,
        }
    }

    /// Replace an exclude clause of an `And`/`AndNot` node.
    pub fn replace_exclude(&self, old: &Pattern, replacements: &[Pattern]) -> Option<Pattern> {
        match self.node() {
            PatternNode::And { include, exclude } => splice(exclude, old, replacements)
                .map(|exclude| Pattern::and_except(include.clone(), exclude)),
            PatternNode::AndNot { include, exclude } => splice(exclude, old, replacements)
                .map(|exclude| Pattern::and_not(include.clone(), exclude)),
            _ => None,
        }
    }
}

fn splice(list: &[Pattern], old: &Pattern, replacements: &[Pattern]) -> Option<Vec<Pattern>> {
    let index = list.iter().position(|clause| clause.ptr_eq(old))?;
    let mut spliced = Vec::with_capacity(list.len() + replacements.len());
    spliced.extend_from_slice(&list[..index]);
    spliced.extend_from_slice(replacements);
    spliced.extend_from_slice(&list[index + 1..]);
    Some(spliced)
}

fn split_clauses(mut children: Vec<Pattern>, include_len: usize) -> Option<(Vec<Pattern>, Vec<Pattern>)> {
    if children.len() < include_len {
        return None;
    }
    let exclude = children.split_off(include_len);
    Some((children, exclude))
}

fn one(children: Vec<Pattern>) -> Option<Pattern> {
    let [only] = <[Pattern; 1]>::try_from(children).ok()?;
    Some(only)
}

fn two(children: Vec<Pattern>) -> Option<[Pattern; 2]> {
    <[Pattern; 2]>::try_from(children).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_equality() {
        let a = Pattern::and([Pattern::term("x"), Pattern::term("y")]);
        let b = Pattern::and([Pattern::term("x"), Pattern::term("y")]);
        assert_eq!(a, b);
        assert!(!a.ptr_eq(&b));
        assert_ne!(a, Pattern::or([Pattern::term("x"), Pattern::term("y")]));
    }

    #[test]
    fn test_capture_groups_never_equal() {
        let a = Pattern::capture(Pattern::term("x"), "c");
        let b = Pattern::capture(Pattern::term("x"), "c");
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
        // Also inside larger trees
        assert_ne!(Pattern::not(a.clone()), Pattern::not(b));
        assert_eq!(Pattern::not(a.clone()), Pattern::not(a));
    }

    #[test]
    fn test_replace_child_splices_list() {
        let x = Pattern::term("x");
        let or = Pattern::or([x.clone(), Pattern::term("y")]);
        let replaced = or
            .replace_child(&x, &[Pattern::term("a"), Pattern::term("b")])
            .unwrap();
        assert_eq!(
            replaced,
            Pattern::or([Pattern::term("a"), Pattern::term("b"), Pattern::term("y")])
        );
    }

    #[test]
    fn test_replace_child_is_by_identity() {
        let or = Pattern::or([Pattern::term("x")]);
        // Structurally equal, but not the same instance
        assert!(or.replace_child(&Pattern::term("x"), &[]).is_none());
    }

    #[test]
    fn test_replace_fixed_slot_needs_one_replacement() {
        let inner = Pattern::term("x");
        let not = Pattern::not(inner.clone());
        assert!(not.replace_child(&inner, &[]).is_none());
        assert_eq!(
            not.replace_child(&inner, &[Pattern::term("y")]).unwrap(),
            Pattern::not(Pattern::term("y"))
        );
    }

    #[test]
    fn test_replace_include_and_exclude_independently() {
        let a = Pattern::term("a");
        let b = Pattern::term("b");
        let and = Pattern::and_except([a.clone()], [b.clone()]);
        let swapped = and
            .replace_include(&a, &[Pattern::term("c")])
            .and_then(|p| p.replace_exclude(&b, &[]))
            .unwrap();
        assert_eq!(swapped, Pattern::and([Pattern::term("c")]));
        assert!(and.replace_include(&b, &[]).is_none());
    }

    #[test]
    fn test_with_children_keeps_include_length() {
        let and = Pattern::and_except([Pattern::term("a")], [Pattern::term("b")]);
        let rebuilt = and
            .with_children(vec![Pattern::term("x"), Pattern::term("y"), Pattern::term("z")])
            .unwrap();
        assert_eq!(
            rebuilt,
            Pattern::and_except([Pattern::term("x")], [Pattern::term("y"), Pattern::term("z")])
        );
        assert!(Pattern::term("t").with_children(vec![Pattern::term("x")]).is_none());
    }
}
