//! Translator protocol: turning a pattern tree into a backend query.
//!
//! A backend implements [`Translator`], one method per query primitive.
//! [`translate`] walks the tree, narrows the [`ExecutionContext`] at
//! `PROP`/`SENSITIVE` nodes, translates children first and hands their
//! results to the translator.
//!
//! Patterns should be rewritten first (see [`crate::query::rewrite`]): a
//! conjunction with no include clause has nothing to drive matching and is
//! refused with [`QueryError::UntranslatableNegativePattern`].

use tracing::debug;

use super::pattern::{Attributes, Operation, Pattern, PatternNode};
use crate::context::ExecutionContext;
use crate::error::{QueryError, QueryResult};

/// A query backend.
///
/// Every method may fail, e.g. with [`QueryError::QueryTooBroad`]; the first
/// failure aborts the translation.
pub trait Translator {
    type Output;

    fn term(&self, ctx: &ExecutionContext, value: &str) -> QueryResult<Self::Output>;

    fn regex(&self, ctx: &ExecutionContext, value: &str) -> QueryResult<Self::Output>;

    fn wildcard(&self, ctx: &ExecutionContext, value: &str) -> QueryResult<Self::Output>;

    fn prefix(&self, ctx: &ExecutionContext, value: &str) -> QueryResult<Self::Output>;

    fn fuzzy(
        &self,
        ctx: &ExecutionContext,
        value: &str,
        max_edits: u32,
        prefix_length: u32,
    ) -> QueryResult<Self::Output>;

    fn tags(
        &self,
        ctx: &ExecutionContext,
        element: &str,
        attributes: &Attributes,
    ) -> QueryResult<Self::Output>;

    fn any_token(
        &self,
        ctx: &ExecutionContext,
        min: u32,
        max: Option<u32>,
    ) -> QueryResult<Self::Output>;

    /// Token-level conjunction of at least two clauses.
    fn and(&self, ctx: &ExecutionContext, clauses: Vec<Self::Output>) -> QueryResult<Self::Output>;

    /// Disjunction of at least two clauses.
    fn or(&self, ctx: &ExecutionContext, clauses: Vec<Self::Output>) -> QueryResult<Self::Output>;

    /// Hits of `include` that are not hits of `exclude`.
    fn and_not(
        &self,
        ctx: &ExecutionContext,
        include: Self::Output,
        exclude: Self::Output,
    ) -> QueryResult<Self::Output>;

    /// Single tokens not matching `clause`.
    fn not(&self, ctx: &ExecutionContext, clause: Self::Output) -> QueryResult<Self::Output>;

    /// Sequence of at least two clauses.
    fn sequence(
        &self,
        ctx: &ExecutionContext,
        clauses: Vec<Self::Output>,
    ) -> QueryResult<Self::Output>;

    #[allow(clippy::too_many_arguments)]
    fn position_filter(
        &self,
        ctx: &ExecutionContext,
        producer: Self::Output,
        filter: Self::Output,
        operation: Operation,
        invert: bool,
        left_adjust: i32,
        right_adjust: i32,
    ) -> QueryResult<Self::Output>;

    fn within(
        &self,
        ctx: &ExecutionContext,
        search: Self::Output,
        container: Self::Output,
    ) -> QueryResult<Self::Output> {
        self.position_filter(ctx, search, container, Operation::Within, false, 0, 0)
    }

    fn starts_at(
        &self,
        ctx: &ExecutionContext,
        producer: Self::Output,
        filter: Self::Output,
    ) -> QueryResult<Self::Output> {
        self.position_filter(ctx, producer, filter, Operation::StartsAt, false, 0, 0)
    }

    fn ends_at(
        &self,
        ctx: &ExecutionContext,
        producer: Self::Output,
        filter: Self::Output,
    ) -> QueryResult<Self::Output> {
        self.position_filter(ctx, producer, filter, Operation::EndsAt, false, 0, 0)
    }

    fn capture_group(&self, clause: Self::Output, name: &str) -> QueryResult<Self::Output>;

    fn repetition(
        &self,
        clause: Self::Output,
        min: u32,
        max: Option<u32>,
    ) -> QueryResult<Self::Output>;

    fn expand(
        &self,
        clause: Self::Output,
        expand_to_left: bool,
        min: u32,
        max: Option<u32>,
    ) -> QueryResult<Self::Output>;

    fn filter_ngrams(
        &self,
        ctx: &ExecutionContext,
        filter: Self::Output,
        operation: Operation,
        min: u32,
        max: Option<u32>,
    ) -> QueryResult<Self::Output>;
}

/// Translate a pattern tree with the given backend.
pub fn translate<T: Translator + ?Sized>(
    pattern: &Pattern,
    translator: &T,
    ctx: &ExecutionContext,
) -> QueryResult<T::Output> {
    debug!(
        pattern = %pattern,
        field = ctx.field(),
        property = ctx.property(),
        "translating pattern"
    );
    translate_node(pattern, translator, ctx)
}

fn translate_node<T: Translator + ?Sized>(
    pattern: &Pattern,
    translator: &T,
    ctx: &ExecutionContext,
) -> QueryResult<T::Output> {
    use PatternNode::*;
    match pattern.node() {
        Term { value } => translator.term(ctx, value),
        Regex { value } => translator.regex(ctx, value),
        Wildcard { value } => translator.wildcard(ctx, value),
        Prefix { value } => translator.prefix(ctx, value),
        Fuzzy {
            value,
            max_edits,
            prefix_length,
        } => translator.fuzzy(ctx, value, *max_edits, *prefix_length),
        Tags {
            element,
            attributes,
        } => translator.tags(ctx, element, attributes),
        AnyToken { min, max } => translator.any_token(ctx, *min, *max),

        Property { name, inner } => translate_node(inner, translator, &ctx.with_property(name)),

        Sensitive {
            case_sensitive,
            diacritics_sensitive,
            inner,
        } => translate_node(
            inner,
            translator,
            &ctx.with_sensitivity(*case_sensitive, *diacritics_sensitive),
        ),

        And { include, exclude } | AndNot { include, exclude } => {
            translate_conjunction(pattern, include, exclude, translator, ctx)
        }

        Or { clauses } => {
            let clauses = translate_all(clauses, translator, ctx)?;
            combine(clauses, "OR", |clauses| translator.or(ctx, clauses))
        }

        Not { inner } => {
            let clause = translate_node(inner, translator, ctx)?;
            translator.not(ctx, clause)
        }

        Within {
            search,
            container,
            invert,
        } => {
            let search = translate_node(search, translator, ctx)?;
            let container = translate_node(container, translator, ctx)?;
            if *invert {
                translator.position_filter(ctx, search, container, Operation::Within, true, 0, 0)
            } else {
                translator.within(ctx, search, container)
            }
        }

        PositionFilter {
            producer,
            filter,
            operation,
            invert,
            left_adjust,
            right_adjust,
        } => {
            let producer = translate_node(producer, translator, ctx)?;
            let filter = translate_node(filter, translator, ctx)?;
            let plain = !*invert && *left_adjust == 0 && *right_adjust == 0;
            match operation {
                Operation::StartsAt if plain => translator.starts_at(ctx, producer, filter),
                Operation::EndsAt if plain => translator.ends_at(ctx, producer, filter),
                _ => translator.position_filter(
                    ctx,
                    producer,
                    filter,
                    *operation,
                    *invert,
                    *left_adjust,
                    *right_adjust,
                ),
            }
        }

        CaptureGroup { inner, name } => {
            let clause = translate_node(inner, translator, ctx)?;
            translator.capture_group(clause, name)
        }

        FilterNGrams {
            filter,
            operation,
            min,
            max,
        } => {
            let filter = translate_node(filter, translator, ctx)?;
            translator.filter_ngrams(ctx, filter, *operation, *min, *max)
        }

        Repetition { inner, min, max } => {
            let clause = translate_node(inner, translator, ctx)?;
            translator.repetition(clause, *min, *max)
        }

        Sequence { clauses } => {
            let clauses = translate_all(clauses, translator, ctx)?;
            combine(clauses, "SEQ", |clauses| translator.sequence(ctx, clauses))
        }

        Expansion {
            inner,
            expand_to_left,
            min,
            max,
        } => {
            let clause = translate_node(inner, translator, ctx)?;
            translator.expand(clause, *expand_to_left, *min, *max)
        }
    }
}

/// AND/ANDNOT become `and_not(and(include), or(exclude))`, skipping the
/// parts that have a single clause or none.
fn translate_conjunction<T: Translator + ?Sized>(
    pattern: &Pattern,
    include: &[Pattern],
    exclude: &[Pattern],
    translator: &T,
    ctx: &ExecutionContext,
) -> QueryResult<T::Output> {
    if include.is_empty() {
        return Err(QueryError::UntranslatableNegativePattern {
            pattern: pattern.to_string(),
        });
    }
    let include = translate_all(include, translator, ctx)?;
    let positive = combine(include, "AND", |clauses| translator.and(ctx, clauses))?;
    if exclude.is_empty() {
        return Ok(positive);
    }
    let exclude = translate_all(exclude, translator, ctx)?;
    let negative = combine(exclude, "OR", |clauses| translator.or(ctx, clauses))?;
    translator.and_not(ctx, positive, negative)
}

fn translate_all<T: Translator + ?Sized>(
    clauses: &[Pattern],
    translator: &T,
    ctx: &ExecutionContext,
) -> QueryResult<Vec<T::Output>> {
    clauses
        .iter()
        .map(|clause| translate_node(clause, translator, ctx))
        .collect()
}

/// Hand a clause list to a combining primitive; a single clause passes
/// through as is.
fn combine<O>(
    mut clauses: Vec<O>,
    operator: &'static str,
    build: impl FnOnce(Vec<O>) -> QueryResult<O>,
) -> QueryResult<O> {
    if clauses.len() > 1 {
        return build(clauses);
    }
    clauses.pop().ok_or(QueryError::EmptyClauseList { operator })
}
