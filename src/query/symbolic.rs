//! Symbolic backend: renders the backend query as a string.
//!
//! Used to inspect what a pattern translates to (resolved fields, normalized
//! values) and as the reference backend in tests.

use super::backend::Translator;
use super::pattern::{Attributes, Operation};
use crate::context::{property_field, ExecutionContext, START_TAG_PROPERTY};
use crate::error::{QueryError, QueryResult};

/// Translator producing a readable rendering of the backend query.
#[derive(Clone, Copy, Debug, Default)]
pub struct SymbolicTranslator {
    reject_leading_wildcards: bool,
}

impl SymbolicTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse wildcard and regex terms that start with a wildcard, the way
    /// term-dictionary backends refuse to scan the whole dictionary.
    pub fn rejecting_leading_wildcards() -> Self {
        SymbolicTranslator {
            reject_leading_wildcards: true,
        }
    }

    fn check_broad(&self, kind: &str, value: &str, leading: &[char]) -> QueryResult<()> {
        if self.reject_leading_wildcards && value.starts_with(leading) {
            return Err(QueryError::too_broad(
                format!("{kind}({value})"),
                "leading wildcard would scan the whole term dictionary",
            ));
        }
        Ok(())
    }
}

fn join(clauses: &[String]) -> String {
    clauses.join(", ")
}

fn bound(max: Option<u32>) -> String {
    max.map_or_else(|| "INF".to_string(), |max| max.to_string())
}

impl Translator for SymbolicTranslator {
    type Output = String;

    fn term(&self, ctx: &ExecutionContext, value: &str) -> QueryResult<String> {
        let field = ctx.resolve()?;
        Ok(format!("term({}:{})", field.name, field.index_value(value)))
    }

    fn regex(&self, ctx: &ExecutionContext, value: &str) -> QueryResult<String> {
        self.check_broad("regex", value, &['.'])?;
        let field = ctx.resolve()?;
        Ok(format!("regex({}:{})", field.name, field.qualify(value)))
    }

    fn wildcard(&self, ctx: &ExecutionContext, value: &str) -> QueryResult<String> {
        self.check_broad("wildcard", value, &['*', '?'])?;
        let field = ctx.resolve()?;
        Ok(format!("wildcard({}:{})", field.name, field.index_value(value)))
    }

    fn prefix(&self, ctx: &ExecutionContext, value: &str) -> QueryResult<String> {
        if self.reject_leading_wildcards && value.is_empty() {
            return Err(QueryError::too_broad(
                "prefix()",
                "empty prefix matches every term",
            ));
        }
        let field = ctx.resolve()?;
        Ok(format!("prefix({}:{})", field.name, field.index_value(value)))
    }

    fn fuzzy(
        &self,
        ctx: &ExecutionContext,
        value: &str,
        max_edits: u32,
        prefix_length: u32,
    ) -> QueryResult<String> {
        let field = ctx.resolve()?;
        Ok(format!(
            "fuzzy({}:{}, {max_edits}, {prefix_length})",
            field.name,
            field.index_value(value)
        ))
    }

    fn tags(
        &self,
        ctx: &ExecutionContext,
        element: &str,
        attributes: &Attributes,
    ) -> QueryResult<String> {
        let mut out = format!(
            "tags({}:{element}",
            property_field(ctx.field(), START_TAG_PROPERTY, None)
        );
        for (name, value) in attributes {
            out.push_str(&format!(", @{name}={value}"));
        }
        out.push(')');
        Ok(out)
    }

    fn any_token(&self, ctx: &ExecutionContext, min: u32, max: Option<u32>) -> QueryResult<String> {
        // Any token of the property will do, whatever its alternatives
        ctx.resolve()?;
        Ok(format!(
            "any({}, {min}, {})",
            property_field(ctx.field(), ctx.property(), None),
            bound(max)
        ))
    }

    fn and(&self, _ctx: &ExecutionContext, clauses: Vec<String>) -> QueryResult<String> {
        Ok(format!("and({})", join(&clauses)))
    }

    fn or(&self, _ctx: &ExecutionContext, clauses: Vec<String>) -> QueryResult<String> {
        Ok(format!("or({})", join(&clauses)))
    }

    fn and_not(&self, _ctx: &ExecutionContext, include: String, exclude: String) -> QueryResult<String> {
        Ok(format!("and_not({include}, {exclude})"))
    }

    fn not(&self, _ctx: &ExecutionContext, clause: String) -> QueryResult<String> {
        Ok(format!("not({clause})"))
    }

    fn sequence(&self, _ctx: &ExecutionContext, clauses: Vec<String>) -> QueryResult<String> {
        Ok(format!("seq({})", join(&clauses)))
    }

    fn position_filter(
        &self,
        _ctx: &ExecutionContext,
        producer: String,
        filter: String,
        operation: Operation,
        invert: bool,
        left_adjust: i32,
        right_adjust: i32,
    ) -> QueryResult<String> {
        Ok(format!(
            "posfilter({producer}, {filter}, {operation}, {invert}, {left_adjust}, {right_adjust})"
        ))
    }

    fn within(&self, _ctx: &ExecutionContext, search: String, container: String) -> QueryResult<String> {
        Ok(format!("within({search}, {container})"))
    }

    fn starts_at(&self, _ctx: &ExecutionContext, producer: String, filter: String) -> QueryResult<String> {
        Ok(format!("starts_at({producer}, {filter})"))
    }

    fn ends_at(&self, _ctx: &ExecutionContext, producer: String, filter: String) -> QueryResult<String> {
        Ok(format!("ends_at({producer}, {filter})"))
    }

    fn capture_group(&self, clause: String, name: &str) -> QueryResult<String> {
        Ok(format!("capture({clause}, {name})"))
    }

    fn repetition(&self, clause: String, min: u32, max: Option<u32>) -> QueryResult<String> {
        Ok(format!("rep({clause}, {min}, {})", bound(max)))
    }

    fn expand(
        &self,
        clause: String,
        expand_to_left: bool,
        min: u32,
        max: Option<u32>,
    ) -> QueryResult<String> {
        let direction = if expand_to_left { "left" } else { "right" };
        Ok(format!("expand({clause}, {direction}, {min}, {})", bound(max)))
    }

    fn filter_ngrams(
        &self,
        ctx: &ExecutionContext,
        filter: String,
        operation: Operation,
        min: u32,
        max: Option<u32>,
    ) -> QueryResult<String> {
        ctx.resolve()?;
        Ok(format!(
            "ngrams({}, {filter}, {operation}, {min}, {})",
            property_field(ctx.field(), ctx.property(), None),
            bound(max)
        ))
    }
}
