//! corpus-query: a query algebra for annotated corpus search
//!
//! Corpus queries ("a noun, followed by up to three tokens, inside a sentence,
//! but not the word *brown*") are built as [`Pattern`] trees, normalized by an
//! algebraic rewriter and translated into backend queries over
//! `field%property@alternative` index fields.

pub mod config;
pub mod context;
pub mod error;
pub mod pretty;
pub mod query;
pub mod serialize;

pub use config::{defaults, SearchDefaults};
pub use context::{AlternativeSource, ExecutionContext, IndexAlternatives, ResolvedField};
pub use error::{QueryError, QueryResult};
pub use pretty::pretty_print;
pub use query::{
    rewrite, translate, Attributes, BooleanClauseBuilder, Occur, Operation, Pattern, PatternNode,
    SymbolicTranslator, Translator,
};
pub use serialize::{from_json, to_json};

/// Rewrite a pattern and translate the result.
pub fn compile<T: Translator + ?Sized>(
    pattern: &Pattern,
    translator: &T,
    ctx: &ExecutionContext,
) -> QueryResult<T::Output> {
    translate(&rewrite(pattern), translator, ctx)
}
