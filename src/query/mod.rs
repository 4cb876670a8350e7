//! Query algebra for annotated corpus search.
//!
//! # Pipeline
//!
//! 1. **Build** a [`Pattern`] tree, directly or from boolean clauses with
//!    [`BooleanClauseBuilder`].
//! 2. **Rewrite** it into normal form with [`rewrite`]: flattened, double
//!    negations removed, negative clauses moved to exclude lists, sequences
//!    combined. Rewriting preserves the set of hits.
//! 3. **Translate** the normal form with [`translate`] and a backend
//!    [`Translator`], resolving fields through an
//!    [`ExecutionContext`](crate::context::ExecutionContext).
//!
//! Pattern trees are immutable and share subtrees freely, so they can be
//! rewritten and translated from several threads at once.

pub mod backend;
pub mod clauses;
pub mod optimize;
mod pattern;
mod props;
pub mod symbolic;

pub use backend::{translate, Translator};
pub use clauses::{BooleanClauseBuilder, Occur};
pub use optimize::rewrite;
pub use pattern::{Attributes, Operation, Pattern, PatternNode};
pub use symbolic::SymbolicTranslator;
