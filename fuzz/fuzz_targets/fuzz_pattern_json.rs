//! Fuzz pattern decoding, rewriting and translation
//!
//! Whatever pattern the JSON decodes to, rewriting must reach a fixpoint and
//! translation must not panic.

#![no_main]

use std::sync::Arc;

use corpus_query::{compile, from_json, rewrite, AlternativeSource, ExecutionContext, SymbolicTranslator};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    // Malformed input must be an error, not a panic
    let Ok(pattern) = from_json(input) else {
        return;
    };

    let rewritten = rewrite(&pattern);
    assert!(rewrite(&rewritten).ptr_eq(&rewritten), "rewrite is not idempotent");

    let source: Arc<dyn AlternativeSource> =
        Arc::new(|_: &str, _: &str| -> Option<Vec<String>> { Some(vec!["s".to_string()]) });
    let ctx = ExecutionContext::new("contents", "word", false, false, source);
    let _ = compile(&pattern, &SymbolicTranslator::new(), &ctx);
});
