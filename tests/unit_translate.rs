//! Unit tests for translation through the symbolic backend

use std::sync::Arc;

use corpus_query::{
    compile, translate, AlternativeSource, Attributes, BooleanClauseBuilder, ExecutionContext,
    IndexAlternatives, Operation, Pattern, QueryError, SymbolicTranslator,
};

fn context() -> ExecutionContext {
    let index: Arc<dyn AlternativeSource> = Arc::new(
        IndexAlternatives::new()
            .with_property("contents", "word", ["s", "i"])
            .with_property("contents", "lemma", ["s", "i", "ci", "di"])
            .with_property("contents", "pos", ["s"]),
    );
    ExecutionContext::new("contents", "word", false, false, index)
}

fn symbolic(pattern: &Pattern) -> Result<String, QueryError> {
    compile(pattern, &SymbolicTranslator::new(), &context())
}

#[test]
fn test_term_uses_insensitive_alternative() {
    assert_eq!(
        symbolic(&Pattern::term("Café")).unwrap(),
        "term(contents%word@i:cafe)"
    );
}

#[test]
fn test_sensitive_term() {
    let pattern = Pattern::sensitive(true, true, Pattern::term("Café"));
    assert_eq!(symbolic(&pattern).unwrap(), "term(contents%word@s:Café)");
}

#[test]
fn test_property_switch() {
    let pattern = Pattern::sequence([
        Pattern::property("lemma", Pattern::sensitive(false, true, Pattern::term("Être"))),
        Pattern::property("pos:number", Pattern::term("sg")),
    ]);
    assert_eq!(
        symbolic(&pattern).unwrap(),
        "seq(term(contents%lemma@ci:être), term(contents%pos@s:number\u{1F}sg))"
    );
}

#[test]
fn test_and_not_translation() {
    let pattern = Pattern::and([Pattern::term("cow"), Pattern::not(Pattern::term("brown"))]);
    assert_eq!(
        symbolic(&pattern).unwrap(),
        "and_not(term(contents%word@i:cow), term(contents%word@i:brown))"
    );
}

#[test]
fn test_multiple_excludes_are_ored() {
    let pattern = Pattern::and_except(
        [Pattern::term("a"), Pattern::term("b")],
        [Pattern::term("c"), Pattern::term("d")],
    );
    assert_eq!(
        symbolic(&pattern).unwrap(),
        "and_not(and(term(contents%word@i:a), term(contents%word@i:b)), \
         or(term(contents%word@i:c), term(contents%word@i:d)))"
    );
}

#[test]
fn test_de_morgan_translation() {
    let pattern = Pattern::or([Pattern::term("a"), Pattern::not(Pattern::term("b"))]);
    assert_eq!(
        symbolic(&pattern).unwrap(),
        "not(and_not(term(contents%word@i:b), term(contents%word@i:a)))"
    );
}

#[test]
fn test_untranslatable_without_rewrite() {
    let pattern = Pattern::and_except(Vec::new(), [Pattern::term("x")]);
    let result = translate(&pattern, &SymbolicTranslator::new(), &context());
    assert!(matches!(
        result,
        Err(QueryError::UntranslatableNegativePattern { .. })
    ));
}

#[test]
fn test_unknown_property() {
    let pattern = Pattern::property("nonexistent", Pattern::term("x"));
    assert_eq!(
        symbolic(&pattern),
        Err(QueryError::field_not_found("contents", "nonexistent"))
    );
}

#[test]
fn test_too_broad_propagates() {
    let pattern = Pattern::and([
        Pattern::term("a"),
        Pattern::or([Pattern::term("b"), Pattern::wildcard("*ing")]),
    ]);
    let result = compile(&pattern, &SymbolicTranslator::rejecting_leading_wildcards(), &context());
    assert!(matches!(result, Err(QueryError::QueryTooBroad { .. })));
    // Accepted when the backend doesn't mind
    assert!(symbolic(&pattern).is_ok());
}

#[test]
fn test_empty_or_is_refused() {
    let result = translate(&Pattern::or(Vec::new()), &SymbolicTranslator::new(), &context());
    assert_eq!(result, Err(QueryError::EmptyClauseList { operator: "OR" }));
}

#[test]
fn test_tags_and_position_filters() {
    let mut attributes = Attributes::new();
    attributes.insert("type".to_string(), "person".to_string());
    let pattern = Pattern::within(
        Pattern::term("john"),
        Pattern::tags_with_attributes("ne", attributes),
    );
    assert_eq!(
        symbolic(&pattern).unwrap(),
        "within(term(contents%word@i:john), tags(contents%starttag:ne, @type=person))"
    );

    let not_within = Pattern::not(Pattern::within(Pattern::term("x"), Pattern::tags("s")));
    assert_eq!(
        symbolic(&not_within).unwrap(),
        "posfilter(term(contents%word@i:x), tags(contents%starttag:s), WITHIN, true, 0, 0)"
    );

    let starts = Pattern::position_filter(
        Pattern::term("x"),
        Pattern::tags("s"),
        Operation::StartsAt,
        false,
    );
    assert_eq!(
        symbolic(&starts).unwrap(),
        "starts_at(term(contents%word@i:x), tags(contents%starttag:s))"
    );
}

#[test]
fn test_ngram_translation() {
    let pattern = Pattern::position_filter(
        Pattern::any_token(1, Some(3)),
        Pattern::tags("s"),
        Operation::Containing,
        false,
    );
    assert_eq!(
        symbolic(&pattern).unwrap(),
        "ngrams(contents%word, tags(contents%starttag:s), CONTAINING, 1, 3)"
    );
}

#[test]
fn test_boolean_clauses_to_backend() {
    let pattern = BooleanClauseBuilder::new()
        .must(Pattern::term("a"))
        .should(Pattern::term("b"))
        .must_not(Pattern::term("c"))
        .build()
        .unwrap();
    assert_eq!(
        symbolic(&pattern).unwrap(),
        "and_not(and(term(contents%word@i:a), term(contents%word@i:b)), term(contents%word@i:c))"
    );
}

#[test]
fn test_tags_with_several_attributes() {
    let mut attributes = Attributes::new();
    attributes.insert("type".to_string(), "person".to_string());
    attributes.insert("lang".to_string(), "nl".to_string());
    assert_eq!(
        symbolic(&Pattern::tags_with_attributes("ne", attributes)).unwrap(),
        "tags(contents%starttag:ne, @type=person, @lang=nl)"
    );
}

#[test]
fn test_unknown_property_under_token_ranges() {
    let any = Pattern::property("nonexistent", Pattern::any_token(1, Some(2)));
    assert_eq!(
        symbolic(&any),
        Err(QueryError::field_not_found("contents", "nonexistent"))
    );

    let ngrams = Pattern::property(
        "nonexistent",
        Pattern::position_filter(
            Pattern::any_token(1, Some(3)),
            Pattern::tags("s"),
            Operation::Containing,
            false,
        ),
    );
    assert_eq!(
        symbolic(&ngrams),
        Err(QueryError::field_not_found("contents", "nonexistent"))
    );
}

#[test]
fn test_not_containing_translation() {
    let pattern = Pattern::sequence([Pattern::term("cow"), Pattern::not(Pattern::term("brown"))]);
    assert_eq!(
        symbolic(&pattern).unwrap(),
        "posfilter(expand(term(contents%word@i:cow), right, 1, 1), \
         term(contents%word@i:brown), CONTAINING, true, 1, 0)"
    );
}
