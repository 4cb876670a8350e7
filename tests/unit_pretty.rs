//! Unit tests for pattern rendering

use corpus_query::pretty::{Pretty, PrettyConfig};
use corpus_query::{pretty_print, Attributes, Operation, Pattern};

#[test]
fn test_render_leaves() {
    assert_eq!(Pattern::term("cow").to_string(), "TERM(cow)");
    assert_eq!(Pattern::regex("co.*").to_string(), "REGEX(co.*)");
    assert_eq!(Pattern::fuzzy("cow", 2, 1).to_string(), "FUZZY(cow, 2, 1)");
    assert_eq!(Pattern::any_token(1, None).to_string(), "ANYTOKEN(1, INF)");

    let mut attributes = Attributes::new();
    attributes.insert("type".to_string(), "person".to_string());
    attributes.insert("lang".to_string(), "en".to_string());
    assert_eq!(
        Pattern::tags_with_attributes("ne", attributes).to_string(),
        "TAGS(ne, type=person, lang=en)"
    );
}

#[test]
fn test_render_composites() {
    let pattern = Pattern::sequence([
        Pattern::capture(Pattern::term("a"), "first"),
        Pattern::not_within(Pattern::term("b"), Pattern::tags("s")),
        Pattern::expansion(Pattern::term("c"), true, 0, Some(2)),
    ]);
    assert_eq!(
        pattern.to_string(),
        "SEQ(CAPTURE(TERM(a), first), NOTWITHIN(TERM(b), TAGS(s)), EXPAND(TERM(c), LEFT, 0, 2))"
    );

    let filter = Pattern::position_filter_adjusted(
        Pattern::term("x"),
        Pattern::tags("p"),
        Operation::ContainingAtEnd,
        true,
        1,
        -2,
    );
    assert_eq!(
        filter.to_string(),
        "POSFILTER(TERM(x), TAGS(p), CONTAINING_AT_END, true, 1, -2)"
    );
}

#[test]
fn test_short_pattern_stays_on_one_line() {
    let pattern = Pattern::or([Pattern::term("a"), Pattern::term("b")]);
    assert_eq!(pretty_print(&pattern), pattern.to_string());
}

#[test]
fn test_long_pattern_breaks_lines() {
    let pattern = Pattern::and_except(
        [Pattern::term("a")],
        [Pattern::term("b"), Pattern::term("c")],
    );
    let mut pretty = Pretty::with_config(PrettyConfig {
        indent: 2,
        width: 10,
    });
    pretty.pattern(&pattern);
    let expected = "\
ANDNOT(
  [
    TERM(a)
  ],
  [
    TERM(b),
    TERM(c)
  ]
)";
    assert_eq!(pretty.finish(), expected);
}
