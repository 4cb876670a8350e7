//! Pretty-printer for pattern trees
//!
//! `Display` renders a pattern on one line in functional notation, e.g.
//! `ANDNOT([TERM(cow)], [TERM(brown)])`. [`pretty_print`] breaks long
//! patterns over several indented lines.

use std::fmt;

use crate::query::{Pattern, PatternNode};

/// Pretty-print configuration
pub struct PrettyConfig {
    pub indent: usize,
    /// Patterns whose one-line form fits in this many columns stay on one line
    pub width: usize,
}

impl Default for PrettyConfig {
    fn default() -> Self {
        Self {
            indent: 2,
            width: 60,
        }
    }
}

/// One argument of a rendered node.
enum Arg<'a> {
    Pattern(&'a Pattern),
    List(&'a [Pattern]),
    Scalar(String),
}

fn bound(max: Option<u32>) -> String {
    max.map_or_else(|| "INF".to_string(), |max| max.to_string())
}

/// Operator name and arguments of a node, shared by both renderings.
fn layout(node: &PatternNode) -> (&'static str, Vec<Arg<'_>>) {
    use PatternNode::*;
    match node {
        Term { value } => ("TERM", vec![Arg::Scalar(value.clone())]),
        Regex { value } => ("REGEX", vec![Arg::Scalar(value.clone())]),
        Wildcard { value } => ("WILDCARD", vec![Arg::Scalar(value.clone())]),
        Prefix { value } => ("PREFIX", vec![Arg::Scalar(value.clone())]),
        Fuzzy {
            value,
            max_edits,
            prefix_length,
        } => (
            "FUZZY",
            vec![
                Arg::Scalar(value.clone()),
                Arg::Scalar(max_edits.to_string()),
                Arg::Scalar(prefix_length.to_string()),
            ],
        ),
        Tags {
            element,
            attributes,
        } => {
            let mut args = vec![Arg::Scalar(element.clone())];
            args.extend(
                attributes
                    .iter()
                    .map(|(name, value)| Arg::Scalar(format!("{name}={value}"))),
            );
            ("TAGS", args)
        }
        Property { name, inner } => ("PROP", vec![Arg::Scalar(name.clone()), Arg::Pattern(inner)]),
        Sensitive {
            case_sensitive,
            diacritics_sensitive,
            inner,
        } => (
            "SENSITIVE",
            vec![
                Arg::Scalar(case_sensitive.to_string()),
                Arg::Scalar(diacritics_sensitive.to_string()),
                Arg::Pattern(inner),
            ],
        ),
        And { include, exclude } if exclude.is_empty() => {
            ("AND", include.iter().map(Arg::Pattern).collect())
        }
        And { include, exclude } => ("ANDNOT", vec![Arg::List(include), Arg::List(exclude)]),
        AndNot { include, exclude } => ("DOCANDNOT", vec![Arg::List(include), Arg::List(exclude)]),
        Or { clauses } => ("OR", clauses.iter().map(Arg::Pattern).collect()),
        Not { inner } => ("NOT", vec![Arg::Pattern(inner)]),
        Within {
            search,
            container,
            invert,
        } => (
            if *invert { "NOTWITHIN" } else { "WITHIN" },
            vec![Arg::Pattern(search), Arg::Pattern(container)],
        ),
        PositionFilter {
            producer,
            filter,
            operation,
            invert,
            left_adjust,
            right_adjust,
        } => (
            "POSFILTER",
            vec![
                Arg::Pattern(producer),
                Arg::Pattern(filter),
                Arg::Scalar(operation.to_string()),
                Arg::Scalar(invert.to_string()),
                Arg::Scalar(left_adjust.to_string()),
                Arg::Scalar(right_adjust.to_string()),
            ],
        ),
        CaptureGroup { inner, name } => ("CAPTURE", vec![Arg::Pattern(inner), Arg::Scalar(name.clone())]),
        AnyToken { min, max } => (
            "ANYTOKEN",
            vec![Arg::Scalar(min.to_string()), Arg::Scalar(bound(*max))],
        ),
        FilterNGrams {
            filter,
            operation,
            min,
            max,
        } => (
            "FILTERNGRAMS",
            vec![
                Arg::Pattern(filter),
                Arg::Scalar(operation.to_string()),
                Arg::Scalar(min.to_string()),
                Arg::Scalar(bound(*max)),
            ],
        ),
        Repetition { inner, min, max } => (
            "REP",
            vec![
                Arg::Pattern(inner),
                Arg::Scalar(min.to_string()),
                Arg::Scalar(bound(*max)),
            ],
        ),
        Sequence { clauses } => ("SEQ", clauses.iter().map(Arg::Pattern).collect()),
        Expansion {
            inner,
            expand_to_left,
            min,
            max,
        } => (
            "EXPAND",
            vec![
                Arg::Pattern(inner),
                Arg::Scalar(if *expand_to_left { "LEFT" } else { "RIGHT" }.to_string()),
                Arg::Scalar(min.to_string()),
                Arg::Scalar(bound(*max)),
            ],
        ),
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, clauses: &[Pattern]) -> fmt::Result {
    for (i, clause) in clauses.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{clause}")?;
    }
    Ok(())
}

impl fmt::Display for PatternNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (name, args) = layout(self);
        write!(f, "{name}(")?;
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match arg {
                Arg::Pattern(pattern) => write!(f, "{pattern}")?,
                Arg::List(clauses) => {
                    f.write_str("[")?;
                    write_list(f, clauses)?;
                    f.write_str("]")?;
                }
                Arg::Scalar(text) => f.write_str(text)?,
            }
        }
        f.write_str(")")
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.node(), f)
    }
}

/// A pretty-printer with indentation tracking
pub struct Pretty {
    output: String,
    indent_level: usize,
    config: PrettyConfig,
}

impl Default for Pretty {
    fn default() -> Self {
        Self::new()
    }
}

impl Pretty {
    pub fn new() -> Self {
        Self::with_config(PrettyConfig::default())
    }

    pub fn with_config(config: PrettyConfig) -> Self {
        Self {
            output: String::new(),
            indent_level: 0,
            config,
        }
    }

    pub fn finish(self) -> String {
        self.output
    }

    fn indent(&mut self) {
        for _ in 0..(self.indent_level * self.config.indent) {
            self.output.push(' ');
        }
    }

    fn write(&mut self, s: &str) {
        self.output.push_str(s);
    }

    fn newline(&mut self) {
        self.output.push('\n');
    }

    fn inc_indent(&mut self) {
        self.indent_level += 1;
    }

    fn dec_indent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }

    /// Print a pattern starting at the current position.
    pub fn pattern(&mut self, pattern: &Pattern) {
        let compact = pattern.to_string();
        let column = self.indent_level * self.config.indent;
        if !pattern.is_combinator() || column + compact.len() <= self.config.width {
            self.write(&compact);
            return;
        }

        let (name, args) = layout(pattern.node());
        self.write(name);
        self.write("(");
        self.newline();
        self.inc_indent();
        let last = args.len().saturating_sub(1);
        for (i, arg) in args.iter().enumerate() {
            self.indent();
            match arg {
                Arg::Pattern(pattern) => self.pattern(pattern),
                Arg::List(clauses) => self.list(clauses),
                Arg::Scalar(text) => self.write(text),
            }
            if i < last {
                self.write(",");
            }
            self.newline();
        }
        self.dec_indent();
        self.indent();
        self.write(")");
    }

    fn list(&mut self, clauses: &[Pattern]) {
        if clauses.is_empty() {
            self.write("[]");
            return;
        }
        self.write("[");
        self.newline();
        self.inc_indent();
        for (i, clause) in clauses.iter().enumerate() {
            self.indent();
            self.pattern(clause);
            if i + 1 < clauses.len() {
                self.write(",");
            }
            self.newline();
        }
        self.dec_indent();
        self.indent();
        self.write("]");
    }
}

/// Render a pattern over several lines if it doesn't fit on one.
pub fn pretty_print(pattern: &Pattern) -> String {
    let mut pretty = Pretty::new();
    pretty.pattern(pattern);
    pretty.finish()
}
