//! Execution context threaded through translation.
//!
//! The context says which annotated field and annotation (property) a leaf
//! searches, and with what case and diacritics sensitivity. Indexes store each
//! annotation in one or more *alternatives*, one per normalization:
//!
//! | alternative | case | diacritics |
//! |-------------|------|------------|
//! | `s`         | kept | kept       |
//! | `i`         | folded | stripped |
//! | `ci`        | folded | kept     |
//! | `di`        | kept | stripped   |
//!
//! Resolution picks the best available alternative for the requested
//! sensitivity and names the backend field `field%property@alternative`.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::warn;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::config::{self, SearchDefaults};
use crate::error::{QueryError, QueryResult};

pub const SENSITIVE: &str = "s";
pub const INSENSITIVE: &str = "i";
pub const CASE_INSENSITIVE: &str = "ci";
pub const DIACRITICS_INSENSITIVE: &str = "di";

/// Bookkeeping property holding start tags; it has no alternatives.
pub const START_TAG_PROPERTY: &str = "starttag";

const PROPERTY_SEPARATOR: char = '%';
const ALTERNATIVE_SEPARATOR: char = '@';
const SUBPROPERTY_SEPARATOR: char = ':';
const SUBPROPERTY_VALUE_SEPARATOR: char = '\u{1F}';

/// Index metadata: which alternatives exist for an annotation.
pub trait AlternativeSource: Send + Sync {
    /// Alternatives indexed for `field`/`property`, or `None` if the index
    /// has no such annotation.
    fn available_alternatives(&self, field: &str, property: &str) -> Option<Vec<String>>;
}

impl<F> AlternativeSource for F
where
    F: Fn(&str, &str) -> Option<Vec<String>> + Send + Sync,
{
    fn available_alternatives(&self, field: &str, property: &str) -> Option<Vec<String>> {
        self(field, property)
    }
}

/// Alternatives known up front, per field and property.
#[derive(Clone, Debug, Default)]
pub struct IndexAlternatives {
    fields: IndexMap<String, IndexMap<String, Vec<String>>>,
}

impl IndexAlternatives {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an annotation with the given alternatives.
    pub fn with_property<'a>(
        mut self,
        field: &str,
        property: &str,
        alternatives: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        self.fields
            .entry(field.to_string())
            .or_default()
            .insert(
                property.to_string(),
                alternatives.into_iter().map(str::to_string).collect(),
            );
        self
    }
}

impl AlternativeSource for IndexAlternatives {
    fn available_alternatives(&self, field: &str, property: &str) -> Option<Vec<String>> {
        self.fields.get(field)?.get(property).cloned()
    }
}

/// Backend field chosen for a leaf.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedField {
    /// `field%property` or `field%property@alternative`
    pub name: String,
    pub alternative: Option<String>,
    subproperty_prefix: String,
}

impl ResolvedField {
    /// A value as stored in this alternative: normalized the way the
    /// alternative was indexed, behind the subproperty prefix if any.
    pub fn index_value(&self, value: &str) -> String {
        let normalized = match self.alternative.as_deref() {
            Some(INSENSITIVE) => remove_diacritics(&value.to_lowercase()),
            Some(CASE_INSENSITIVE) => value.to_lowercase(),
            Some(DIACRITICS_INSENSITIVE) => remove_diacritics(value),
            _ => value.to_string(),
        };
        format!("{}{}", self.subproperty_prefix, normalized)
    }

    /// A pattern value (regex etc.) behind the subproperty prefix, otherwise
    /// untouched.
    pub fn qualify(&self, value: &str) -> String {
        format!("{}{}", self.subproperty_prefix, value)
    }
}

/// Where and how leaves search.
#[derive(Clone)]
pub struct ExecutionContext {
    field: String,
    property: String,
    subproperty_prefix: String,
    case_sensitive: bool,
    diacritics_sensitive: bool,
    alternatives: Arc<dyn AlternativeSource>,
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("field", &self.field)
            .field("property", &self.property)
            .field("subproperty_prefix", &self.subproperty_prefix)
            .field("case_sensitive", &self.case_sensitive)
            .field("diacritics_sensitive", &self.diacritics_sensitive)
            .finish_non_exhaustive()
    }
}

impl ExecutionContext {
    pub fn new(
        field: impl Into<String>,
        property: impl Into<String>,
        case_sensitive: bool,
        diacritics_sensitive: bool,
        alternatives: Arc<dyn AlternativeSource>,
    ) -> Self {
        let mut context = ExecutionContext {
            field: field.into(),
            property: String::new(),
            subproperty_prefix: String::new(),
            case_sensitive,
            diacritics_sensitive,
            alternatives,
        };
        let property = property.into();
        context.set_property(&property);
        context
    }

    /// Context for the installed (or built-in) search defaults.
    pub fn from_defaults(alternatives: Arc<dyn AlternativeSource>) -> Self {
        Self::with_defaults(&config::defaults(), alternatives)
    }

    pub fn with_defaults(defaults: &SearchDefaults, alternatives: Arc<dyn AlternativeSource>) -> Self {
        Self::new(
            defaults.field.as_str(),
            defaults.property.as_str(),
            defaults.case_sensitive,
            defaults.diacritics_sensitive,
            alternatives,
        )
    }

    /// Same context, searching another annotation. `pos:noun` selects the
    /// `noun` subproperty of `pos`.
    pub fn with_property(&self, property: &str) -> Self {
        let mut context = self.clone();
        context.set_property(property);
        context
    }

    pub fn with_sensitivity(&self, case_sensitive: bool, diacritics_sensitive: bool) -> Self {
        ExecutionContext {
            case_sensitive,
            diacritics_sensitive,
            ..self.clone()
        }
    }

    fn set_property(&mut self, property: &str) {
        match property.split_once(SUBPROPERTY_SEPARATOR) {
            Some((main, sub)) => {
                self.property = main.to_string();
                self.subproperty_prefix = format!("{sub}{SUBPROPERTY_VALUE_SEPARATOR}");
            }
            None => {
                self.property = property.to_string();
                self.subproperty_prefix.clear();
            }
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn subproperty_prefix(&self) -> &str {
        &self.subproperty_prefix
    }

    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    pub fn diacritics_sensitive(&self) -> bool {
        self.diacritics_sensitive
    }

    /// Alternatives to try, best first, for the current sensitivity.
    pub fn preferred_alternatives(&self) -> &'static [&'static str] {
        match (self.case_sensitive, self.diacritics_sensitive) {
            (false, false) => &[INSENSITIVE, SENSITIVE],
            (true, true) => &[SENSITIVE, INSENSITIVE],
            (true, false) => &[DIACRITICS_INSENSITIVE, SENSITIVE, INSENSITIVE],
            (false, true) => &[CASE_INSENSITIVE, INSENSITIVE, SENSITIVE],
        }
    }

    /// Pick the backend field for the current property and sensitivity.
    ///
    /// Falls back to the plain `field%property` name if none of the preferred
    /// alternatives is indexed.
    pub fn resolve(&self) -> QueryResult<ResolvedField> {
        let available = self
            .alternatives
            .available_alternatives(&self.field, &self.property)
            .ok_or_else(|| QueryError::field_not_found(&self.field, &self.property))?;

        let alternative = self
            .preferred_alternatives()
            .iter()
            .find(|preferred| available.iter().any(|a| a == *preferred))
            .map(|preferred| preferred.to_string());
        if alternative.is_none() {
            warn!(
                field = %self.field,
                property = %self.property,
                ?available,
                "no preferred alternative indexed, using main field"
            );
        }

        Ok(ResolvedField {
            name: property_field(&self.field, &self.property, alternative.as_deref()),
            alternative,
            subproperty_prefix: self.subproperty_prefix.clone(),
        })
    }
}

/// Backend field name for an annotation, with optional alternative.
pub fn property_field(field: &str, property: &str, alternative: Option<&str>) -> String {
    match alternative {
        Some(alternative) => {
            format!("{field}{PROPERTY_SEPARATOR}{property}{ALTERNATIVE_SEPARATOR}{alternative}")
        }
        None => format!("{field}{PROPERTY_SEPARATOR}{property}"),
    }
}

/// Strip accents and other combining marks (after canonical decomposition).
pub fn remove_diacritics(value: &str) -> String {
    value.nfd().filter(|c| !is_combining_mark(*c)).collect()
}
