//! Process-wide search defaults.
//!
//! The annotated field, annotation and sensitivity used when a pattern does
//! not say otherwise. Defaults are read from JSON (all keys optional) and may
//! be installed once per process; until then the built-in values apply.

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{QueryError, QueryResult};

static DEFAULTS: OnceCell<SearchDefaults> = OnceCell::new();

/// Default search target and sensitivity
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchDefaults {
    /// Annotated field searched by default
    pub field: String,
    /// Annotation (property) searched by default
    pub property: String,
    pub case_sensitive: bool,
    pub diacritics_sensitive: bool,
}

impl Default for SearchDefaults {
    fn default() -> Self {
        SearchDefaults {
            field: "contents".to_string(),
            property: "word".to_string(),
            case_sensitive: false,
            diacritics_sensitive: false,
        }
    }
}

impl SearchDefaults {
    /// Parse defaults from JSON. Missing keys take their built-in value.
    pub fn from_json(source: &str) -> QueryResult<Self> {
        let defaults: SearchDefaults =
            serde_json::from_str(source).map_err(|e| QueryError::InvalidDefaults(e.to_string()))?;
        defaults.validate()?;
        Ok(defaults)
    }

    fn validate(&self) -> QueryResult<()> {
        if self.field.is_empty() {
            return Err(QueryError::InvalidDefaults("field must not be empty".to_string()));
        }
        if self.property.is_empty() {
            return Err(QueryError::InvalidDefaults("property must not be empty".to_string()));
        }
        Ok(())
    }

    /// Install these as the process-wide defaults.
    ///
    /// Only the first call succeeds; contexts created earlier keep the values
    /// they were built with.
    pub fn install(self) -> QueryResult<()> {
        self.validate()?;
        info!(
            field = %self.field,
            property = %self.property,
            case_sensitive = self.case_sensitive,
            diacritics_sensitive = self.diacritics_sensitive,
            "installing search defaults"
        );
        DEFAULTS
            .set(self)
            .map_err(|_| QueryError::DefaultsAlreadyInstalled)
    }
}

/// The installed defaults, or the built-in ones if none were installed.
pub fn defaults() -> SearchDefaults {
    DEFAULTS.get().cloned().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_built_in_defaults() {
        let defaults = SearchDefaults::default();
        assert_eq!(defaults.field, "contents");
        assert_eq!(defaults.property, "word");
        assert!(!defaults.case_sensitive);
        assert!(!defaults.diacritics_sensitive);
    }

    #[test]
    fn test_partial_json() {
        let defaults = SearchDefaults::from_json(r#"{"property": "lemma", "case_sensitive": true}"#)
            .unwrap();
        assert_eq!(defaults.field, "contents");
        assert_eq!(defaults.property, "lemma");
        assert!(defaults.case_sensitive);
        assert!(!defaults.diacritics_sensitive);
    }

    #[test]
    fn test_rejects_unknown_and_empty_keys() {
        assert!(matches!(
            SearchDefaults::from_json(r#"{"feild": "x"}"#),
            Err(QueryError::InvalidDefaults(_))
        ));
        assert!(matches!(
            SearchDefaults::from_json(r#"{"field": ""}"#),
            Err(QueryError::InvalidDefaults(_))
        ));
    }
}
