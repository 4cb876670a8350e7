//! Pattern serialization and deserialization.
//!
//! Patterns serialize as internally tagged JSON objects, one per node:
//!
//! ```json
//! {"type": "and", "include": [{"type": "term", "value": "cow"}], "exclude": []}
//! ```
//!
//! Sharing is not preserved: a subtree referenced twice is written twice and
//! read back as two separate nodes.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{QueryError, QueryResult};
use crate::query::{Pattern, PatternNode};

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.node().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        PatternNode::deserialize(deserializer).map(Pattern::new)
    }
}

pub fn to_json(pattern: &Pattern) -> QueryResult<String> {
    serde_json::to_string(pattern).map_err(|e| QueryError::InvalidPattern(e.to_string()))
}

pub fn to_json_pretty(pattern: &Pattern) -> QueryResult<String> {
    serde_json::to_string_pretty(pattern).map_err(|e| QueryError::InvalidPattern(e.to_string()))
}

pub fn from_json(source: &str) -> QueryResult<Pattern> {
    serde_json::from_str(source).map_err(|e| QueryError::InvalidPattern(e.to_string()))
}
