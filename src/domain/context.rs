use std::collections::BTreeMap;

use serde::Deserialize;

use crate::errors::SchemaError;

/// One value in the `context` map: either a single URI, or a list of URIs to be
/// resolved concurrently and returned in order (§4.4 `context_entry`).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ContextLink {
    Single(String),
    List(Vec<String>),
}

/// Validate `context` against its schema (§4.8.2, §9 open question): a JSON object
/// whose values are strings or lists of strings. Anything else — numbers, nested
/// objects, nulls — fails schema validation rather than being silently coerced.
pub fn parse_context(raw: &serde_json::Value) -> Result<BTreeMap<String, ContextLink>, SchemaError> {
    let object = raw.as_object().ok_or(SchemaError::Context)?;
    object
        .iter()
        .map(|(key, value)| {
            serde_json::from_value::<ContextLink>(value.clone())
                .map(|link| (key.clone(), link))
                .map_err(|_| SchemaError::Context)
        })
        .collect()
}
