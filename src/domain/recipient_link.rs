use serde::Deserialize;

use crate::errors::SchemaError;

/// One element of `to_header_context`: either a literal value URI, or a pointer to a
/// named field on a remote model. Parsed once at schema-validation time (4.8.2) so the
/// rest of the pipeline dispatches on a sum type instead of re-inspecting JSON shape.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RecipientLink {
    SingleProperty { api_uri: String, property: String },
    SingleValue { value_uri: String },
}

/// Validate `to_header_context` against the recipient schema (§4.8.2): a JSON array
/// whose elements are each either `{api_uri, property}` or `{value_uri}`.
pub fn parse_recipient_links(raw: &serde_json::Value) -> Result<Vec<RecipientLink>, SchemaError> {
    let array = raw.as_array().ok_or(SchemaError::Recipients)?;
    array
        .iter()
        .map(|entry| serde_json::from_value(entry.clone()).map_err(|_| SchemaError::Recipients))
        .collect()
}
