//! The URI resolver (§4.4): a small sublanguage for addressing either an inline scalar
//! (`value:<type>#<literal>`) or a remote API model (`api:<model>#<id>`). Every URI is
//! parsed once, at the boundary, into `Uri` rather than threaded through the pipeline as
//! a bare string (§9 design note).

use std::future::Future;

use futures::future::try_join_all;
use serde_json::Value;

use crate::errors::ApiError;
use crate::errors::UriError;

/// A parsed URI: either a literal scalar or a pointer to a remote model.
#[derive(Debug, Clone, PartialEq)]
pub enum Uri {
    Value { scalar_type: String, fragment: String },
    Api { model: String, id: String },
}

impl Uri {
    /// Parse `scheme:path#fragment` by hand. `url::Url` would run the fragment through
    /// the WHATWG fragment percent-encode set, mangling a literal `str` value containing
    /// a space or `<>"` backtick (e.g. `value:str#John Doe` would come back as
    /// `John%20Doe`). §4.4 requires `str` fragments verbatim, matching the original's
    /// `urlparse`, so the fragment is taken as-is with no encode/decode pass at all.
    pub fn parse(raw: &str) -> Result<Self, UriError> {
        let (scheme, rest) =
            raw.split_once(':').ok_or_else(|| UriError::Unsupported(raw.to_string()))?;
        let (path, fragment) = match rest.split_once('#') {
            Some((path, fragment)) => (path, fragment),
            None => (rest, ""),
        };
        match scheme {
            "value" => Ok(Uri::Value { scalar_type: path.to_string(), fragment: fragment.to_string() }),
            "api" => Ok(Uri::Api { model: path.to_string(), id: fragment.to_string() }),
            _ => Err(UriError::Unsupported(raw.to_string())),
        }
    }

    /// Same grammar as `parse`, but for use while building the `context` map (§4.8.4):
    /// an unsupported scheme here is reported with the "for context generation" wording
    /// the pipeline's failure detail uses verbatim (§8 S3).
    pub fn parse_for_context(raw: &str) -> Result<Self, UriError> {
        Self::parse(raw).map_err(|_| UriError::UnsupportedUriContext(raw.to_string()))
    }
}

/// A resolved scalar (§4.4 `scalar()`): the decoded payload of a `value:` URI.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    None,
}

impl std::fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::None => f.write_str(""),
        }
    }
}

impl ScalarValue {
    pub fn into_json(self) -> Value {
        match self {
            Self::Str(s) => Value::String(s),
            Self::Int(i) => Value::Number(i.into()),
            Self::Float(x) => serde_json::Number::from_f64(x).map(Value::Number).unwrap_or(Value::Null),
            Self::Bool(b) => Value::Bool(b),
            Self::None => Value::Null,
        }
    }
}

/// `scalar(uri)` (§4.4): decode a `value:` URI's fragment according to its declared type.
/// Fails with `UnsupportedUri` for any other scheme.
pub fn scalar(uri: &Uri) -> Result<ScalarValue, UriError> {
    match uri {
        Uri::Value { scalar_type, fragment } => parse_scalar(scalar_type, fragment),
        Uri::Api { model, id } => Err(UriError::Unsupported(format!("api:{model}#{id}"))),
    }
}

fn parse_scalar(scalar_type: &str, fragment: &str) -> Result<ScalarValue, UriError> {
    match scalar_type {
        "str" => Ok(ScalarValue::Str(fragment.to_string())),
        "int" => fragment
            .parse::<i64>()
            .map(ScalarValue::Int)
            .map_err(|_| UriError::ScalarParse { kind: "int", fragment: fragment.to_string() }),
        "float" => fragment
            .parse::<f64>()
            .map(ScalarValue::Float)
            .map_err(|_| UriError::ScalarParse { kind: "float", fragment: fragment.to_string() }),
        "bool" => Ok(ScalarValue::Bool(fragment.eq_ignore_ascii_case("true"))),
        "none" => Ok(ScalarValue::None),
        other => Err(UriError::UnsupportedScalarType(other.to_string())),
    }
}

/// Collaborator contract the resolver needs from the Scheduled-Email Client's underlying
/// HTTP machinery: fetch `<api_base>/v2/<model>/<id>` as JSON. Kept as a trait so the
/// resolver can be unit-tested without a live `reqwest::Client`.
pub trait ModelFetcher {
    fn fetch(&self, model: &str, id: &str) -> impl Future<Output = Result<Value, ApiError>> + Send;
}

/// `model(uri)` (§4.4): fetch an `api:` URI as a JSON object. Fails with `UnsupportedUri`
/// for any other scheme.
pub async fn model(uri: &Uri, fetcher: &impl ModelFetcher) -> Result<Value, UriError> {
    match uri {
        Uri::Api { model, id } => Ok(fetcher.fetch(model, id).await?),
        Uri::Value { scalar_type, fragment } => {
            Err(UriError::Unsupported(format!("value:{scalar_type}#{fragment}")))
        }
    }
}

/// `model_field(uri, property)` (§4.4): fetch the model, then stringify the named field.
pub async fn model_field(
    uri: &Uri,
    property: &str,
    fetcher: &impl ModelFetcher,
) -> Result<String, UriError> {
    let object = model(uri, fetcher).await?;
    let value = object
        .get(property)
        .ok_or_else(|| UriError::MissingField { field: property.to_string() })?;
    Ok(json_to_plain_string(value))
}

fn json_to_plain_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// One already-parsed `context` map entry (§4.4 `context_entry`): a single URI, or an
/// ordered list of URIs resolved concurrently.
pub enum ContextEntryUri {
    Single(Uri),
    List(Vec<Uri>),
}

/// The resolved value of one `context` entry: a scalar, a single model object, or an
/// ordered list of model objects.
#[derive(Debug, Clone)]
pub enum ContextEntry {
    Scalar(ScalarValue),
    Object(Value),
    Objects(Vec<Value>),
}

impl ContextEntry {
    pub fn into_json(self) -> Value {
        match self {
            Self::Scalar(s) => s.into_json(),
            Self::Object(o) => o,
            Self::Objects(list) => Value::Array(list),
        }
    }
}

/// `context_entry(uri_or_list)` (§4.4): the sole point of pipeline-time HTTP fan-out. A
/// list resolves its elements concurrently via `try_join_all`, which preserves the
/// input order in its output regardless of completion order (invariant #3, §8).
pub async fn context_entry(
    entry: &ContextEntryUri,
    fetcher: &impl ModelFetcher,
) -> Result<ContextEntry, UriError> {
    match entry {
        ContextEntryUri::List(uris) => {
            let fetches = uris.iter().map(|uri| async move {
                match uri {
                    Uri::Api { model: m, id } => fetcher.fetch(m, id).await.map_err(UriError::from),
                    Uri::Value { scalar_type, fragment } => {
                        Err(UriError::UnsupportedUriContext(format!("value:{scalar_type}#{fragment}")))
                    }
                }
            });
            let objects = try_join_all(fetches).await?;
            Ok(ContextEntry::Objects(objects))
        }
        ContextEntryUri::Single(uri) => match uri {
            // `scalar`/`model` can't actually fail with an unsupported-scheme error here —
            // the match arm already guarantees the right variant — but they stay generic
            // so they're reusable from the recipient-resolution path (§4.8.5) too.
            Uri::Value { .. } => scalar(uri).map(ContextEntry::Scalar),
            Uri::Api { .. } => model(uri, fetcher).await.map(ContextEntry::Object),
        },
    }
}
