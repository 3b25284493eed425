//! URL resolution and query-string encoding.

use serde::Serialize;
use serde_json::Value;
use std::fmt::Write as _;
use url::form_urlencoded;

/// Ordered query parameters.
///
/// Built from any serializable map-like value: `null` fields are skipped,
/// arrays repeat the key, scalars are stringified and nested objects are
/// sent as their JSON text.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    /// Create an empty parameter list
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Builder: append one pair
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.push((key.into(), value.into()));
        self
    }

    /// Serialize `params` into query pairs.
    ///
    /// Returns `Ok(None)` when the value serializes to `null` (e.g. `None`).
    ///
    /// # Errors
    ///
    /// Fails when the value cannot be serialized or does not serialize to an
    /// object.
    pub fn from_serialize<P: Serialize + ?Sized>(params: &P) -> Result<Option<Self>, serde_json::Error> {
        match serde_json::to_value(params)? {
            Value::Null => Ok(None),
            Value::Object(map) => {
                let mut pairs = Vec::with_capacity(map.len());
                for (key, value) in map {
                    match value {
                        Value::Null => {}
                        Value::Array(items) => {
                            for item in items {
                                if let Some(text) = scalar_to_string(item) {
                                    pairs.push((key.clone(), text));
                                }
                            }
                        }
                        other => {
                            if let Some(text) = scalar_to_string(other) {
                                pairs.push((key, text));
                            }
                        }
                    }
                }
                Ok(Some(Self(pairs)))
            }
            other => Err(<serde_json::Error as serde::ser::Error>::custom(format!(
                "query parameters must serialize to an object, got {}",
                value_kind(&other)
            ))),
        }
    }

    /// Pairs in insertion order
    #[must_use]
    pub fn pairs(&self) -> &[(String, String)] {
        &self.0
    }

    /// Whether there are no pairs
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `application/x-www-form-urlencoded` rendering
    #[must_use]
    pub fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.0.iter())
            .finish()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(number.to_string()),
        nested @ (Value::Array(_) | Value::Object(_)) => Some(nested.to_string()),
    }
}

const fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Whether `url` already names a scheme and host (`http://` or `https://`)
#[must_use]
pub fn is_absolute(url: &str) -> bool {
    starts_with_ignore_case(url, "http://") || starts_with_ignore_case(url, "https://")
}

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// Join a base URL and a path, collapsing the slashes between them.
///
/// Absolute URLs are returned unchanged, as is any URL when `base` is empty.
#[must_use]
pub fn join(base: Option<&str>, url: &str) -> String {
    match base {
        Some(base) if !base.is_empty() && !is_absolute(url) => format!(
            "{}/{}",
            base.trim_end_matches('/'),
            url.trim_start_matches('/')
        ),
        _ => url.to_string(),
    }
}

/// Append query pairs after any existing query and before any fragment.
#[must_use]
pub fn append_query(url: &str, params: Option<&QueryParams>) -> String {
    let Some(params) = params.filter(|p| !p.is_empty()) else {
        return url.to_string();
    };

    let (without_fragment, fragment) = match url.split_once('#') {
        Some((head, fragment)) => (head, Some(fragment)),
        None => (url, None),
    };
    let (path, existing) = match without_fragment.split_once('?') {
        Some((path, query)) => (path, Some(query).filter(|q| !q.is_empty())),
        None => (without_fragment, None),
    };

    let encoded = params.encode();
    let query = match existing {
        Some(existing) => format!("{existing}&{encoded}"),
        None => encoded,
    };

    match fragment {
        Some(fragment) => format!("{path}?{query}#{fragment}"),
        None => format!("{path}?{query}"),
    }
}

/// Resolve the URL a request is sent to.
#[must_use]
pub fn build_url(base: Option<&str>, url: &str, params: Option<&QueryParams>) -> String {
    append_query(&join(base, url), params)
}

/// Percent-encode a single path segment supplied by a caller.
#[must_use]
pub fn encode_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(char::from(byte));
            }
            other => {
                let _ = write!(out, "%{other:02X}");
            }
        }
    }
    out
}
