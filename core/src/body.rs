//! Request body kinds.
//!
//! The set of body representations the pipeline understands is closed:
//! every variant has a fixed rule for how it reaches the transport.
//!
//! | Variant | Rule |
//! |---------|------|
//! | [`RequestBody::Json`] | serialized, `content-type: application/json` unless already set |
//! | [`RequestBody::Text`] | sent verbatim |
//! | [`RequestBody::Binary`] | passed through |
//! | [`RequestBody::UrlEncoded`] | passed through (transport encodes the form) |
//! | [`RequestBody::Multipart`] | passed through (transport builds the multipart body) |
//!
//! Bodies are never sent for `GET` or `HEAD`.

use crate::headers::{CONTENT_TYPE, Headers};
use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// HTTP method
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Method {
    /// GET
    #[default]
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// PATCH
    Patch,
    /// DELETE
    Delete,
    /// HEAD
    Head,
    /// OPTIONS
    Options,
}

impl Method {
    /// Upper-case wire name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }

    /// Whether a request body may be sent with this method
    #[must_use]
    pub const fn allows_body(self) -> bool {
        !matches!(self, Self::Get | Self::Head)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body supplied by the caller
#[derive(Clone, Debug, PartialEq)]
pub enum RequestBody {
    /// Structured value, serialized as JSON
    Json(Value),
    /// Plain string, sent as-is
    Text(String),
    /// Raw bytes
    Binary(Bytes),
    /// `application/x-www-form-urlencoded` pairs
    UrlEncoded(Vec<(String, String)>),
    /// `multipart/form-data` parts
    Multipart(MultipartForm),
}

impl RequestBody {
    /// Serialize any value into a JSON body.
    ///
    /// # Errors
    ///
    /// Returns the serializer error if `value` cannot be represented as JSON
    /// (e.g. a map with non-string keys).
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(value).map(Self::Json)
    }

    /// Convert into what the transport receives.
    ///
    /// Returns `None` when the method does not carry a body. Sets the JSON
    /// content type on `headers` only when the caller has not chosen one.
    #[must_use]
    pub fn prepare(self, method: Method, headers: &mut Headers) -> Option<PreparedBody> {
        if !method.allows_body() {
            return None;
        }

        Some(match self {
            Self::Json(value) => {
                headers.insert_if_absent(CONTENT_TYPE, "application/json");
                PreparedBody::Text(value.to_string())
            }
            Self::Text(text) => PreparedBody::Text(text),
            Self::Binary(bytes) => PreparedBody::Binary(bytes),
            Self::UrlEncoded(pairs) => PreparedBody::UrlEncoded(pairs),
            Self::Multipart(form) => PreparedBody::Multipart(form),
        })
    }
}

impl From<String> for RequestBody {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for RequestBody {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Bytes> for RequestBody {
    fn from(bytes: Bytes) -> Self {
        Self::Binary(bytes)
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Binary(Bytes::from(bytes))
    }
}

impl From<MultipartForm> for RequestBody {
    fn from(form: MultipartForm) -> Self {
        Self::Multipart(form)
    }
}

/// Body as handed to the transport
#[derive(Clone, Debug, PartialEq)]
pub enum PreparedBody {
    /// UTF-8 payload (plain text or serialized JSON)
    Text(String),
    /// Raw bytes
    Binary(Bytes),
    /// Form pairs, encoded by the transport
    UrlEncoded(Vec<(String, String)>),
    /// Multipart parts, encoded by the transport
    Multipart(MultipartForm),
}

impl PreparedBody {
    /// Text view of the body, if it is a text payload
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// A `multipart/form-data` body
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MultipartForm {
    /// Parts in insertion order
    pub parts: Vec<FormPart>,
}

impl MultipartForm {
    /// Create an empty form
    #[must_use]
    pub const fn new() -> Self {
        Self { parts: Vec::new() }
    }

    /// Builder: add a text field
    #[must_use]
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(FormPart {
            name: name.into(),
            value: FormValue::Text(value.into()),
        });
        self
    }

    /// Builder: add a file field
    #[must_use]
    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        content_type: Option<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        self.parts.push(FormPart {
            name: name.into(),
            value: FormValue::File {
                file_name: file_name.into(),
                content_type,
                bytes: bytes.into(),
            },
        });
        self
    }
}

/// One field of a multipart form
#[derive(Clone, Debug, PartialEq)]
pub struct FormPart {
    /// Field name
    pub name: String,
    /// Field content
    pub value: FormValue,
}

/// Content of a multipart field
#[derive(Clone, Debug, PartialEq)]
pub enum FormValue {
    /// Plain text value
    Text(String),
    /// File upload
    File {
        /// File name reported to the server
        file_name: String,
        /// MIME type, if known
        content_type: Option<String>,
        /// File content
        bytes: Bytes,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_and_head_drop_body() {
        let mut headers = Headers::new();
        let body = RequestBody::Json(json!({"a": 1}));
        assert!(body.clone().prepare(Method::Get, &mut headers).is_none());
        assert!(body.prepare(Method::Head, &mut headers).is_none());
        assert!(headers.is_empty());
    }

    #[test]
    fn test_json_sets_content_type_once() {
        let mut headers = Headers::new();
        let prepared = RequestBody::Json(json!({"a": 1}))
            .prepare(Method::Post, &mut headers)
            .unwrap();
        assert_eq!(prepared.as_text(), Some(r#"{"a":1}"#));
        assert_eq!(headers.get(CONTENT_TYPE), Some("application/json"));
    }

    #[test]
    fn test_json_respects_existing_content_type() {
        let mut headers = Headers::new();
        headers.insert("Content-Type", "application/vnd.api+json");
        let _ = RequestBody::Json(json!([1, 2])).prepare(Method::Put, &mut headers);
        assert_eq!(headers.get(CONTENT_TYPE), Some("application/vnd.api+json"));
    }

    #[test]
    fn test_text_is_verbatim_without_content_type() {
        let mut headers = Headers::new();
        let prepared = RequestBody::from("raw {not json")
            .prepare(Method::Post, &mut headers)
            .unwrap();
        assert_eq!(prepared, PreparedBody::Text("raw {not json".to_string()));
        assert!(!headers.contains(CONTENT_TYPE));
    }

    #[test]
    fn test_pass_through_kinds() {
        let mut headers = Headers::new();
        let bytes = RequestBody::from(vec![0_u8, 159, 146, 150])
            .prepare(Method::Post, &mut headers)
            .unwrap();
        assert_eq!(bytes, PreparedBody::Binary(Bytes::from_static(&[0, 159, 146, 150])));

        let form = MultipartForm::new().text("purpose", "fine-tune");
        let prepared = RequestBody::from(form.clone())
            .prepare(Method::Post, &mut headers)
            .unwrap();
        assert_eq!(prepared, PreparedBody::Multipart(form));
        assert!(headers.is_empty());
    }
}
