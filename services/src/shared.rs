//! Types and helpers shared by every service table.

use platform_client_core::endpoint::encode_segment;
use platform_client_core::{HttpError, Method, RequestDescriptor};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Per-call options accepted by every service operation
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ServiceRequestOptions {
    /// Overrides the client base URL for this call
    pub base_url: Option<String>,
    /// Count this call in the global loading indicator
    pub show_global_loading: bool,
}

impl ServiceRequestOptions {
    /// No overrides
    pub const NONE: Self = Self {
        base_url: None,
        show_global_loading: false,
    };

    /// Only request the global loading indicator
    pub const LOADING: Self = Self {
        base_url: None,
        show_global_loading: true,
    };

    /// Builder: route this call to another base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Builder: toggle the global loading indicator
    #[must_use]
    pub const fn with_global_loading(mut self, show: bool) -> Self {
        self.show_global_loading = show;
        self
    }

    /// Descriptor for `method` + `url` with these options applied.
    ///
    /// An empty base URL is ignored.
    #[must_use]
    pub fn descriptor(&self, method: Method, url: impl Into<String>) -> RequestDescriptor {
        let descriptor = RequestDescriptor::new(method, url).with_global_loading(self.show_global_loading);
        match self.base_url.as_deref().filter(|base| !base.is_empty()) {
            Some(base) => descriptor.with_base_url(base),
            None => descriptor,
        }
    }
}

/// Join a path template's fixed parts with percent-encoded caller segments.
///
/// ```
/// use platform_client_services::shared::path;
///
/// assert_eq!(path(&["/v1/tasks/", ""], &["a b"]), "/v1/tasks/a%20b");
/// ```
#[must_use]
pub fn path(parts: &[&str], segments: &[&str]) -> String {
    let mut out = String::new();
    for (i, part) in parts.iter().enumerate() {
        out.push_str(part);
        if let Some(segment) = segments.get(i) {
            out.push_str(&encode_segment(segment));
        }
    }
    out
}

/// Attach optional query parameters.
pub(crate) fn with_optional_query<Q: Serialize + ?Sized>(
    descriptor: RequestDescriptor,
    params: Option<&Q>,
) -> Result<RequestDescriptor, HttpError> {
    match params {
        Some(params) => descriptor.with_query(params),
        None => Ok(descriptor),
    }
}

/// A list payload.
///
/// Accepts a bare array, an object with a `data` array (plus paging fields),
/// or `null`, since envelope unwrapping may already have removed the outer
/// `data` key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "PageRepr<T>")]
pub struct Page<T> {
    /// Items on this page
    pub data: Vec<T>,
    /// Total number of items, when reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    /// Whether more items follow, when reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_more: Option<bool>,
    /// Remaining fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            total: None,
            has_more: None,
            extra: Map::new(),
        }
    }
}

impl<T> Page<T> {
    /// Number of items on this page
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether this page has no items
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PageRepr<T> {
    Bare(Vec<T>),
    Wrapped {
        #[serde(default = "Vec::new")]
        data: Vec<T>,
        #[serde(default)]
        total: Option<u64>,
        #[serde(default)]
        has_more: Option<bool>,
        #[serde(flatten)]
        extra: Map<String, Value>,
    },
    Empty(()),
}

impl<T> From<PageRepr<T>> for Page<T> {
    fn from(repr: PageRepr<T>) -> Self {
        match repr {
            PageRepr::Bare(data) => Self {
                data,
                ..Self::default()
            },
            PageRepr::Wrapped {
                data,
                total,
                has_more,
                extra,
            } => Self {
                data,
                total,
                has_more,
                extra,
            },
            PageRepr::Empty(()) => Self::default(),
        }
    }
}

/// Acknowledgement payload of mutations whose response carries no schema.
///
/// Holds whatever the server returned, `null` included.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ack {
    /// Raw payload
    pub payload: Value,
}

impl Ack {
    /// `message` field of an object payload
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.payload.get("message").and_then(Value::as_str)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: u32,
    }

    #[test]
    fn test_page_accepts_every_shape() {
        let bare: Page<Item> = serde_json::from_value(json!([{"id": 1}])).unwrap();
        assert_eq!(bare.data, [Item { id: 1 }]);
        assert_eq!(bare.total, None);

        let wrapped: Page<Item> =
            serde_json::from_value(json!({"data": [{"id": 2}], "total": 9, "page": 1})).unwrap();
        assert_eq!(wrapped.data, [Item { id: 2 }]);
        assert_eq!(wrapped.total, Some(9));
        assert_eq!(wrapped.extra.get("page"), Some(&json!(1)));

        let empty: Page<Item> = serde_json::from_value(Value::Null).unwrap();
        assert!(empty.is_empty());

        let no_data: Page<Item> = serde_json::from_value(json!({"total": 0})).unwrap();
        assert!(no_data.is_empty());
        assert_eq!(no_data.total, Some(0));
    }

    #[test]
    fn test_ack_accepts_anything() {
        let ack: Ack = serde_json::from_value(json!({"message": "deleted"})).unwrap();
        assert_eq!(ack.message(), Some("deleted"));

        let ack: Ack = serde_json::from_value(Value::Null).unwrap();
        assert_eq!(ack, Ack::default());
        assert_eq!(ack.message(), None);
    }

    #[test]
    fn test_options_descriptor() {
        let descriptor = ServiceRequestOptions::default()
            .with_base_url("https://other.example/")
            .with_global_loading(true)
            .descriptor(Method::Get, "/v1/tasks");
        assert_eq!(descriptor.base_url.as_deref(), Some("https://other.example/"));
        assert!(descriptor.show_global_loading);

        let descriptor = ServiceRequestOptions::default()
            .with_base_url("")
            .descriptor(Method::Get, "/v1/tasks");
        assert!(descriptor.base_url.is_none());
        assert!(!descriptor.show_global_loading);
    }

    #[test]
    fn test_path_encodes_segments() {
        assert_eq!(
            path(&["/v1/knowledge-bases/", "/files/", ""], &["kb 1", "f/2"]),
            "/v1/knowledge-bases/kb%201/files/f%2F2"
        );
    }
}
