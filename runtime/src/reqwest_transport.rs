//! Production transport backed by `reqwest`.

use bytes::Bytes;
use futures::future::BoxFuture;
use platform_client_core::body::{FormValue, MultipartForm};
use platform_client_core::{
    Headers, Method, PreparedBody, Transport, TransportError, TransportRequest, TransportResponse,
};
use reqwest::Client;
use reqwest::multipart::{Form, Part};

/// Performs exchanges with a shared `reqwest::Client`.
///
/// Timeouts and cancellation are owned by the pipeline; the client is used
/// without its own timeout so a dropped future is the only abort path.
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport with a default `reqwest::Client`
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reuse an existing client (connection pool, TLS settings)
    #[must_use]
    pub const fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn exchange(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let url = reqwest::Url::parse(&request.url)
            .map_err(|e| TransportError::InvalidUrl(format!("{}: {e}", request.url)))?;

        let mut builder = self.client.request(to_reqwest_method(request.method), url);
        for (name, value) in request.headers.iter() {
            builder = builder.header(name, value);
        }

        builder = match request.body {
            None => builder,
            Some(PreparedBody::Text(text)) => builder.body(text),
            Some(PreparedBody::Binary(bytes)) => builder.body(bytes),
            Some(PreparedBody::UrlEncoded(pairs)) => builder.form(&pairs),
            Some(PreparedBody::Multipart(form)) => builder.multipart(to_reqwest_form(form)?),
        };

        let response = builder.send().await.map_err(map_send_error)?;

        let status = response.status();
        let mut headers = Headers::new();
        for (name, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                headers.insert(name.as_str(), value);
            }
        }
        let url = response.url().to_string();
        let body: Bytes = response
            .bytes()
            .await
            .map_err(|e| TransportError::Body(e.to_string()))?;

        Ok(TransportResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            url,
            body,
        })
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: TransportRequest) -> BoxFuture<'_, Result<TransportResponse, TransportError>> {
        Box::pin(self.exchange(request))
    }
}

const fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
        Method::Head => reqwest::Method::HEAD,
        Method::Options => reqwest::Method::OPTIONS,
    }
}

fn to_reqwest_form(form: MultipartForm) -> Result<Form, TransportError> {
    let mut out = Form::new();
    for part in form.parts {
        out = match part.value {
            FormValue::Text(value) => out.text(part.name, value),
            FormValue::File {
                file_name,
                content_type,
                bytes,
            } => {
                let mut file = Part::bytes(bytes.to_vec()).file_name(file_name);
                if let Some(content_type) = content_type {
                    file = file
                        .mime_str(&content_type)
                        .map_err(|e| TransportError::Request(e.to_string()))?;
                }
                out.part(part.name, file)
            }
        };
    }
    Ok(out)
}

fn map_send_error(error: reqwest::Error) -> TransportError {
    if error.is_connect() {
        TransportError::Connect(error.to_string())
    } else {
        TransportError::Request(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_mapping() {
        assert_eq!(to_reqwest_method(Method::Get), reqwest::Method::GET);
        assert_eq!(to_reqwest_method(Method::Delete), reqwest::Method::DELETE);
        assert_eq!(to_reqwest_method(Method::Options), reqwest::Method::OPTIONS);
    }

    #[tokio::test]
    async fn test_relative_url_is_rejected() {
        let transport = ReqwestTransport::new();
        let result = transport
            .send(TransportRequest {
                method: Method::Get,
                url: "/v1/tasks".to_string(),
                headers: Headers::new(),
                body: None,
            })
            .await;
        assert!(matches!(result, Err(TransportError::InvalidUrl(_))));
    }

    #[test]
    fn test_bad_mime_is_reported() {
        let form = MultipartForm::new().file("file", "a.txt", Some("not a mime".to_string()), Bytes::new());
        assert!(to_reqwest_form(form).is_err());
    }
}
