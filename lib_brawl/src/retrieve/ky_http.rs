//! # HTTP Retrieval Utilities
//!
//! The transport every API call goes through. `ApiClient` wraps a shared
//! `reqwest::Client` and turns each GET into an [`ApiResponse`]: a status
//! envelope plus the decoded body when the call succeeded.
//!
//! The adapter never returns an error. A non-200 status, a transport failure
//! or an undecodable body all come back as `ok: false` so that callers (most
//! importantly the refresh loops) can treat "no data this time" uniformly.
//!
//! The engine does not talk to `ApiClient` directly but to the [`Fetch`]
//! trait, which lets tests substitute a scripted responder.

use std::future::Future;
use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

/// Status reported when the request never produced an HTTP response
/// (connection refused, DNS failure, timeout).
pub const TRANSPORT_FAILURE_STATUS: u16 = 0;

/// A standardized container for API responses.
///
/// `data` is only populated when `ok` is true.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse<T> {
    /// The deserialized response body.
    pub data: Option<T>,
    /// The numeric HTTP status code, or [`TRANSPORT_FAILURE_STATUS`].
    pub status: u16,
    /// True iff the status was 200 and the body decoded.
    pub ok: bool,
}

impl<T> ApiResponse<T> {
    /// A successful 200 response carrying `data`.
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            status: StatusCode::OK.as_u16(),
            ok: true,
        }
    }

    /// A failed response with no body.
    pub fn failure(status: u16) -> Self {
        Self {
            data: None,
            status,
            ok: false,
        }
    }

    /// Consumes the response, returning the body only if the call succeeded.
    pub fn into_data(self) -> Option<T> {
        if self.ok {
            self.data
        } else {
            None
        }
    }
}

impl ApiResponse<Value> {
    /// Decodes a raw JSON response into a typed one.
    ///
    /// A body that does not match `T` is reported as a failure with the
    /// original status.
    pub fn decode<T: DeserializeOwned>(self) -> ApiResponse<T> {
        let ApiResponse { data, status, ok } = self;
        match (ok, data) {
            (true, Some(value)) => match serde_json::from_value::<T>(value) {
                Ok(decoded) => ApiResponse {
                    data: Some(decoded),
                    status,
                    ok: true,
                },
                Err(e) => {
                    debug!(status, error = %e, "response body did not match the expected shape");
                    ApiResponse::failure(status)
                }
            },
            _ => ApiResponse::failure(status),
        }
    }
}

/// An authenticated GET against the API.
///
/// Implementations must never panic or error on a bad status; they report it
/// through the returned envelope instead.
pub trait Fetch: Send + Sync + 'static {
    /// Performs a GET on `url` with `token` as the bearer credential.
    fn fetch(
        &self,
        url: Url,
        token: &str,
        timeout: Option<Duration>,
    ) -> impl Future<Output = ApiResponse<Value>> + Send;
}

/// A reusable asynchronous HTTP client.
///
/// Cloning is cheap; all clones share the same connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// The underlying connection-pooled client.
    inner: reqwest::Client,
}

impl ApiClient {
    /// Creates a client with the crate's user agent.
    ///
    /// # Errors
    /// Fails only if the TLS backend cannot be initialised.
    pub fn new() -> Result<Self, reqwest::Error> {
        let inner = reqwest::Client::builder()
            .user_agent(concat!("lib_brawl/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { inner })
    }

    /// Wraps an already configured `reqwest::Client`.
    pub fn with_client(inner: reqwest::Client) -> Self {
        Self { inner }
    }

    /// Performs a GET and decodes the body into `T`.
    ///
    /// # Arguments
    /// * `url` - Absolute URL of the resource.
    /// * `token` - Bearer credential for the `Authorization` header.
    /// * `timeout` - Per-call timeout; `None` waits indefinitely.
    pub async fn request<T: DeserializeOwned>(
        &self,
        url: Url,
        token: &str,
        timeout: Option<Duration>,
    ) -> ApiResponse<T> {
        let mut req = self
            .inner
            .get(url.clone())
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .header(ACCEPT, "application/json");

        if let Some(limit) = timeout {
            req = req.timeout(limit);
        }

        let response = match req.send().await {
            Ok(response) => response,
            Err(e) => {
                debug!(%url, error = %e, timeout = e.is_timeout(), "request did not complete");
                return ApiResponse::failure(TRANSPORT_FAILURE_STATUS);
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            trace!(%url, status = status.as_u16(), "non-200 response");
            return ApiResponse::failure(status.as_u16());
        }

        match response.json::<T>().await {
            Ok(data) => ApiResponse::success(data),
            Err(e) => {
                debug!(%url, error = %e, "failed to decode response body");
                ApiResponse::failure(status.as_u16())
            }
        }
    }
}

impl Fetch for ApiClient {
    async fn fetch(&self, url: Url, token: &str, timeout: Option<Duration>) -> ApiResponse<Value> {
        self.request::<Value>(url, token, timeout).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;

    /// Serves exactly one HTTP response on a random local port and hands the
    /// raw request back through the returned channel.
    fn serve_once(status_line: &'static str, body: String) -> (Url, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind to random port");
        let port = listener.local_addr().unwrap().port();
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut buf) {
                        Ok(0) | Err(_) => break,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                let _ = tx.send(String::from_utf8_lossy(&request).to_string());

                let response = format!(
                    "{}\r\nContent-Length: {}\r\nContent-Type: application/json\r\nConnection: close\r\n\r\n{}",
                    status_line,
                    body.len(),
                    body
                );
                stream.write_all(response.as_bytes()).unwrap();
                stream.flush().unwrap();
            }
        });

        let url = Url::parse(&format!("http://127.0.0.1:{}/v1/players/%232PP", port)).unwrap();
        (url, rx)
    }

    #[tokio::test]
    async fn success_returns_parsed_body_and_sends_credentials() {
        let (url, requests) = serve_once("HTTP/1.1 200 OK", json!({"tag": "#2PP"}).to_string());
        let client = ApiClient::new().unwrap();

        let response = client.fetch(url, "secret-token", None).await;

        assert!(response.ok);
        assert_eq!(response.status, 200);
        assert_eq!(response.data, Some(json!({"tag": "#2PP"})));

        let raw = requests.recv().unwrap().to_lowercase();
        assert!(raw.starts_with("get /v1/players/%232pp"));
        assert!(raw.contains("authorization: bearer secret-token"));
        assert!(raw.contains("accept: application/json"));
    }

    #[tokio::test]
    async fn non_200_is_a_sentinel_not_an_error() {
        let (url, _requests) = serve_once(
            "HTTP/1.1 503 Service Unavailable",
            json!({"reason": "inMaintenance"}).to_string(),
        );
        let client = ApiClient::new().unwrap();

        let response = client.fetch(url, "t", None).await;

        assert_eq!(response, ApiResponse::failure(503));
    }

    #[tokio::test]
    async fn invalid_json_on_200_is_reported_as_failure() {
        let (url, _requests) = serve_once("HTTP/1.1 200 OK", "not json".to_string());
        let client = ApiClient::new().unwrap();

        let response = client.fetch(url, "t", None).await;

        assert!(!response.ok);
        assert_eq!(response.status, 200);
        assert!(response.data.is_none());
    }

    #[tokio::test]
    async fn connection_refused_maps_to_transport_failure() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let url = Url::parse(&format!("http://127.0.0.1:{}/v1/brawlers", port)).unwrap();
        let client = ApiClient::new().unwrap();

        let response = client.fetch(url, "t", Some(Duration::from_secs(2))).await;

        assert_eq!(response.status, TRANSPORT_FAILURE_STATUS);
        assert!(!response.ok);
    }

    #[test]
    fn decode_rejects_mismatched_shapes() {
        #[derive(Debug, serde::Deserialize, PartialEq)]
        struct Named {
            name: String,
        }

        let good = ApiResponse::success(json!({"name": "Mia"})).decode::<Named>();
        assert_eq!(good.into_data(), Some(Named { name: "Mia".into() }));

        let bad = ApiResponse::success(json!({"id": 1})).decode::<Named>();
        assert_eq!(bad.status, 200);
        assert!(!bad.ok);

        let failed = ApiResponse::<Value>::failure(404).decode::<Named>();
        assert_eq!(failed, ApiResponse::failure(404));
    }
}
