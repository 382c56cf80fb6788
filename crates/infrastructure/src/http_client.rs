// Rust guideline compliant 2026-10-18

//! HTTP transport collaborator.
//!
//! [`HttpClient`] sends one request and returns the fully received response,
//! then publishes [`HttpEvent::RequestCompleted`]. The live transport is
//! [`ReqwestFetch`]; [`NullFetch`] answers from a path-keyed table and never
//! touches the network.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use event_bus::{Event, EventBus};
use reqwest::Method;
use url::Url;

/// Path key matching any request without an exact entry in [`NullHttpConfig`].
pub const WILDCARD_PATH: &str = "*";

/// Request timeout of the live transport.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// Request / response
// ---------------------------------------------------------------------------

/// An outbound HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Request method.
    pub method: Method,
    /// Absolute target URL.
    pub url: Url,
    /// Request headers.
    pub headers: BTreeMap<String, String>,
    /// Optional request body.
    pub body: Option<String>,
}

impl HttpRequest {
    /// Create a request without headers or body.
    #[must_use]
    pub fn new(method: Method, url: Url) -> Self {
        Self { method, url, headers: BTreeMap::new(), body: None }
    }

    /// Shorthand for a `GET` request.
    #[must_use]
    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    /// Add or replace a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set the request body.
    #[must_use]
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// A fully received HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Numeric status code.
    pub status: u16,
    /// Response headers; names are lower-case.
    pub headers: BTreeMap<String, String>,
    /// Response body decoded as text.
    pub body: String,
}

/// Events published by [`HttpClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpEvent {
    /// A response was fully received.
    RequestCompleted {
        /// The request as sent.
        request: HttpRequest,
        /// The response as returned to the caller.
        response: HttpResponse,
    },
}

impl Event for HttpEvent {
    fn kind(&self) -> &'static str {
        match self {
            Self::RequestCompleted { .. } => "request_completed",
        }
    }
}

/// Errors from the HTTP transport.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// The live `reqwest` client could not be built.
    #[error("cannot initialise http client: {0}")]
    Init(#[source] reqwest::Error),
    /// No response was obtained for `url`.
    ///
    /// Live failures (connection, DNS, timeout, body read) and failures
    /// configured on the stand-in both surface here, with the cause as
    /// `source`.
    #[error("request to {url} failed: {source}")]
    Transport {
        /// Requested URL.
        url: Url,
        /// Underlying failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl HttpError {
    fn transport(url: &Url, source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Transport { url: url.clone(), source: source.into() }
    }
}

/// Failure reason configured with [`NullHttpConfig::fail`].
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct ConfiguredFailure(String);

// ---------------------------------------------------------------------------
// Transports
// ---------------------------------------------------------------------------

/// Seam between [`HttpClient`] and the component performing the exchange.
#[expect(
    async_fn_in_trait,
    reason = "no dyn dispatch needed; internal workspace only"
)]
pub trait Fetch {
    /// Perform `request` and return the complete response.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] when no response could be obtained.
    async fn fetch(&self, request: &HttpRequest) -> Result<HttpResponse, HttpError>;
}

/// Live transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestFetch {
    client: reqwest::Client,
}

impl Fetch for ReqwestFetch {
    async fn fetch(&self, request: &HttpRequest) -> Result<HttpResponse, HttpError> {
        let mut builder = self.client.request(request.method.clone(), request.url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let raw = builder.send().await.map_err(|error| HttpError::transport(&request.url, error))?;
        let status = raw.status().as_u16();
        let headers = raw
            .headers()
            .iter()
            .map(|(name, value)| {
                (name.as_str().to_owned(), String::from_utf8_lossy(value.as_bytes()).into_owned())
            })
            .collect();
        let body = raw.text().await.map_err(|error| HttpError::transport(&request.url, error))?;
        Ok(HttpResponse { status, headers, body })
    }
}

/// A canned stand-in response. Unset parts default to `200`, no headers and
/// an empty body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NullResponse {
    status: u16,
    headers: BTreeMap<String, String>,
    body: String,
}

impl NullResponse {
    /// `200` with no headers and an empty body.
    #[must_use]
    pub fn new() -> Self {
        Self { status: 200, headers: BTreeMap::new(), body: String::new() }
    }

    /// Override the status code.
    #[must_use]
    pub fn status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Add a response header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Override the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    fn to_response(&self) -> HttpResponse {
        HttpResponse {
            status: self.status,
            headers: self.headers.clone(),
            body: self.body.clone(),
        }
    }
}

impl Default for NullResponse {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum NullReply {
    Respond(NullResponse),
    Fail(String),
}

/// Stand-in configuration: URL path to canned reply.
///
/// Paths are matched exactly against [`Url::path`]; the [`WILDCARD_PATH`]
/// entry answers everything else. Without a wildcard the stand-in answers
/// `404 "Default null response"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NullHttpConfig {
    replies: HashMap<String, NullReply>,
}

impl NullHttpConfig {
    /// Empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer requests for `path` with `response`.
    #[must_use]
    pub fn respond(mut self, path: impl Into<String>, response: NullResponse) -> Self {
        self.replies.insert(path.into(), NullReply::Respond(response));
        self
    }

    /// Answer requests for `path` with a transport failure.
    #[must_use]
    pub fn fail(mut self, path: impl Into<String>, reason: impl Into<String>) -> Self {
        self.replies.insert(path.into(), NullReply::Fail(reason.into()));
        self
    }

    /// Shorthand for `respond(WILDCARD_PATH, response)`.
    #[must_use]
    pub fn default_response(self, response: NullResponse) -> Self {
        self.respond(WILDCARD_PATH, response)
    }
}

/// Stand-in transport answering from a [`NullHttpConfig`]; performs no I/O.
#[derive(Debug, Clone)]
pub struct NullFetch {
    config: NullHttpConfig,
    fallback: NullResponse,
}

impl Fetch for NullFetch {
    async fn fetch(&self, request: &HttpRequest) -> Result<HttpResponse, HttpError> {
        let reply = self
            .config
            .replies
            .get(request.url.path())
            .or_else(|| self.config.replies.get(WILDCARD_PATH));
        match reply {
            Some(NullReply::Respond(response)) => Ok(response.to_response()),
            Some(NullReply::Fail(reason)) => {
                Err(HttpError::transport(&request.url, ConfiguredFailure(reason.clone())))
            }
            None => Ok(self.fallback.to_response()),
        }
    }
}

// ---------------------------------------------------------------------------
// HttpClient
// ---------------------------------------------------------------------------

/// Sends HTTP requests and announces each completed exchange.
///
/// Build with [`HttpClient::create`] (real network) or
/// [`HttpClient::create_null`] (canned answers).
#[derive(Debug)]
pub struct HttpClient<F = ReqwestFetch> {
    fetch: F,
    events: EventBus<HttpEvent>,
}

impl HttpClient<ReqwestFetch> {
    /// Live client with [`DEFAULT_TIMEOUT`].
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Init`] when the TLS backend cannot be initialised.
    pub fn create() -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(HttpError::Init)?;
        Ok(Self::with_client(client))
    }

    /// Live client around a pre-configured `reqwest` client.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self::new(ReqwestFetch { client })
    }
}

impl HttpClient<NullFetch> {
    /// Stand-in client answering from `config`.
    #[must_use]
    pub fn create_null(config: NullHttpConfig) -> Self {
        let fallback = NullResponse::new().status(404).body("Default null response");
        Self::new(NullFetch { config, fallback })
    }
}

impl<F: Fetch> HttpClient<F> {
    /// Wrap an arbitrary transport.
    #[must_use]
    pub fn new(fetch: F) -> Self {
        Self { fetch, events: EventBus::new() }
    }

    /// Event stream of this client.
    #[must_use]
    pub fn events(&self) -> &EventBus<HttpEvent> {
        &self.events
    }

    /// Send `request` and return the fully received response.
    ///
    /// Publishes [`HttpEvent::RequestCompleted`] once the response is
    /// complete; nothing is published on failure. The status code is not
    /// interpreted.
    ///
    /// # Errors
    ///
    /// Returns the transport's [`HttpError`] unchanged.
    pub async fn send_request(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        tracing::debug!(method = %request.method, url = %request.url, "http_client.request");
        let response = self.fetch.fetch(&request).await?;
        tracing::debug!(url = %request.url, status = response.status, "http_client.response");
        self.events.publish(&HttpEvent::RequestCompleted {
            request,
            response: response.clone(),
        });
        Ok(response)
    }
}
