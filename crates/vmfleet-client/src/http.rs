//! HTTP client for the VM management API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder, Response};
use tracing::{debug, instrument};
use url::{ParseError, Url};

use crate::document::Document;
use crate::error::{ClientError, Result};
use crate::traits::{Credentials, RemoteApi};

/// Body sent with every VM action
const ACTION_BODY: &str = "<action/>";

/// Content type the API expects on every request
const XML: &str = "application/xml";

/// HTTP client for the VM collection endpoint (e.g. `https://manager/api/vms/`)
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: Url,
    credentials: Credentials,
}

impl HttpClient {
    /// Create a new HTTP client with default transport settings
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid.
    ///
    /// # Example
    /// ```no_run
    /// use vmfleet_client::{Credentials, HttpClient};
    ///
    /// let creds = Credentials::new("admin@internal", "secret");
    /// let client = HttpClient::new("https://manager.example.com/api/vms/", creds)?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(base_url: impl AsRef<str>, credentials: Credentials) -> Result<Self> {
        Self::with_client(base_url, credentials, Client::new())
    }

    /// Create a new HTTP client with custom `reqwest::Client`
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid.
    pub fn with_client(
        base_url: impl AsRef<str>,
        credentials: Credentials,
        client: Client,
    ) -> Result<Self> {
        Ok(Self {
            client,
            base_url: collection_url(base_url.as_ref())?,
            credentials,
        })
    }

    /// Start building a client with transport options
    pub fn builder(base_url: impl Into<String>, credentials: Credentials) -> HttpClientBuilder {
        HttpClientBuilder::new(base_url.into(), credentials)
    }

    /// Base URL of the VM collection
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build a URL below the collection, one percent-encoded segment each
    ///
    /// Segments never escape the collection: `/`, `?` and `#` in an id are
    /// encoded rather than interpreted.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        if segments.is_empty() {
            return Ok(url);
        }
        url.path_segments_mut()
            .map_err(|()| ClientError::Url(ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Attach credentials and the XML content type
    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .header(CONTENT_TYPE, XML)
    }

    /// Turn a response into a document, or an API error for failure statuses
    async fn read_document(response: Response) -> Result<Document> {
        let status = response.status();

        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            let message = fault_message(&body)
                .or_else(|| status.canonical_reason().map(str::to_string))
                .unwrap_or_else(|| "request failed".to_string());
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await?;
        debug!(bytes = body.len(), "response received");
        Ok(Document::parse(&body)?)
    }
}

#[async_trait]
impl RemoteApi for HttpClient {
    #[instrument(skip(self), level = "debug")]
    async fn fetch(&self, path: &str) -> Result<Document> {
        let url = if path.is_empty() {
            self.url(&[])?
        } else {
            self.url(&[path])?
        };
        let response = self.authorized(self.client.get(url)).send().await?;
        Self::read_document(response).await
    }

    #[instrument(skip(self), level = "debug")]
    async fn post_action(&self, vm_id: &str, verb: &str) -> Result<Document> {
        let url = self.url(&[vm_id, verb])?;
        let response = self
            .authorized(self.client.post(url))
            .body(ACTION_BODY)
            .send()
            .await?;
        Self::read_document(response).await
    }
}

/// Builder for an [`HttpClient`] with transport settings
#[derive(Debug, Clone)]
pub struct HttpClientBuilder {
    base_url: String,
    credentials: Credentials,
    timeout: Option<Duration>,
    accept_invalid_certs: bool,
}

impl HttpClientBuilder {
    fn new(base_url: String, credentials: Credentials) -> Self {
        Self {
            base_url,
            credentials,
            timeout: None,
            accept_invalid_certs: false,
        }
    }

    /// Set the per-request timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Accept self-signed or otherwise invalid TLS certificates
    #[must_use]
    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Build the client
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid or the TLS backend fails
    /// to initialize.
    pub fn build(self) -> Result<HttpClient> {
        let mut builder = Client::builder().danger_accept_invalid_certs(self.accept_invalid_certs);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        HttpClient::with_client(self.base_url, self.credentials, builder.build()?)
    }
}

/// Parse the collection URL, making sure relative joins stay below it
fn collection_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Extract `fault/detail` (or `fault/reason`) from an error body
fn fault_message(body: &[u8]) -> Option<String> {
    let doc = Document::parse(body).ok()?;
    ["fault.detail", "fault.reason"]
        .into_iter()
        .map(|path| doc.text(path))
        .find(|text| !text.is_empty())
}
