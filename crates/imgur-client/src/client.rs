//! Imgur HTTP client implementation

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{
    HeaderMap, HeaderValue, AUTHORIZATION, CACHE_CONTROL, CONNECTION, CONTENT_LENGTH,
    CONTENT_TYPE, HOST,
};
use reqwest::Client;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};
use url::Url;

use crate::config::{ClientConfig, ConfigSource, YamlConfigSource};
use crate::error::{ImgurError, Result};
use crate::types::{decode_delete_response, decode_upload_response, UploadRequest, UploadResult};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Operations an image host exposes to callers
#[async_trait]
pub trait ImageHost: Send + Sync {
    /// Upload one image
    async fn upload(&self, request: UploadRequest) -> Result<UploadResult>;

    /// Delete an image using the delete-hash returned at upload time
    async fn delete(&self, delete_hash: &str) -> Result<()>;

    /// Load credentials and endpoint overrides from the conventional config file
    fn setup(&mut self) -> Result<()>;
}

/// Per-call deadline and cancellation
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    pub deadline: Option<Duration>,
    pub cancel: Option<CancellationToken>,
}

impl CallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort the call with [`ImgurError::Timeout`] once `deadline` elapses
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Abort the call with [`ImgurError::Cancelled`] when `token` is cancelled
    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// Imgur upload client
///
/// Cheap to clone; clones share the connection pool. Configuration is
/// read-only during calls, so concurrent uploads need no locking.
#[derive(Debug, Clone)]
pub struct ImgurUploader {
    client: Client,
    config: ClientConfig,
}

impl ImgurUploader {
    /// Create an uploader for the given configuration
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeouts.request())
            .connect_timeout(config.timeouts.connect())
            .build()?;

        Ok(Self { client, config })
    }

    /// Create an uploader against the public API with only a client ID
    pub fn with_client_id(client_id: impl Into<String>) -> Result<Self> {
        Self::new(ClientConfig::builder().client_id(client_id).build())
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Overlay configuration from any source
    pub fn setup_from(&mut self, source: &dyn ConfigSource) -> Result<()> {
        self.config.apply(source)?;
        debug!(upload_url = %self.config.upload_url, "Configuration applied");
        Ok(())
    }

    // =========================================================================
    // Upload
    // =========================================================================

    /// Upload an image with a deadline and/or cancellation token
    #[instrument(skip(self, request, options), fields(url = %self.config.upload_url))]
    pub async fn upload_with(
        &self,
        request: UploadRequest,
        options: CallOptions,
    ) -> Result<UploadResult> {
        request.validate()?;
        let body = request.to_form_body();

        guard(self.send_upload(body), &options).await
    }

    async fn send_upload(&self, body: String) -> Result<UploadResult> {
        let url = Url::parse(&self.config.upload_url)?;
        let headers = self.upload_headers(&url, body.len())?;
        debug!(bytes = body.len(), "Uploading image to {}", url);

        let response = self
            .client
            .post(url)
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(ImgurError::from_transport)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(ImgurError::from_transport)?;
        debug!(%status, bytes = bytes.len(), "Upload response received");

        decode_upload_response(status, &bytes)
    }

    fn upload_headers(&self, url: &Url, content_length: usize) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, self.client_id_header()?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
        headers.insert(HOST, header_value(&host_header(url)?)?);
        headers.insert(CONTENT_LENGTH, HeaderValue::from(content_length));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        Ok(headers)
    }

    fn client_id_header(&self) -> Result<HeaderValue> {
        header_value(&format!("Client-ID {}", self.config.client_id))
    }

    // =========================================================================
    // Delete
    // =========================================================================

    /// Delete an image with a deadline and/or cancellation token
    #[instrument(skip(self, delete_hash, options))]
    pub async fn delete_with(&self, delete_hash: &str, options: CallOptions) -> Result<()> {
        let url = self.delete_url(delete_hash)?;
        guard(self.send_delete(url), &options).await
    }

    async fn send_delete(&self, url: Url) -> Result<()> {
        debug!("Deleting image at {}", url);

        let response = self
            .client
            .delete(url)
            .header(AUTHORIZATION, self.client_id_header()?)
            .send()
            .await
            .map_err(ImgurError::from_transport)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(ImgurError::from_transport)?;
        debug!(%status, "Delete response received");

        decode_delete_response(status, &bytes)
    }

    /// `{image_url}/{delete_hash}`, with the hash as a single path segment
    pub fn delete_url(&self, delete_hash: &str) -> Result<Url> {
        if delete_hash.is_empty() {
            return Err(ImgurError::InvalidRequest(
                "delete hash must not be empty".to_string(),
            ));
        }
        if delete_hash.chars().any(char::is_whitespace) {
            return Err(ImgurError::InvalidRequest(format!(
                "delete hash contains whitespace: {:?}",
                delete_hash
            )));
        }

        let mut url = Url::parse(&self.config.image_url)?;
        url.path_segments_mut()
            .map_err(|_| ImgurError::Encoding("image URL cannot be a base".to_string()))?
            .pop_if_empty()
            .push(delete_hash);
        Ok(url)
    }

    // =========================================================================
    // OAuth
    // =========================================================================

    /// Build the URL a user visits to authorize this application.
    ///
    /// Only the URL is produced; exchanging the resulting token is up to the caller.
    pub fn authorize_url(&self, response_type: &str, state: Option<&str>) -> Result<Url> {
        let mut url = Url::parse(&self.config.authorization_url)?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("client_id", &self.config.client_id);
            query.append_pair("response_type", response_type);
            if let Some(state) = state {
                query.append_pair("state", state);
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl ImageHost for ImgurUploader {
    async fn upload(&self, request: UploadRequest) -> Result<UploadResult> {
        self.upload_with(request, CallOptions::default()).await
    }

    async fn delete(&self, delete_hash: &str) -> Result<()> {
        self.delete_with(delete_hash, CallOptions::default()).await
    }

    fn setup(&mut self) -> Result<()> {
        let source = YamlConfigSource::from_default_location()?;
        self.setup_from(&source)
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Run a request future under the call's deadline and cancellation token.
///
/// Dropping the inner future aborts the in-flight request.
async fn guard<T, F>(request: F, options: &CallOptions) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let bounded = async {
        match options.deadline {
            Some(deadline) => tokio::time::timeout(deadline, request)
                .await
                .map_err(|_| ImgurError::Timeout)?,
            None => request.await,
        }
    };

    match &options.cancel {
        Some(token) => tokio::select! {
            biased;
            _ = token.cancelled() => Err(ImgurError::Cancelled),
            result = bounded => result,
        },
        None => bounded.await,
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| ImgurError::Encoding(format!("Invalid header value: {}", e)))
}

fn host_header(url: &Url) -> Result<String> {
    let host = url
        .host_str()
        .ok_or_else(|| ImgurError::Encoding(format!("URL has no host: {}", url)))?;
    Ok(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}
