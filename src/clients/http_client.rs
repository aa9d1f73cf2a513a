//! HTTP client for MWS API communication.
//!
//! This module provides the [`HttpClient`] type, which assembles signed
//! requests and executes them, and the [`Transport`] trait the pager and the
//! endpoint wrappers are written against.

use std::path::Path;
use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use reqwest::header::{CONTENT_TYPE, RETRY_AFTER, USER_AGENT};
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::auth::{
    canonical_query_string, compute_signature, format_timestamp, string_to_sign,
    SIGNATURE_METHOD, SIGNATURE_VERSION,
};
use crate::clients::errors::{ApiError, MaxRetriesExceededError, MwsError};
use crate::clients::http_request::{HttpMethod, MwsRequest, SignedRequest};
use crate::config::{Credentials, MwsConfig, Region};
use crate::error::ConfigError;

/// Fixed retry wait time in seconds.
pub const RETRY_WAIT_TIME: u64 = 1;

/// Ceiling for a wait requested through `Retry-After`.
pub const MAX_RETRY_AFTER: Duration = Duration::from_secs(60);

/// SDK version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Executes MWS requests.
///
/// [`HttpClient`] is the production implementation; tests substitute their
/// own to drive the pager without a network.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Signs and sends `request`, returning the raw success body.
    ///
    /// # Errors
    ///
    /// Returns [`MwsError`] if the request cannot be assembled, the call
    /// fails, or `cancel` fires.
    async fn call(&self, request: MwsRequest, cancel: &CancellationToken)
        -> Result<Bytes, MwsError>;

    /// Signs and sends `request`, writing the success body to `path`.
    ///
    /// Returns the number of bytes written. The default implementation
    /// buffers the body through [`call`](Self::call).
    ///
    /// # Errors
    ///
    /// Returns [`MwsError`] as [`call`](Self::call) does, or
    /// [`MwsError::Io`] if the file cannot be written.
    async fn call_to_file(
        &self,
        request: MwsRequest,
        cancel: &CancellationToken,
        path: &Path,
    ) -> Result<u64, MwsError> {
        let body = self.call(request, cancel).await?;
        tokio::fs::write(path, &body).await?;
        Ok(body.len() as u64)
    }
}

/// HTTP client for making requests to the MWS API.
///
/// The client handles:
/// - Credential gating and request signing
/// - The `User-Agent` and `Content-Type` headers
/// - Status classification and opt-in retries for 429 and 5xx responses
/// - Cancellation of in-flight calls
///
/// # Thread Safety
///
/// `HttpClient` is `Send + Sync`, making it safe to share across async tasks.
///
/// # Example
///
/// ```rust,no_run
/// use mws_api::{ApiSection, Credentials, MwsConfig, RegionTable};
/// use mws_api::clients::{HttpClient, HttpMethod, MwsRequest};
/// use tokio_util::sync::CancellationToken;
///
/// # async fn run() -> Result<(), mws_api::clients::MwsError> {
/// let config = MwsConfig::builder()
///     .credentials(Credentials::new("access-id", "secret", "merchant"))
///     .country("US", &RegionTable::default())?
///     .build()?;
/// let client = HttpClient::new(&config)?;
///
/// let request = MwsRequest::builder(
///     HttpMethod::Post,
///     &config.endpoint(ApiSection::Reports),
///     "GetReportCount",
/// )
/// .build();
///
/// let signed = client.assemble(request)?;
/// let body = client.execute(&signed, &CancellationToken::new()).await?;
/// println!("{} bytes", body.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct HttpClient {
    /// The internal reqwest HTTP client.
    client: reqwest::Client,
    /// Credentials used to sign every request.
    credentials: Credentials,
    /// Region supplying the marketplace id.
    region: Region,
    /// Value of the `User-Agent` header.
    user_agent: String,
}

// Verify HttpClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpClient>();
};

impl HttpClient {
    /// Creates a new HTTP client from the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`MwsError::Transport`] if the underlying reqwest client
    /// cannot be created (e.g., TLS initialization failure).
    pub fn new(config: &MwsConfig) -> Result<Self, MwsError> {
        let app_name = config.app_name().unwrap_or(env!("CARGO_PKG_NAME"));
        let user_agent = format!(
            "{app_name}/{SDK_VERSION} (Language=Rust; Platform={})",
            std::env::consts::OS
        );

        let mut builder = reqwest::Client::builder().use_rustls_tls();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            credentials: config.credentials().clone(),
            region: config.region().clone(),
            user_agent,
        })
    }

    /// Returns the `User-Agent` header value sent with every request.
    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Returns the merchant id requests are signed for.
    #[must_use]
    pub fn merchant_id(&self) -> &str {
        self.credentials.merchant_id()
    }

    /// Authenticates `request` with the current time as its `Timestamp`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::IncompleteCredentials`] (wrapped in
    /// [`MwsError::Config`]) if any credential or the marketplace id is
    /// empty, or [`MwsError::EndpointParse`] if the endpoint is malformed.
    pub fn assemble(&self, request: MwsRequest) -> Result<SignedRequest, MwsError> {
        self.assemble_at(request, Utc::now())
    }

    /// Authenticates `request` using `timestamp`.
    ///
    /// Adds `SellerId`, `AWSAccessKeyId`, `MarketplaceId.Id.1`,
    /// `SignatureMethod`, `SignatureVersion` and `Timestamp`, then signs the
    /// canonical query and appends `Signature`.
    ///
    /// # Errors
    ///
    /// See [`assemble`](Self::assemble).
    pub fn assemble_at(
        &self,
        request: MwsRequest,
        timestamp: DateTime<Utc>,
    ) -> Result<SignedRequest, MwsError> {
        self.check_credentials()?;

        let endpoint = request.endpoint.url();
        let mut params = request.params;
        params.set("SellerId", self.credentials.merchant_id());
        params.set("AWSAccessKeyId", self.credentials.access_key_id());
        params.set("MarketplaceId.Id.1", self.region.marketplace_id());
        params.set("SignatureMethod", SIGNATURE_METHOD);
        params.set("SignatureVersion", SIGNATURE_VERSION);
        params.set("Timestamp", format_timestamp(&timestamp));

        let endpoint_error = |source| MwsError::EndpointParse {
            endpoint: endpoint.to_string(),
            source,
        };
        let to_sign = string_to_sign(
            request.method.as_str(),
            endpoint,
            &canonical_query_string(&params),
        )
        .map_err(endpoint_error)?;
        let signature = compute_signature(&to_sign, self.credentials.secret_key().as_ref());
        params.set("Signature", signature);

        let mut url = Url::parse(endpoint).map_err(endpoint_error)?;
        url.set_query(Some(&canonical_query_string(&params)));

        Ok(SignedRequest {
            method: request.method,
            url,
            params,
            body: request.body,
            tries: request.tries,
        })
    }

    /// Sends a signed request and returns the raw success body.
    ///
    /// # Errors
    ///
    /// Returns [`MwsError`] if:
    /// - Network error occurs (`Transport`)
    /// - A status other than 200 is received (`Api`)
    /// - Retry attempts are exhausted (`MaxRetries`)
    /// - The token is cancelled (`Cancelled`)
    pub async fn execute(
        &self,
        request: &SignedRequest,
        cancel: &CancellationToken,
    ) -> Result<Bytes, MwsError> {
        let response = self.send(request, cancel).await?;
        let body = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(MwsError::Cancelled),
            body = response.bytes() => body?,
        };
        tracing::debug!(
            action = request.action(),
            bytes = body.len(),
            "Received MWS response"
        );
        Ok(body)
    }

    /// Sends a signed request and streams the success body into `path`.
    ///
    /// The destination is created or truncated before the first chunk is
    /// written. On failure a partially written file may remain.
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns [`MwsError`] as [`execute`](Self::execute) does, or
    /// [`MwsError::Io`] if the file cannot be written.
    pub async fn download(
        &self,
        request: &SignedRequest,
        cancel: &CancellationToken,
        path: &Path,
    ) -> Result<u64, MwsError> {
        let mut response = self.send(request, cancel).await?;
        let mut file = tokio::fs::File::create(path).await?;

        let mut written: u64 = 0;
        loop {
            let chunk = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(MwsError::Cancelled),
                chunk = response.chunk() => chunk?,
            };
            let Some(chunk) = chunk else {
                break;
            };
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        tracing::debug!(
            action = request.action(),
            bytes = written,
            path = %path.display(),
            "Downloaded MWS response"
        );
        Ok(written)
    }

    fn check_credentials(&self) -> Result<(), ConfigError> {
        let fields = [
            ("access_key_id", self.credentials.access_key_id().is_empty()),
            ("secret_key", self.credentials.secret_key().is_empty()),
            ("merchant_id", self.credentials.merchant_id().is_empty()),
            ("marketplace_id", self.region.marketplace_id().is_empty()),
        ];
        match fields.into_iter().find(|(_, empty)| *empty) {
            Some((field, _)) => Err(ConfigError::IncompleteCredentials { field }),
            None => Ok(()),
        }
    }

    /// Sends the request until it succeeds or may no longer be retried.
    async fn send(
        &self,
        request: &SignedRequest,
        cancel: &CancellationToken,
    ) -> Result<reqwest::Response, MwsError> {
        let mut tries: u32 = 0;
        loop {
            tries += 1;

            let mut req_builder = match request.method {
                HttpMethod::Get => self.client.get(request.url.clone()),
                HttpMethod::Post => self.client.post(request.url.clone()),
            };
            req_builder = req_builder.header(USER_AGENT, &self.user_agent);
            if let Some(body) = &request.body {
                req_builder = req_builder
                    .header(CONTENT_TYPE, body.content_type)
                    .body(body.bytes.clone());
            }

            tracing::debug!(
                action = request.action(),
                method = %request.method,
                endpoint = %Self::endpoint_of(&request.url),
                attempt = tries,
                "Sending MWS request"
            );

            let res = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(MwsError::Cancelled),
                res = req_builder.send() => res.map_err(|e| {
                    tracing::error!(action = request.action(), error = %e, "MWS request failed");
                    MwsError::Transport(e)
                })?,
            };

            let code = res.status().as_u16();
            if code == 200 {
                return Ok(res);
            }

            let retry_after = Self::parse_retry_after(res.headers());
            let body = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(MwsError::Cancelled),
                body = res.bytes() => body.map_err(|e| {
                    tracing::error!(
                        action = request.action(),
                        status = code,
                        error = %e,
                        "Failed to read MWS error body"
                    );
                    MwsError::Transport(e)
                })?,
            };
            let error = ApiError::new(code, body);

            let should_retry = code == 429 || code >= 500;
            if !should_retry || request.tries == 1 {
                return Err(error.into());
            }
            if tries >= request.tries {
                return Err(MaxRetriesExceededError {
                    tries: request.tries,
                    last: error,
                }
                .into());
            }

            let delay = Self::calculate_retry_delay(retry_after, code);
            tracing::warn!(
                action = request.action(),
                status = code,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                "Retrying MWS request"
            );
            tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(MwsError::Cancelled),
                () = tokio::time::sleep(delay) => {}
            }
        }
    }

    /// Returns the URL without its (signed) query string, for logging.
    fn endpoint_of(url: &Url) -> String {
        let mut endpoint = url.clone();
        endpoint.set_query(None);
        endpoint.to_string()
    }

    /// Parses a `Retry-After` header given in seconds.
    fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<f64> {
        headers
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<f64>().ok())
            .filter(|seconds| seconds.is_finite() && *seconds >= 0.0)
    }

    /// Calculates the retry delay based on the status code.
    fn calculate_retry_delay(retry_after: Option<f64>, status: u16) -> Duration {
        // Retry-After is only honoured for throttling responses
        if status == 429 {
            if let Some(seconds) = retry_after {
                return Duration::try_from_secs_f64(seconds)
                    .map_or(MAX_RETRY_AFTER, |delay| delay.min(MAX_RETRY_AFTER));
            }
        }
        Duration::from_secs(RETRY_WAIT_TIME)
    }
}

impl Transport for HttpClient {
    async fn call(
        &self,
        request: MwsRequest,
        cancel: &CancellationToken,
    ) -> Result<Bytes, MwsError> {
        let signed = self.assemble(request)?;
        self.execute(&signed, cancel).await
    }

    async fn call_to_file(
        &self,
        request: MwsRequest,
        cancel: &CancellationToken,
        path: &Path,
    ) -> Result<u64, MwsError> {
        let signed = self.assemble(request)?;
        self.download(&signed, cancel, path).await
    }
}
