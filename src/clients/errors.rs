//! Error types for MWS API calls.
//!
//! # Error Handling
//!
//! The SDK distinguishes failures by where they happen:
//!
//! - [`MwsError::Config`]: Missing credentials or region, raised before any network call
//! - [`MwsError::EndpointParse`]: The endpoint is not a well-formed URL
//! - [`MwsError::Transport`]: Network-level failure (connection, DNS, timeout)
//! - [`MwsError::Api`]: The service answered with an error ([`ApiError`])
//! - [`MwsError::Encoding`] / [`MwsError::Decoding`]: XML could not be produced or understood
//! - [`MwsError::Cancelled`]: The caller's cancellation token fired
//!
//! No error is retried unless the request opted in with
//! [`MwsRequestBuilder::tries`](crate::clients::MwsRequestBuilder::tries).
//!
//! # Example
//!
//! ```rust,ignore
//! use mws_api::clients::MwsError;
//!
//! match client.execute(request, &cancel).await {
//!     Ok(bytes) => println!("{} bytes", bytes.len()),
//!     Err(MwsError::Api(e)) => {
//!         if let Some(details) = e.details() {
//!             println!("request {}: {:?}", details.request_id, details.errors);
//!         }
//!     }
//!     Err(MwsError::Transport(e)) => println!("network error: {e}"),
//!     Err(other) => println!("{other}"),
//! }
//! ```

use std::fmt;

use bytes::Bytes;
use thiserror::Error;

use crate::clients::http_response::ErrorResponse;
use crate::error::ConfigError;
use crate::feeds::EncodingError;

/// Error returned when the service answers with a non-success status.
///
/// The body is kept verbatim; MWS sends an XML `ErrorResponse` envelope
/// which [`details`](Self::details) decodes on demand.
#[derive(Debug, Clone)]
pub struct ApiError {
    /// The HTTP status code of the response.
    pub status: u16,
    /// The raw response body.
    pub body: Bytes,
}

impl ApiError {
    /// Creates an API error from a status code and raw body.
    #[must_use]
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Decodes the body as an MWS `ErrorResponse` envelope.
    ///
    /// Returns `None` if the body is not a well-formed envelope.
    #[must_use]
    pub fn details(&self) -> Option<ErrorResponse> {
        ErrorResponse::from_xml(&self.body).ok()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MWS API error (status {})", self.status)?;
        match self.details() {
            Some(details) => write!(f, ": {details}"),
            None if self.body.is_empty() => Ok(()),
            None => write!(f, ": {}", String::from_utf8_lossy(&self.body)),
        }
    }
}

impl std::error::Error for ApiError {}

/// Error returned when retry attempts for 429/5xx responses are exhausted.
#[derive(Debug, Error)]
#[error("Exceeded maximum retry count of {tries}. Last error: {last}")]
pub struct MaxRetriesExceededError {
    /// The number of tries that were attempted.
    pub tries: u32,
    /// The error response of the final attempt.
    pub last: ApiError,
}

/// Unified error type for MWS API operations.
#[derive(Debug, Error)]
pub enum MwsError {
    /// Configuration is incomplete (credentials, region).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The endpoint is not a well-formed URL.
    #[error("Invalid endpoint '{endpoint}': {source}")]
    EndpointParse {
        /// The endpoint that failed to parse.
        endpoint: String,
        /// The underlying parse error.
        source: url::ParseError,
    },

    /// Network or connection error.
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service returned an error response.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Retry attempts were exhausted.
    #[error(transparent)]
    MaxRetries(#[from] MaxRetriesExceededError),

    /// A feed document could not be encoded.
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    /// A response did not match the expected document shape.
    #[error("Unable to decode API response: {message}")]
    Decoding {
        /// Description of the decoding failure.
        message: String,
    },

    /// Writing a downloaded report failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The operation was cancelled by the caller.
    #[error("Operation cancelled")]
    Cancelled,

    /// Report polling gave up before the report was ready.
    #[error("Report not ready after {attempts} status checks")]
    PollExhausted {
        /// The number of status checks performed.
        attempts: u32,
    },

    /// The service cancelled report generation.
    #[error("Report request {request_id} was cancelled by the service")]
    ReportCancelled {
        /// The report request id.
        request_id: String,
    },

    /// The report finished without producing any data.
    #[error("Report request {request_id} completed with no data")]
    ReportEmpty {
        /// The report request id.
        request_id: String,
    },
}

impl MwsError {
    /// Returns the [`ApiError`] behind this error, if any.
    #[must_use]
    pub const fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(e) => Some(e),
            Self::MaxRetries(e) => Some(&e.last),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ERROR_XML: &str = r#"<?xml version="1.0"?>
<ErrorResponse xmlns="https://mws.amazonservices.com/Orders/2013-09-01">
  <Error>
    <Type>Sender</Type>
    <Code>InvalidParameterValue</Code>
    <Message>CreatedAfter date is in the future</Message>
  </Error>
  <RequestId>e0ed3e1d-d5a3-4c4e-8f2c-1a9f6f0b2c11</RequestId>
</ErrorResponse>"#;

    #[test]
    fn test_api_error_display_uses_decoded_messages() {
        let error = ApiError::new(400, ERROR_XML);
        let message = error.to_string();
        assert!(message.contains("status 400"));
        assert!(message.contains("CreatedAfter date is in the future"));
    }

    #[test]
    fn test_api_error_display_falls_back_to_raw_body() {
        let error = ApiError::new(503, "Service Unavailable");
        assert_eq!(
            error.to_string(),
            "MWS API error (status 503): Service Unavailable"
        );
        assert!(error.details().is_none());
    }

    #[test]
    fn test_api_error_details() {
        let error = ApiError::new(400, ERROR_XML);
        let details = error.details().unwrap();
        assert_eq!(details.request_id, "e0ed3e1d-d5a3-4c4e-8f2c-1a9f6f0b2c11");
        assert_eq!(details.errors.len(), 1);
        assert_eq!(details.errors[0].code, "InvalidParameterValue");
    }

    #[test]
    fn test_max_retries_error_includes_retry_count() {
        let error = MaxRetriesExceededError {
            tries: 3,
            last: ApiError::new(429, ""),
        };
        let message = error.to_string();
        assert!(message.contains('3'));
        assert!(message.contains("Exceeded maximum retry count"));
    }

    #[test]
    fn test_api_error_accessor() {
        let error = MwsError::from(ApiError::new(500, ""));
        assert_eq!(error.api_error().map(|e| e.status), Some(500));
        assert!(MwsError::Cancelled.api_error().is_none());
    }

    #[test]
    fn test_config_error_is_transparent() {
        let error = MwsError::from(ConfigError::IncompleteCredentials {
            field: "secret_key",
        });
        assert!(error.to_string().contains("secret_key"));
    }

    #[test]
    fn test_error_types_implement_std_error() {
        let _: &dyn std::error::Error = &ApiError::new(400, "");
        let _: &dyn std::error::Error = &MwsError::Cancelled;
    }
}
