//! Feeds API (`Feeds/2009-01-01`).
//!
//! Feeds are XML documents that update seller data in bulk. This module
//! encodes the four supported feed kinds and submits them.
//!
//! # Example
//!
//! ```rust,ignore
//! use mws_api::feeds::{FeedMessages, FeedsApi, InventoryUpdate};
//!
//! let feeds = FeedsApi::new(&client, &config);
//! let messages = FeedMessages::from(vec![InventoryUpdate::new("SKU-1", 12)]);
//!
//! let response = feeds.submit_feed(&messages, &cancel).await?;
//! println!("submission {}", response.result.info.feed_submission_id);
//! ```

mod document;

pub use document::{
    content_md5, encode, FeedBody, FeedKind, FeedMessage, FeedMessages, FulfillmentData,
    FulfillmentItem, InventoryUpdate, OrderAcknowledgement, OrderFulfillment, PriceUpdate,
    DOCUMENT_VERSION,
};

use serde::Deserialize;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::clients::{
    decode_response, HttpMethod, MwsError, MwsRequest, RequestBody, ResponseMetadata, Transport,
};
use crate::config::{ApiSection, Endpoint, MwsConfig};

/// Errors raised while building a feed document.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodingError {
    /// The feed has no messages.
    #[error("Feed has no messages")]
    NoFeedMessages,

    /// Messages of different kinds were combined in one feed.
    #[error("Feed mixes message kinds: expected {expected}, found {found}")]
    MixedMessageKinds {
        /// Kind of the first message.
        expected: FeedKind,
        /// Kind of the first message that did not match.
        found: FeedKind,
    },

    /// The XML writer failed.
    #[error("Unable to encode feed document: {message}")]
    Xml {
        /// Description of the failure.
        message: String,
    },
}

/// Status of a submitted feed.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct FeedSubmissionInfo {
    /// Id of the submission.
    #[serde(rename = "FeedSubmissionId", default)]
    pub feed_submission_id: String,
    /// The submitted `FeedType`.
    #[serde(rename = "FeedType", default)]
    pub feed_type: String,
    /// Submission time.
    #[serde(rename = "SubmittedDate", default)]
    pub submitted_date: String,
    /// Processing status (e.g., `_SUBMITTED_`).
    #[serde(rename = "FeedProcessingStatus", default)]
    pub feed_processing_status: String,
}

/// The `SubmitFeedResult` element.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct SubmitFeedResult {
    /// Submission status.
    #[serde(rename = "FeedSubmissionInfo", default)]
    pub info: FeedSubmissionInfo,
}

/// Response of `SubmitFeed`.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct SubmitFeedResponse {
    /// The submission result.
    #[serde(rename = "SubmitFeedResult")]
    pub result: SubmitFeedResult,
    /// Request metadata.
    #[serde(rename = "ResponseMetadata", default)]
    pub metadata: ResponseMetadata,
}

/// Client for the Feeds API.
#[derive(Debug)]
pub struct FeedsApi<'a, T> {
    transport: &'a T,
    endpoint: Endpoint,
    merchant_id: String,
}

impl<'a, T: Transport> FeedsApi<'a, T> {
    /// Creates a Feeds API client for the configured region.
    #[must_use]
    pub fn new(transport: &'a T, config: &MwsConfig) -> Self {
        Self {
            transport,
            endpoint: config.endpoint(ApiSection::Feeds),
            merchant_id: config.credentials().merchant_id().to_string(),
        }
    }

    /// Returns the Feeds endpoint.
    #[must_use]
    pub const fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Builds the `SubmitFeed` request for `messages`.
    ///
    /// The request carries `FeedType`, the encoded document as its body and
    /// the checksum of that exact body as `ContentMD5Value`.
    ///
    /// # Errors
    ///
    /// Returns [`EncodingError`] if the document cannot be encoded.
    pub fn submit_feed_request(&self, messages: &FeedMessages) -> Result<MwsRequest, EncodingError> {
        let body = encode(&self.merchant_id, messages).map_err(|e| {
            tracing::error!(error = %e, kind = %messages.kind(), "Feed encoding failed");
            e
        })?;

        Ok(
            MwsRequest::builder(HttpMethod::Post, &self.endpoint, "SubmitFeed")
                .param("FeedType", body.kind().feed_type())
                .param("ContentMD5Value", body.content_md5())
                .body(RequestBody::xml(body.bytes().clone()))
                .build(),
        )
    }

    /// Encodes and submits a feed.
    ///
    /// # Errors
    ///
    /// Returns [`MwsError::Encoding`] if the document cannot be encoded, or
    /// any transport or decoding error.
    pub async fn submit_feed(
        &self,
        messages: &FeedMessages,
        cancel: &CancellationToken,
    ) -> Result<SubmitFeedResponse, MwsError> {
        let request = self.submit_feed_request(messages)?;
        tracing::debug!(kind = %messages.kind(), messages = messages.len(), "Submitting feed");
        let body = self.transport.call(request, cancel).await?;
        decode_response(&body)
    }
}
