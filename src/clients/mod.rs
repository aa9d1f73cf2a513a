//! HTTP client types for MWS API communication.
//!
//! This module provides the request pipeline shared by every API section:
//! signing, transport, response decoding and pagination.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`MwsRequest`]: An unsigned request to one MWS action
//! - [`SignedRequest`]: The authenticated form of a request
//! - [`HttpClient`]: Assembles and executes requests
//! - [`Transport`]: The execution seam, implemented by [`HttpClient`]
//! - [`collect_all`] / [`ListOperation`] / [`Page`]: Continuation-token pagination
//! - [`decode_response`] / [`ErrorResponse`]: XML response decoding
//! - [`MwsError`]: The unified error type
//!
//! # Example
//!
//! ```rust,ignore
//! use mws_api::clients::{HttpClient, HttpMethod, MwsRequest};
//!
//! let client = HttpClient::new(&config)?;
//! let request = MwsRequest::builder(HttpMethod::Post, &endpoint, "GetReportCount").build();
//!
//! let signed = client.assemble(request)?;
//! let body = client.execute(&signed, &cancel).await?;
//! ```
//!
//! # Retry Behavior
//!
//! - **429 (Throttled)**: Retries using `Retry-After` header value, or 1 second if not present
//! - **5xx (Server Error)**: Retries with fixed 1-second delay
//! - **Other errors (4xx)**: Returns immediately without retry
//!
//! The default `tries` is 1, meaning no automatic retries. Configure via
//! [`MwsRequestBuilder::tries`] to enable retries.

mod errors;
mod http_client;
mod http_request;
mod http_response;
mod pager;

pub use errors::{ApiError, MaxRetriesExceededError, MwsError};
pub use http_client::{HttpClient, Transport, MAX_RETRY_AFTER, RETRY_WAIT_TIME, SDK_VERSION};
pub use http_request::{
    HttpMethod, MwsRequest, MwsRequestBuilder, RequestBody, SignedRequest, XML_CONTENT_TYPE,
};
pub use http_response::{decode_response, ErrorDetail, ErrorResponse, ResponseMetadata};
pub use pager::{collect_all, ListOperation, Page, PaginationError};
