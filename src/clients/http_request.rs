//! Request types for the MWS API.
//!
//! This module provides [`MwsRequest`] (an unsigned request descriptor), its
//! builder, and [`SignedRequest`], the authenticated form produced by
//! [`HttpClient::assemble`](crate::clients::HttpClient::assemble).

use std::fmt;

use bytes::Bytes;
use url::Url;

use crate::auth::ParameterBag;
use crate::config::Endpoint;

/// Content type of XML request bodies.
pub const XML_CONTENT_TYPE: &str = "text/xml";

/// HTTP methods used by the MWS API.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    /// HTTP GET.
    Get,
    /// HTTP POST.
    Post,
}

impl HttpMethod {
    /// Returns the upper-case method name, as used in the string-to-sign.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request body and its content type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestBody {
    /// The exact bytes to transmit.
    pub bytes: Bytes,
    /// Value of the `Content-Type` header.
    pub content_type: &'static str,
}

impl RequestBody {
    /// Creates a `text/xml` body.
    #[must_use]
    pub fn xml(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: XML_CONTENT_TYPE,
        }
    }
}

/// An unsigned request to one MWS action.
///
/// Use [`MwsRequest::builder`] to construct requests. The `Action` and
/// `Version` parameters are set by the builder.
///
/// # Example
///
/// ```rust
/// use mws_api::{ApiSection, Endpoint, RegionTable};
/// use mws_api::clients::{HttpMethod, MwsRequest};
///
/// let regions = RegionTable::default();
/// let endpoint = Endpoint::new(regions.lookup("US").unwrap(), ApiSection::Orders);
///
/// let request = MwsRequest::builder(HttpMethod::Get, &endpoint, "ListOrders")
///     .param("CreatedAfter", "2020-01-01T00:00:00Z")
///     .build();
///
/// assert_eq!(request.action(), Some("ListOrders"));
/// assert_eq!(request.params.first("Version"), Some("2013-09-01"));
/// ```
#[derive(Clone, Debug)]
pub struct MwsRequest {
    /// The endpoint the request is sent to.
    pub endpoint: Endpoint,
    /// The HTTP method.
    pub method: HttpMethod,
    /// The request parameters, before authentication parameters are added.
    pub params: ParameterBag,
    /// The request body, if any.
    pub body: Option<RequestBody>,
    /// Number of times to attempt the request (default: 1).
    pub tries: u32,
}

impl MwsRequest {
    /// Creates a new builder for a request to `action` on `endpoint`.
    #[must_use]
    pub fn builder(method: HttpMethod, endpoint: &Endpoint, action: &str) -> MwsRequestBuilder {
        MwsRequestBuilder::new(method, endpoint, action)
    }

    /// Returns the value of the `Action` parameter.
    #[must_use]
    pub fn action(&self) -> Option<&str> {
        self.params.first("Action")
    }

    /// Returns the follow-up request that fetches the page after `token`.
    ///
    /// The follow-up targets the same endpoint with the same method and
    /// carries only `Action=<Action>ByNextToken`, the first request's `Version` and
    /// `NextToken`.
    #[must_use]
    pub fn next_token_request(&self, token: &str) -> Self {
        let mut params = ParameterBag::new();
        params.set(
            "Action",
            format!("{}ByNextToken", self.action().unwrap_or_default()),
        );
        for version in self.params.get_all("Version") {
            params.add("Version", version.as_str());
        }
        params.set("NextToken", token);

        Self {
            endpoint: self.endpoint.clone(),
            method: self.method,
            params,
            body: None,
            tries: self.tries,
        }
    }
}

/// Builder for constructing [`MwsRequest`] instances.
#[derive(Debug)]
pub struct MwsRequestBuilder {
    endpoint: Endpoint,
    method: HttpMethod,
    params: ParameterBag,
    body: Option<RequestBody>,
    tries: u32,
}

impl MwsRequestBuilder {
    fn new(method: HttpMethod, endpoint: &Endpoint, action: &str) -> Self {
        let mut params = ParameterBag::new();
        params.set("Action", action);
        params.set("Version", endpoint.version());
        Self {
            endpoint: endpoint.clone(),
            method,
            params,
            body: None,
            tries: 1,
        }
    }

    /// Sets a parameter, replacing previous values of the same name.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.set(name, value);
        self
    }

    /// Adds `<prefix>.1`, `<prefix>.2`, ... list parameters.
    #[must_use]
    pub fn indexed_params<I, V>(mut self, prefix: &str, items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.params.add_indexed(prefix, items);
        self
    }

    /// Sets the request body.
    #[must_use]
    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    /// Sets the number of times to attempt the request.
    ///
    /// Default is 1 (no retries). Higher values retry 429 and 5xx responses.
    #[must_use]
    pub const fn tries(mut self, tries: u32) -> Self {
        self.tries = tries;
        self
    }

    /// Builds the [`MwsRequest`].
    #[must_use]
    pub fn build(self) -> MwsRequest {
        MwsRequest {
            endpoint: self.endpoint,
            method: self.method,
            params: self.params,
            body: self.body,
            tries: self.tries.max(1),
        }
    }
}

/// A fully authenticated request, ready to send.
///
/// The URL's query string is the canonical encoding of [`params`](Self::params),
/// which include the authentication parameters and the `Signature`.
#[derive(Clone, Debug)]
pub struct SignedRequest {
    /// The HTTP method.
    pub method: HttpMethod,
    /// The request URL including the signed query string.
    pub url: Url,
    /// The final parameters, `Signature` included.
    pub params: ParameterBag,
    /// The request body, if any.
    pub body: Option<RequestBody>,
    /// Number of times to attempt the request.
    pub tries: u32,
}

impl SignedRequest {
    /// Returns the value of the `Action` parameter.
    #[must_use]
    pub fn action(&self) -> &str {
        self.params.first("Action").unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiSection, Region};

    fn endpoint() -> Endpoint {
        Endpoint::new(
            &Region::new("NA", "US", "https://mws.amazonservices.com/", "ATVPDKIKX0DER"),
            ApiSection::Reports,
        )
    }

    #[test]
    fn test_http_method_display() {
        assert_eq!(HttpMethod::Get.to_string(), "GET");
        assert_eq!(HttpMethod::Post.to_string(), "POST");
    }

    #[test]
    fn test_builder_sets_action_and_version() {
        let request = MwsRequest::builder(HttpMethod::Post, &endpoint(), "GetReportList").build();
        assert_eq!(request.action(), Some("GetReportList"));
        assert_eq!(request.params.first("Version"), Some("2009-01-01"));
        assert_eq!(request.tries, 1);
        assert!(request.body.is_none());
    }

    #[test]
    fn test_builder_with_indexed_params() {
        let request = MwsRequest::builder(HttpMethod::Post, &endpoint(), "GetReportList")
            .indexed_params("ReportTypeList.Type", ["_A_", "_B_"])
            .build();
        assert_eq!(request.params.first("ReportTypeList.Type.1"), Some("_A_"));
        assert_eq!(request.params.first("ReportTypeList.Type.2"), Some("_B_"));
    }

    #[test]
    fn test_builder_with_body() {
        let request = MwsRequest::builder(HttpMethod::Post, &endpoint(), "SubmitFeed")
            .body(RequestBody::xml("<AmazonEnvelope/>"))
            .build();
        let body = request.body.unwrap();
        assert_eq!(body.content_type, "text/xml");
        assert_eq!(body.bytes, Bytes::from_static(b"<AmazonEnvelope/>"));
    }

    #[test]
    fn test_tries_is_at_least_one() {
        let request = MwsRequest::builder(HttpMethod::Get, &endpoint(), "X")
            .tries(0)
            .build();
        assert_eq!(request.tries, 1);
    }

    #[test]
    fn test_next_token_request_carries_only_token_and_version() {
        let request = MwsRequest::builder(HttpMethod::Post, &endpoint(), "GetReportList")
            .param("Acknowledged", "false")
            .indexed_params("ReportTypeList.Type", ["_A_"])
            .build();

        let next = request.next_token_request("tok==");
        assert_eq!(next.action(), Some("GetReportListByNextToken"));
        assert_eq!(next.params.first("Version"), Some("2009-01-01"));
        assert_eq!(next.params.first("NextToken"), Some("tok=="));
        assert!(!next.params.contains("Acknowledged"));
        assert!(!next.params.contains("ReportTypeList.Type.1"));
        assert_eq!(next.method, HttpMethod::Post);
        assert_eq!(next.endpoint, request.endpoint);
    }
}
