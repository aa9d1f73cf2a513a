//! Continuation-token pagination.
//!
//! MWS list operations return at most one page per call. When more results
//! exist the page carries a `NextToken`; the next page is fetched with the
//! `<Action>ByNextToken` action. [`collect_all`] drives that loop and
//! accumulates every page into one ordered collection.

use std::fmt;

use bytes::Bytes;
use tokio_util::sync::CancellationToken;

use crate::clients::errors::MwsError;
use crate::clients::http_client::Transport;
use crate::clients::http_request::MwsRequest;

/// One decoded page of a list operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page<T> {
    /// Items on this page, in upstream order.
    pub items: Vec<T>,
    /// Continuation token. `None` or empty means this is the last page.
    pub next_token: Option<String>,
}

impl<T> Page<T> {
    /// Creates a page.
    #[must_use]
    pub fn new(items: Vec<T>, next_token: Option<String>) -> Self {
        Self { items, next_token }
    }

    /// Returns the continuation token if another page exists.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.next_token.as_deref().filter(|token| !token.is_empty())
    }
}

/// A paginated MWS list operation.
///
/// Implementors supply the first request and decoders for the two document
/// shapes: `<Action>Response` for the first page and
/// `<Action>ByNextTokenResponse` for the following ones.
pub trait ListOperation {
    /// The item type accumulated across pages.
    type Item;

    /// Returns the request for the first page.
    fn request(&self) -> &MwsRequest;

    /// Decodes the first page.
    ///
    /// # Errors
    ///
    /// Returns [`MwsError`] if the body does not match the expected document.
    fn decode_first(&self, body: &Bytes) -> Result<Page<Self::Item>, MwsError>;

    /// Decodes a page fetched with a continuation token.
    ///
    /// # Errors
    ///
    /// Returns [`MwsError`] if the body does not match the expected document.
    fn decode_next(&self, body: &Bytes) -> Result<Page<Self::Item>, MwsError>;
}

/// Error returned when a page fails after earlier pages succeeded.
///
/// `partial` holds every item accumulated before the failure.
#[derive(Debug)]
pub struct PaginationError<T> {
    /// Items from the pages that succeeded.
    pub partial: Vec<T>,
    /// The error that stopped pagination.
    pub source: MwsError,
}

impl<T> PaginationError<T> {
    /// Discards the partial results and returns the underlying error.
    #[must_use]
    pub fn into_source(self) -> MwsError {
        self.source
    }
}

impl<T> fmt::Display for PaginationError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Pagination stopped after {} items: {}",
            self.partial.len(),
            self.source
        )
    }
}

impl<T: fmt::Debug> std::error::Error for PaginationError<T> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

impl<T> From<PaginationError<T>> for MwsError {
    fn from(error: PaginationError<T>) -> Self {
        error.source
    }
}

/// Fetches every page of `operation` and returns all items in order.
///
/// The first page uses the operation's request. While the decoded page has
/// a non-empty token, the follow-up is built with
/// [`MwsRequest::next_token_request`]. Items are appended in the order the
/// service returned them, without deduplication.
///
/// `cancel` is checked before every page request.
///
/// # Errors
///
/// Returns [`PaginationError`] with the items accumulated so far if any page
/// fails to fetch or decode, or if `cancel` fires
/// ([`MwsError::Cancelled`]).
pub async fn collect_all<T, O>(
    transport: &T,
    operation: &O,
    cancel: &CancellationToken,
) -> Result<Vec<O::Item>, PaginationError<O::Item>>
where
    T: Transport,
    O: ListOperation,
{
    let mut items = Vec::new();
    let mut token: Option<String> = None;
    let mut pages: u32 = 0;

    loop {
        if cancel.is_cancelled() {
            return Err(PaginationError {
                partial: items,
                source: MwsError::Cancelled,
            });
        }

        let (request, first) = match &token {
            None => (operation.request().clone(), true),
            Some(token) => (operation.request().next_token_request(token), false),
        };

        let result = match transport.call(request, cancel).await {
            Ok(body) if first => operation.decode_first(&body),
            Ok(body) => operation.decode_next(&body),
            Err(e) => Err(e),
        };
        let page = match result {
            Ok(page) => page,
            Err(source) => {
                tracing::error!(
                    action = operation.request().action().unwrap_or_default(),
                    pages,
                    error = %source,
                    "Pagination failed"
                );
                return Err(PaginationError {
                    partial: items,
                    source,
                });
            }
        };
        pages += 1;

        token = page.token().map(String::from);
        items.extend(page.items);

        if token.is_none() {
            tracing::debug!(
                action = operation.request().action().unwrap_or_default(),
                pages,
                items = items.len(),
                "Pagination complete"
            );
            return Ok(items);
        }
    }
}
