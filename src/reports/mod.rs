//! Reports API (`Reports/2009-01-01`).
//!
//! Every Reports call is a POST. `GetReportList` is paginated; `GetReport`
//! returns a tab-separated payload that is either parsed into rows or
//! streamed to a file. [`ReportsApi::generate_report`] runs the complete
//! request, poll and download workflow.
//!
//! # Example
//!
//! ```rust,ignore
//! use mws_api::reports::ReportsApi;
//!
//! let reports = ReportsApi::new(&client, &config);
//! let unacknowledged = reports
//!     .get_report_list()
//!     .report_types(["_GET_FLAT_FILE_ORDERS_DATA_"])
//!     .acknowledged(false)
//!     .all(&cancel)
//!     .await?;
//!
//! for info in &unacknowledged {
//!     let rows = reports.get_report(&info.report_id, &cancel).await?;
//!     println!("{}: {} rows", info.report_id, rows.len());
//! }
//! ```

mod poll;
mod tsv;

pub use tsv::{parse_tsv, ReportRow};

use std::path::Path;

use bytes::Bytes;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::clients::{
    collect_all, decode_response, HttpMethod, ListOperation, MwsError, MwsRequest, Page,
    PaginationError, ResponseMetadata, Transport,
};
use crate::config::{ApiSection, Endpoint, MwsConfig, PollPolicy};

/// `ReportProcessingStatus` of a finished report.
pub const STATUS_DONE: &str = "_DONE_";
/// `ReportProcessingStatus` of a report the service cancelled.
pub const STATUS_CANCELLED: &str = "_CANCELLED_";
/// `ReportProcessingStatus` of a report that finished without data.
pub const STATUS_DONE_NO_DATA: &str = "_DONE_NO_DATA_";

/// A generated report.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase", default)]
pub struct ReportInfo {
    /// Report identifier, used with `GetReport`.
    pub report_id: String,
    /// Report type (e.g., `_GET_FLAT_FILE_ORDERS_DATA_`).
    pub report_type: String,
    /// The request that produced the report.
    pub report_request_id: String,
    /// When the report became available.
    pub available_date: String,
    /// Whether the report has been acknowledged.
    pub acknowledged: bool,
}

/// The status of a report request.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase", default)]
pub struct ReportRequestInfo {
    /// Report request identifier.
    pub report_request_id: String,
    /// Requested report type.
    pub report_type: String,
    /// Start of the requested data range.
    pub start_date: String,
    /// End of the requested data range.
    pub end_date: String,
    /// Whether the request is scheduled.
    pub scheduled: bool,
    /// When the request was submitted.
    pub submitted_date: String,
    /// `_SUBMITTED_`, `_IN_PROGRESS_`, `_DONE_`, `_DONE_NO_DATA_` or `_CANCELLED_`.
    pub report_processing_status: String,
    /// Set once the status is `_DONE_`.
    pub generated_report_id: String,
    /// When processing started.
    pub started_processing_date: String,
    /// When processing completed.
    pub completed_date: String,
}

/// The result element shared by `GetReportList` and `GetReportListByNextToken`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct GetReportListResult {
    next_token: Option<String>,
    has_next: Option<bool>,
    #[serde(rename = "ReportInfo")]
    reports: Vec<ReportInfo>,
}

impl GetReportListResult {
    /// `HasNext=false` ends pagination even when a token is present.
    fn into_page(self) -> Page<ReportInfo> {
        let next_token = match self.has_next {
            Some(false) => None,
            _ => self.next_token,
        };
        Page::new(self.reports, next_token)
    }
}

#[derive(Debug, Deserialize)]
struct GetReportListResponse {
    #[serde(rename = "GetReportListResult")]
    result: GetReportListResult,
}

#[derive(Debug, Deserialize)]
struct GetReportListByNextTokenResponse {
    #[serde(rename = "GetReportListByNextTokenResult")]
    result: GetReportListResult,
}

/// The `RequestReportResult` element.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct RequestReportResult {
    /// The new report request.
    #[serde(rename = "ReportRequestInfo", default)]
    pub info: ReportRequestInfo,
}

/// Response of `RequestReport`.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct RequestReportResponse {
    /// The result.
    #[serde(rename = "RequestReportResult")]
    pub result: RequestReportResult,
    /// Request metadata.
    #[serde(rename = "ResponseMetadata", default)]
    pub metadata: ResponseMetadata,
}

/// The `GetReportRequestListResult` element.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase", default)]
pub struct GetReportRequestListResult {
    /// Token for the next page, if any.
    pub next_token: Option<String>,
    /// Whether more pages exist.
    pub has_next: Option<bool>,
    /// Matching report requests.
    #[serde(rename = "ReportRequestInfo")]
    pub requests: Vec<ReportRequestInfo>,
}

/// Response of `GetReportRequestList`.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct GetReportRequestListResponse {
    /// The result.
    #[serde(rename = "GetReportRequestListResult")]
    pub result: GetReportRequestListResult,
    /// Request metadata.
    #[serde(rename = "ResponseMetadata", default)]
    pub metadata: ResponseMetadata,
}

/// The `UpdateReportAcknowledgementsResult` element.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase", default)]
pub struct UpdateReportAcknowledgementsResult {
    /// Number of reports updated.
    pub count: u32,
    /// The updated reports.
    #[serde(rename = "ReportInfo")]
    pub reports: Vec<ReportInfo>,
}

/// Response of `UpdateReportAcknowledgements`.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct UpdateReportAcknowledgementsResponse {
    /// The result.
    #[serde(rename = "UpdateReportAcknowledgementsResult")]
    pub result: UpdateReportAcknowledgementsResult,
    /// Request metadata.
    #[serde(rename = "ResponseMetadata", default)]
    pub metadata: ResponseMetadata,
}

/// Client for the Reports API.
#[derive(Debug)]
pub struct ReportsApi<'a, T> {
    transport: &'a T,
    endpoint: Endpoint,
    poll_policy: PollPolicy,
}

impl<'a, T: Transport> ReportsApi<'a, T> {
    /// Creates a Reports API client for the configured region.
    #[must_use]
    pub fn new(transport: &'a T, config: &MwsConfig) -> Self {
        Self {
            transport,
            endpoint: config.endpoint(ApiSection::Reports),
            poll_policy: *config.poll_policy(),
        }
    }

    fn request(&self, action: &str) -> MwsRequest {
        MwsRequest::builder(HttpMethod::Post, &self.endpoint, action).build()
    }

    /// Starts a `GetReportList` request.
    #[must_use]
    pub fn get_report_list(&self) -> GetReportList<'a, T> {
        GetReportList {
            transport: self.transport,
            request: self.request("GetReportList"),
        }
    }

    /// Fetches a report and parses its tab-separated payload.
    ///
    /// # Errors
    ///
    /// Returns [`MwsError`] if the call fails or the payload is not valid
    /// UTF-8.
    pub async fn get_report(
        &self,
        report_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<ReportRow>, MwsError> {
        let mut request = self.request("GetReport");
        request.params.set("ReportId", report_id);
        let body = self.transport.call(request, cancel).await?;
        parse_tsv(&body).await
    }

    /// Streams a report's payload into `path`, returning the bytes written.
    ///
    /// # Errors
    ///
    /// Returns [`MwsError`] if the call fails or the file cannot be
    /// written. The file may be incomplete on error.
    pub async fn download_report(
        &self,
        report_id: &str,
        path: &Path,
        cancel: &CancellationToken,
    ) -> Result<u64, MwsError> {
        let mut request = self.request("GetReport");
        request.params.set("ReportId", report_id);
        self.transport.call_to_file(request, cancel, path).await
    }

    /// Marks reports as acknowledged (or not).
    ///
    /// `acknowledged` is omitted from the request when `None`.
    ///
    /// # Errors
    ///
    /// Returns [`MwsError`] if the call fails or the response cannot be
    /// decoded.
    pub async fn update_report_acknowledgements<I, S>(
        &self,
        report_ids: I,
        acknowledged: Option<bool>,
        cancel: &CancellationToken,
    ) -> Result<UpdateReportAcknowledgementsResponse, MwsError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut request = self.request("UpdateReportAcknowledgements");
        request.params.add_indexed("ReportIdList.Id", report_ids);
        if let Some(acknowledged) = acknowledged {
            request.params.set("Acknowledged", acknowledged.to_string());
        }
        let body = self.transport.call(request, cancel).await?;
        decode_response(&body)
    }

    /// Asks the service to generate a report.
    ///
    /// # Errors
    ///
    /// Returns [`MwsError`] if the call fails or the response cannot be
    /// decoded.
    pub async fn request_report(
        &self,
        report_type: &str,
        cancel: &CancellationToken,
    ) -> Result<RequestReportResponse, MwsError> {
        let mut request = self.request("RequestReport");
        request.params.set("ReportType", report_type);
        let body = self.transport.call(request, cancel).await?;
        decode_response(&body)
    }

    /// Starts a `GetReportRequestList` request.
    #[must_use]
    pub fn get_report_request_list(&self) -> GetReportRequestList<'a, T> {
        GetReportRequestList {
            transport: self.transport,
            request: self.request("GetReportRequestList"),
        }
    }
}

/// A `GetReportList` request.
#[derive(Debug)]
pub struct GetReportList<'a, T> {
    transport: &'a T,
    request: MwsRequest,
}

impl<'a, T: Transport> GetReportList<'a, T> {
    /// Only reports of these types (`ReportTypeList.Type.N`).
    #[must_use]
    pub fn report_types<I, S>(mut self, report_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.request
            .params
            .add_indexed("ReportTypeList.Type", report_types);
        self
    }

    /// Only reports with this acknowledgement state.
    #[must_use]
    pub fn acknowledged(mut self, acknowledged: bool) -> Self {
        self.request
            .params
            .set("Acknowledged", acknowledged.to_string());
        self
    }

    /// Fetches every page of reports.
    ///
    /// # Errors
    ///
    /// Returns [`PaginationError`] with the reports fetched so far if any
    /// page fails.
    pub async fn all(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<ReportInfo>, PaginationError<ReportInfo>> {
        collect_all(self.transport, self, cancel).await
    }
}

impl<T> ListOperation for GetReportList<'_, T> {
    type Item = ReportInfo;

    fn request(&self) -> &MwsRequest {
        &self.request
    }

    fn decode_first(&self, body: &Bytes) -> Result<Page<ReportInfo>, MwsError> {
        let response: GetReportListResponse = decode_response(body)?;
        Ok(response.result.into_page())
    }

    fn decode_next(&self, body: &Bytes) -> Result<Page<ReportInfo>, MwsError> {
        let response: GetReportListByNextTokenResponse = decode_response(body)?;
        Ok(response.result.into_page())
    }
}

/// A `GetReportRequestList` request.
#[derive(Debug)]
pub struct GetReportRequestList<'a, T> {
    transport: &'a T,
    request: MwsRequest,
}

impl<'a, T: Transport> GetReportRequestList<'a, T> {
    /// Only these report requests (`ReportRequestIdList.Id.N`).
    #[must_use]
    pub fn request_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.request
            .params
            .add_indexed("ReportRequestIdList.Id", ids);
        self
    }

    /// Only requests for these report types (`ReportTypeList.Type.N`).
    #[must_use]
    pub fn report_types<I, S>(mut self, report_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.request
            .params
            .add_indexed("ReportTypeList.Type", report_types);
        self
    }

    /// Returns the request that [`send`](Self::send) issues.
    #[must_use]
    pub const fn request(&self) -> &MwsRequest {
        &self.request
    }

    /// Sends the request.
    ///
    /// # Errors
    ///
    /// Returns [`MwsError`] if the call fails or the response cannot be
    /// decoded.
    pub async fn send(
        self,
        cancel: &CancellationToken,
    ) -> Result<GetReportRequestListResponse, MwsError> {
        let body = self.transport.call(self.request, cancel).await?;
        decode_response(&body)
    }
}
