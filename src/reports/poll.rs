//! Report request polling.

use std::path::Path;

use tokio_util::sync::CancellationToken;

use super::{ReportsApi, STATUS_CANCELLED, STATUS_DONE, STATUS_DONE_NO_DATA};
use crate::clients::{MwsError, Transport};

impl<T: Transport> ReportsApi<'_, T> {
    /// Polls `GetReportRequestList` until the report request finishes and
    /// returns the generated report id.
    ///
    /// Waits between checks follow the configured [`PollPolicy`](crate::PollPolicy).
    ///
    /// # Errors
    ///
    /// - [`MwsError::ReportCancelled`] if the service cancelled the request
    /// - [`MwsError::ReportEmpty`] if the report finished without data
    /// - [`MwsError::PollExhausted`] after `max_attempts` unfinished checks
    /// - [`MwsError::Cancelled`] if `cancel` fires while waiting
    pub async fn wait_for_report(
        &self,
        request_id: &str,
        cancel: &CancellationToken,
    ) -> Result<String, MwsError> {
        let policy = self.poll_policy;

        for attempt in 0..policy.max_attempts {
            let response = self
                .get_report_request_list()
                .request_ids([request_id])
                .send(cancel)
                .await?;

            let info = response
                .result
                .requests
                .into_iter()
                .find(|info| info.report_request_id == request_id);
            let status = info
                .as_ref()
                .map(|info| info.report_processing_status.clone())
                .unwrap_or_default();

            match status.as_str() {
                STATUS_DONE => {
                    let report_id = info
                        .map(|info| info.generated_report_id)
                        .unwrap_or_default();
                    if report_id.is_empty() {
                        return Err(MwsError::ReportEmpty {
                            request_id: request_id.to_string(),
                        });
                    }
                    tracing::debug!(request_id, report_id = %report_id, "Report ready");
                    return Ok(report_id);
                }
                STATUS_CANCELLED => {
                    return Err(MwsError::ReportCancelled {
                        request_id: request_id.to_string(),
                    });
                }
                STATUS_DONE_NO_DATA => {
                    return Err(MwsError::ReportEmpty {
                        request_id: request_id.to_string(),
                    });
                }
                _ => {}
            }

            if attempt + 1 == policy.max_attempts {
                break;
            }

            let wait = policy.interval_for(attempt);
            tracing::warn!(
                request_id,
                status = %status,
                attempt = attempt + 1,
                wait_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX),
                "Report not ready, waiting"
            );

            tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(MwsError::Cancelled),
                () = tokio::time::sleep(wait) => {}
            }
        }

        Err(MwsError::PollExhausted {
            attempts: policy.max_attempts,
        })
    }

    /// Requests a report, waits for it and downloads it into `path`.
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns any error from [`request_report`](Self::request_report),
    /// [`wait_for_report`](Self::wait_for_report) or
    /// [`download_report`](Self::download_report).
    pub async fn generate_report(
        &self,
        report_type: &str,
        path: &Path,
        cancel: &CancellationToken,
    ) -> Result<u64, MwsError> {
        let requested = self.request_report(report_type, cancel).await?;
        let request_id = requested.result.info.report_request_id;
        tracing::info!(report_type, request_id = %request_id, "Report requested");

        let report_id = self.wait_for_report(&request_id, cancel).await?;
        self.download_report(&report_id, path, cancel).await
    }
}
