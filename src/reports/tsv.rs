//! Tab-separated report payloads.

use std::collections::HashMap;

use csv_async::{AsyncReaderBuilder, StringRecord};

use crate::clients::MwsError;

/// One report row, keyed by column header.
pub type ReportRow = HashMap<String, String>;

fn decoding_error(error: &csv_async::Error) -> MwsError {
    MwsError::Decoding {
        message: format!("invalid report payload: {error}"),
    }
}

/// Parses a tab-separated report whose first line holds the column headers.
///
/// Rows shorter than the header leave the missing columns empty; extra
/// fields are ignored. Quotes carry no special meaning. An empty payload
/// yields no rows.
///
/// # Errors
///
/// Returns [`MwsError::Decoding`] if the payload is not valid UTF-8.
///
/// # Example
///
/// ```rust
/// use mws_api::reports::parse_tsv;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let rows = parse_tsv(b"sku\tquantity\nA-1\t3\n").await.unwrap();
/// assert_eq!(rows[0]["sku"], "A-1");
/// assert_eq!(rows[0]["quantity"], "3");
/// # }
/// ```
pub async fn parse_tsv(payload: &[u8]) -> Result<Vec<ReportRow>, MwsError> {
    let mut reader = AsyncReaderBuilder::new()
        .delimiter(b'\t')
        .quoting(false)
        .flexible(true)
        .has_headers(true)
        .create_reader(payload);

    let headers = reader
        .headers()
        .await
        .map_err(|e| decoding_error(&e))?
        .clone();

    let mut rows = Vec::new();
    let mut record = StringRecord::new();
    while reader
        .read_record(&mut record)
        .await
        .map_err(|e| decoding_error(&e))?
    {
        let row = headers
            .iter()
            .enumerate()
            .map(|(index, header)| {
                (
                    header.to_string(),
                    record.get(index).unwrap_or_default().to_string(),
                )
            })
            .collect();
        rows.push(row);
    }
    Ok(rows)
}
