//! Response decoding for the MWS API.
//!
//! MWS answers with XML documents. Successful calls return an
//! `<Action>Response` document; failures return an `ErrorResponse` envelope,
//! occasionally even with a 200 status. [`decode_response`] handles both.

use std::fmt;

use bytes::Bytes;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::clients::errors::{ApiError, MwsError};

/// Root element name of the MWS error envelope.
const ERROR_RESPONSE_ROOT: &str = "ErrorResponse";

/// A single error entry in an MWS `ErrorResponse`.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct ErrorDetail {
    /// `Sender` or `Server`.
    #[serde(rename = "Type", default)]
    pub error_type: String,
    /// Machine-readable error code (e.g., `InvalidParameterValue`).
    #[serde(rename = "Code", default)]
    pub code: String,
    /// Human-readable message.
    #[serde(rename = "Message", default)]
    pub message: String,
}

/// The MWS error envelope.
///
/// # Example
///
/// ```rust
/// use mws_api::clients::ErrorResponse;
///
/// let xml = "<ErrorResponse><Error><Type>Sender</Type><Code>AccessDenied</Code>\
///            <Message>Access denied</Message></Error><RequestId>r-1</RequestId></ErrorResponse>";
/// let response = ErrorResponse::from_xml(xml.as_bytes()).unwrap();
/// assert_eq!(response.errors[0].code, "AccessDenied");
/// assert_eq!(response.request_id, "r-1");
/// ```
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    /// The reported errors.
    #[serde(rename = "Error", default)]
    pub errors: Vec<ErrorDetail>,
    /// Request id to quote when contacting support.
    #[serde(rename = "RequestId", default)]
    pub request_id: String,
}

impl ErrorResponse {
    /// Decodes an `ErrorResponse` document.
    ///
    /// # Errors
    ///
    /// Returns [`MwsError::Decoding`] if the bytes are not an `ErrorResponse`.
    pub fn from_xml(body: &[u8]) -> Result<Self, MwsError> {
        if root_element(body).as_deref() != Some(ERROR_RESPONSE_ROOT) {
            return Err(MwsError::Decoding {
                message: format!("expected <{ERROR_RESPONSE_ROOT}> document"),
            });
        }
        quick_xml::de::from_reader(body).map_err(|e| MwsError::Decoding {
            message: e.to_string(),
        })
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.errors.iter().map(|e| e.message.as_str()).collect();
        write!(f, "{}", messages.join("; "))?;
        if !self.request_id.is_empty() {
            write!(f, " (request id {})", self.request_id)?;
        }
        Ok(())
    }
}

/// The `ResponseMetadata` block present in every MWS response.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct ResponseMetadata {
    /// Request id assigned by the service.
    #[serde(rename = "RequestId", default)]
    pub request_id: String,
}

/// Decodes a success document into `T`.
///
/// If the body is an `ErrorResponse` envelope, or does not match `T` but
/// does decode as an envelope, the envelope is surfaced as
/// [`MwsError::Api`]. Otherwise the decoding failure is returned.
///
/// # Errors
///
/// Returns [`MwsError::Api`] or [`MwsError::Decoding`] as described above.
pub fn decode_response<T: DeserializeOwned>(body: &Bytes) -> Result<T, MwsError> {
    if root_element(body).as_deref() == Some(ERROR_RESPONSE_ROOT) {
        return Err(ApiError::new(200, body.clone()).into());
    }

    quick_xml::de::from_reader::<_, T>(body.as_ref()).map_err(|e| {
        if ErrorResponse::from_xml(body).is_ok() {
            ApiError::new(200, body.clone()).into()
        } else {
            tracing::debug!(error = %e, "Response did not match expected document");
            MwsError::Decoding {
                message: e.to_string(),
            }
        }
    })
}

/// Returns the local name of the document's root element.
fn root_element(body: &[u8]) -> Option<String> {
    let mut reader = Reader::from_reader(body);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e) | Event::Empty(e)) => {
                return Some(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
            }
            Ok(Event::Eof) | Err(_) => return None,
            Ok(_) => {}
        }
    }
}
