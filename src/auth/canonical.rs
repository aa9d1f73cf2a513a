//! Canonical query string encoding.
//!
//! The canonical form is used twice: as the query string actually sent and as
//! the last line of the string-to-sign. Both must be byte-identical or the
//! service rejects the signature.

use crate::auth::ParameterBag;

/// Encodes `params` into the canonical MWS query string.
///
/// - names are sorted by byte order
/// - the values of a repeated name are sorted among themselves
/// - names and values are percent-encoded per RFC 3986: only
///   `A-Z a-z 0-9 - _ . ~` pass through, spaces become `%20`
///
/// # Example
///
/// ```rust
/// use mws_api::auth::{canonical_query_string, ParameterBag};
///
/// let mut params = ParameterBag::new();
/// params.add("Version", "2009-01-01");
/// params.add("Action", "GetReport List");
///
/// assert_eq!(
///     canonical_query_string(&params),
///     "Action=GetReport%20List&Version=2009-01-01"
/// );
/// ```
#[must_use]
pub fn canonical_query_string(params: &ParameterBag) -> String {
    let mut pairs = Vec::new();
    for (name, values) in params.iter() {
        let name = urlencoding::encode(name);
        let mut values: Vec<&str> = values.iter().map(String::as_str).collect();
        values.sort_unstable();
        for value in values {
            pairs.push(format!("{name}={}", urlencoding::encode(value)));
        }
    }
    pairs.join("&")
}
