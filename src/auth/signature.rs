//! HMAC-SHA256 request signatures (MWS signature version 2).
//!
//! The string-to-sign is four lines joined by `\n`: the upper-case HTTP
//! method, the lower-cased host, the URL path and the canonical query string.
//! The signature is the base64-encoded HMAC-SHA256 of that string keyed with
//! the secret access key.
//!
//! # Example
//!
//! ```rust
//! use mws_api::auth::compute_signature;
//!
//! let sig = compute_signature("GET\nhost\n/path\nAction=Test", "secret");
//! assert_eq!(sig, "h6lYm2Il5UVGjCKATbCWv3fluPHgjMiT1c1ko+dIf7I=");
//! ```

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use url::Url;

type HmacSha256 = Hmac<Sha256>;

/// Value of the `SignatureMethod` parameter.
pub const SIGNATURE_METHOD: &str = "HmacSHA256";

/// Value of the `SignatureVersion` parameter.
pub const SIGNATURE_VERSION: &str = "2";

/// Computes the base64-encoded HMAC-SHA256 signature of `message`.
#[must_use]
#[allow(clippy::missing_panics_doc)] // HMAC accepts any key size, so this never panics
pub fn compute_signature(message: &str, secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(message.as_bytes());
    STANDARD.encode(mac.finalize().into_bytes())
}

/// Builds the string-to-sign for a request to `endpoint`.
///
/// The host keeps an explicit port, matching what is sent in the `Host`
/// header.
///
/// # Errors
///
/// Returns [`url::ParseError`] if `endpoint` is not a well-formed URL.
///
/// # Example
///
/// ```rust
/// use mws_api::auth::string_to_sign;
///
/// let s = string_to_sign("POST", "https://MWS.amazonservices.com/Feeds/2009-01-01", "Action=SubmitFeed").unwrap();
/// assert_eq!(s, "POST\nmws.amazonservices.com\n/Feeds/2009-01-01\nAction=SubmitFeed");
/// ```
pub fn string_to_sign(
    method: &str,
    endpoint: &str,
    canonical_query: &str,
) -> Result<String, url::ParseError> {
    let url = Url::parse(endpoint)?;
    let host = url.host_str().ok_or(url::ParseError::EmptyHost)?;
    let host = match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    };

    Ok([
        method.to_ascii_uppercase().as_str(),
        host.to_ascii_lowercase().as_str(),
        url.path(),
        canonical_query,
    ]
    .join("\n"))
}
