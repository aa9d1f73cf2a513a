//! Request authentication for the MWS API.
//!
//! MWS authenticates every call with a signature computed over the request
//! itself. This module provides the three building blocks of that scheme:
//!
//! - [`ParameterBag`]: The request parameters (a multimap)
//! - [`canonical_query_string`]: The byte-exact encoding that is both sent and signed
//! - [`compute_signature`] / [`string_to_sign`]: HMAC-SHA256 signing
//!
//! Assembling a complete signed request lives in
//! [`HttpClient::assemble`](crate::clients::HttpClient::assemble).

mod canonical;
mod params;
mod signature;

pub use canonical::canonical_query_string;
pub use params::{format_timestamp, ParameterBag};
pub use signature::{compute_signature, string_to_sign, SIGNATURE_METHOD, SIGNATURE_VERSION};
