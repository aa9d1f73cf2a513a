//! Error types for the MWS API SDK.
//!
//! This module contains the configuration error type used when building a
//! client and when assembling signed requests.
//!
//! # Error Handling
//!
//! Configuration problems are always fatal and are reported before any
//! network or cryptographic work happens. They are never retried.
//!
//! # Example
//!
//! ```rust
//! use mws_api::{ConfigError, RegionTable};
//!
//! let table = RegionTable::default();
//! let result = table.lookup("ZZ");
//! assert!(matches!(result, Err(ConfigError::UnknownRegion { .. })));
//! ```

use thiserror::Error;

/// Errors that can occur while configuring the SDK or assembling a request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A credential or marketplace field required for signing is empty.
    #[error("Incomplete request: '{field}' is empty. Access key id, secret key, merchant id and marketplace id are all required.")]
    IncompleteCredentials {
        /// The name of the empty field.
        field: &'static str,
    },

    /// No region is known for the given country code.
    #[error("Invalid region '{country}'. Expected one of the supported marketplace country codes (e.g., 'US', 'UK', 'JP').")]
    UnknownRegion {
        /// The country code that was looked up.
        country: String,
    },

    /// A required field is missing.
    #[error("Missing required field: '{field}'. This field must be set before building the configuration.")]
    MissingRequiredField {
        /// The name of the missing field.
        field: &'static str,
    },
}
