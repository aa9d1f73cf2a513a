//! Credential types for MWS request signing.
//!
//! Unlike most configuration values, credentials are not validated on
//! construction. Emptiness is checked when a request is assembled so that an
//! incomplete credential set fails with a [`ConfigError`] before any network
//! or cryptographic work, whichever request happens to be the first one.
//!
//! [`ConfigError`]: crate::ConfigError

use std::fmt;

/// An MWS secret access key.
///
/// The `Debug` implementation masks the value, displaying only
/// `SecretKey(*****)`, so the key never lands in logs.
///
/// # Example
///
/// ```rust
/// use mws_api::SecretKey;
///
/// let secret = SecretKey::new("my-secret");
/// assert_eq!(format!("{:?}", secret), "SecretKey(*****)");
/// assert_eq!(secret.as_ref(), "my-secret");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey(String);

impl SecretKey {
    /// Wraps a secret access key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns `true` if the key is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<str> for SecretKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(*****)")
    }
}

/// Seller credentials used to sign every request.
///
/// # Example
///
/// ```rust
/// use mws_api::Credentials;
///
/// let creds = Credentials::new("AKIDEXAMPLE", "secret", "A1MERCHANT")
///     .with_company_name("Acme");
///
/// assert_eq!(creds.access_key_id(), "AKIDEXAMPLE");
/// assert_eq!(creds.company_name(), Some("Acme"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
    access_key_id: String,
    secret_key: SecretKey,
    merchant_id: String,
    company_name: Option<String>,
}

impl Credentials {
    /// Creates a credential set from the access key id, secret key and
    /// merchant (seller) id.
    #[must_use]
    pub fn new(
        access_key_id: impl Into<String>,
        secret_key: impl Into<String>,
        merchant_id: impl Into<String>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_key: SecretKey::new(secret_key),
            merchant_id: merchant_id.into(),
            company_name: None,
        }
    }

    /// Sets the company name reported in the `User-Agent` header.
    #[must_use]
    pub fn with_company_name(mut self, name: impl Into<String>) -> Self {
        self.company_name = Some(name.into());
        self
    }

    /// Returns the access key id.
    #[must_use]
    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    /// Returns the secret key.
    #[must_use]
    pub const fn secret_key(&self) -> &SecretKey {
        &self.secret_key
    }

    /// Returns the merchant (seller) id.
    #[must_use]
    pub fn merchant_id(&self) -> &str {
        &self.merchant_id
    }

    /// Returns the company name, if set.
    #[must_use]
    pub fn company_name(&self) -> Option<&str> {
        self.company_name.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_key_debug_is_masked() {
        let secret = SecretKey::new("super-secret");
        let debug = format!("{secret:?}");
        assert_eq!(debug, "SecretKey(*****)");
        assert!(!debug.contains("super-secret"));
    }

    #[test]
    fn test_credentials_debug_does_not_leak_secret() {
        let creds = Credentials::new("id", "super-secret", "merchant");
        let debug = format!("{creds:?}");
        assert!(debug.contains("Credentials"));
        assert!(!debug.contains("super-secret"));
    }

    #[test]
    fn test_credentials_accept_empty_values() {
        let creds = Credentials::new("", "", "");
        assert!(creds.access_key_id().is_empty());
        assert!(creds.secret_key().is_empty());
        assert!(creds.merchant_id().is_empty());
        assert!(creds.company_name().is_none());
    }
}
