//! Configuration types for the MWS API SDK.
//!
//! This module provides the configuration used to construct an
//! [`HttpClient`](crate::clients::HttpClient).
//!
//! # Overview
//!
//! - [`MwsConfig`]: The immutable configuration holding credentials, region and client settings
//! - [`MwsConfigBuilder`]: A builder for constructing [`MwsConfig`] instances
//! - [`Credentials`] / [`SecretKey`]: Seller credentials, with the secret masked in debug output
//! - [`Region`] / [`RegionTable`]: Marketplace endpoints and identifiers
//! - [`ApiSection`] / [`Endpoint`]: Versioned API group endpoints
//! - [`PollPolicy`]: Bounds for the report-generation polling loop
//!
//! # Example
//!
//! ```rust
//! use mws_api::{Credentials, MwsConfig, RegionTable};
//!
//! let regions = RegionTable::default();
//! let config = MwsConfig::builder()
//!     .credentials(Credentials::new("access-id", "secret", "merchant"))
//!     .country("US", &regions)
//!     .unwrap()
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.region().marketplace_id(), "ATVPDKIKX0DER");
//! ```

mod newtypes;
mod region;
mod version;

pub use newtypes::{Credentials, SecretKey};
pub use region::{Region, RegionTable};
pub use version::{ApiSection, Endpoint};

use std::time::Duration;

use crate::error::ConfigError;

/// Bounds for the report-generation polling loop.
///
/// The wait between status checks starts at `initial_interval`, is multiplied
/// by `backoff_factor` after every unsuccessful check and never exceeds
/// `max_interval`. Polling gives up after `max_attempts` status checks.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use mws_api::PollPolicy;
///
/// let policy = PollPolicy::default();
/// assert_eq!(policy.initial_interval, Duration::from_secs(4));
/// assert_eq!(policy.interval_for(0), Duration::from_secs(4));
/// assert_eq!(policy.interval_for(1), Duration::from_secs(6));
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PollPolicy {
    /// Wait after the first unsuccessful status check.
    pub initial_interval: Duration,
    /// Multiplier applied to the wait after each unsuccessful check.
    pub backoff_factor: f64,
    /// Ceiling for a single wait.
    pub max_interval: Duration,
    /// Maximum number of status checks.
    pub max_attempts: u32,
}

impl PollPolicy {
    /// Returns the wait that follows the status check numbered `attempt`
    /// (zero-based).
    #[must_use]
    pub fn interval_for(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let scaled = self
            .initial_interval
            .mul_f64(self.backoff_factor.max(1.0).powi(exponent).min(1e6));
        scaled.min(self.max_interval)
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_secs(4),
            backoff_factor: 1.5,
            max_interval: Duration::from_secs(60),
            max_attempts: 15,
        }
    }
}

/// Configuration for the MWS API SDK.
///
/// # Thread Safety
///
/// `MwsConfig` is `Clone`, `Send`, and `Sync`.
#[derive(Clone, Debug)]
pub struct MwsConfig {
    credentials: Credentials,
    region: Region,
    app_name: Option<String>,
    timeout: Option<Duration>,
    poll_policy: PollPolicy,
}

impl MwsConfig {
    /// Creates a new builder for constructing a `MwsConfig`.
    #[must_use]
    pub fn builder() -> MwsConfigBuilder {
        MwsConfigBuilder::new()
    }

    /// Returns the seller credentials.
    #[must_use]
    pub const fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Returns the marketplace region.
    #[must_use]
    pub const fn region(&self) -> &Region {
        &self.region
    }

    /// Returns the endpoint for an API section in the configured region.
    #[must_use]
    pub fn endpoint(&self, section: ApiSection) -> Endpoint {
        Endpoint::new(&self.region, section)
    }

    /// Returns the application name used in the `User-Agent` header.
    ///
    /// Falls back to the company name of the credentials.
    #[must_use]
    pub fn app_name(&self) -> Option<&str> {
        self.app_name
            .as_deref()
            .or_else(|| self.credentials.company_name())
    }

    /// Returns the per-request timeout, if configured.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Returns the report polling policy.
    #[must_use]
    pub const fn poll_policy(&self) -> &PollPolicy {
        &self.poll_policy
    }
}

// Verify MwsConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<MwsConfig>();
};

/// Builder for constructing [`MwsConfig`] instances.
///
/// Required fields are `credentials` and a region (set either directly with
/// [`region`](Self::region) or resolved with [`country`](Self::country)).
///
/// # Defaults
///
/// - `app_name`: the credentials' company name, if any
/// - `timeout`: `None` (no client-side timeout)
/// - `poll_policy`: [`PollPolicy::default`]
#[derive(Debug, Default)]
pub struct MwsConfigBuilder {
    credentials: Option<Credentials>,
    region: Option<Region>,
    app_name: Option<String>,
    timeout: Option<Duration>,
    poll_policy: Option<PollPolicy>,
}

impl MwsConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the seller credentials (required).
    #[must_use]
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Sets the marketplace region.
    #[must_use]
    pub fn region(mut self, region: Region) -> Self {
        self.region = Some(region);
        self
    }

    /// Resolves the region for a country code through `table`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownRegion`] if the table has no entry for
    /// the country.
    pub fn country(mut self, country: &str, table: &RegionTable) -> Result<Self, ConfigError> {
        self.region = Some(table.lookup(country)?.clone());
        Ok(self)
    }

    /// Sets the application name used in the `User-Agent` header.
    #[must_use]
    pub fn app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = Some(name.into());
        self
    }

    /// Sets a timeout applied to every HTTP request.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the report polling policy.
    #[must_use]
    pub const fn poll_policy(mut self, policy: PollPolicy) -> Self {
        self.poll_policy = Some(policy);
        self
    }

    /// Builds the [`MwsConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if the credentials or
    /// the region were not set.
    pub fn build(self) -> Result<MwsConfig, ConfigError> {
        let credentials = self
            .credentials
            .ok_or(ConfigError::MissingRequiredField {
                field: "credentials",
            })?;
        let region = self
            .region
            .ok_or(ConfigError::MissingRequiredField { field: "region" })?;

        Ok(MwsConfig {
            credentials,
            region,
            app_name: self.app_name,
            timeout: self.timeout,
            poll_policy: self.poll_policy.unwrap_or_default(),
        })
    }
}
