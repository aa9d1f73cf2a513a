//! MWS API sections and their versioned endpoints.
//!
//! Each MWS API group is served under `<region endpoint>/<Section>/<Version>`
//! and every request carries the section's version in its `Version`
//! parameter.

use std::fmt;

use crate::config::Region;

/// An MWS API section.
///
/// # Example
///
/// ```rust
/// use mws_api::ApiSection;
///
/// assert_eq!(ApiSection::Orders.version(), "2013-09-01");
/// assert_eq!(format!("{}", ApiSection::Feeds), "Feeds/2009-01-01");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ApiSection {
    /// Orders API (`2013-09-01`).
    Orders,
    /// Reports API (`2009-01-01`).
    Reports,
    /// Feeds API (`2009-01-01`).
    Feeds,
}

impl ApiSection {
    /// Returns the API version string sent in the `Version` parameter.
    #[must_use]
    pub const fn version(&self) -> &'static str {
        match self {
            Self::Orders => "2013-09-01",
            Self::Reports | Self::Feeds => "2009-01-01",
        }
    }

    /// Returns the path segment naming the section.
    #[must_use]
    pub const fn path(&self) -> &'static str {
        match self {
            Self::Orders => "Orders",
            Self::Reports => "Reports",
            Self::Feeds => "Feeds",
        }
    }
}

impl fmt::Display for ApiSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.path(), self.version())
    }
}

/// A resolved endpoint for one API section in one region.
///
/// # Example
///
/// ```rust
/// use mws_api::{ApiSection, Endpoint, RegionTable};
///
/// let table = RegionTable::default();
/// let endpoint = Endpoint::new(table.lookup("US").unwrap(), ApiSection::Orders);
/// assert_eq!(endpoint.url(), "https://mws.amazonservices.com/Orders/2013-09-01");
/// assert_eq!(endpoint.version(), "2013-09-01");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    url: String,
    section: ApiSection,
}

impl Endpoint {
    /// Resolves the endpoint of `section` within `region`.
    #[must_use]
    pub fn new(region: &Region, section: ApiSection) -> Self {
        let base = region.endpoint().trim_end_matches('/');
        Self {
            url: format!("{base}/{section}"),
            section,
        }
    }

    /// Returns the full endpoint URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the API section.
    #[must_use]
    pub const fn section(&self) -> ApiSection {
        self.section
    }

    /// Returns the section's API version.
    #[must_use]
    pub const fn version(&self) -> &'static str {
        self.section.version()
    }
}
