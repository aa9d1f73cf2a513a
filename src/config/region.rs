//! Marketplace regions.
//!
//! A [`Region`] ties a country code to the MWS endpoint serving it and the
//! marketplace identifier sent with every request. [`RegionTable`] is an
//! immutable lookup built once and handed to the client configuration.

use crate::error::ConfigError;

/// A marketplace region: endpoint base URL plus marketplace id.
///
/// # Example
///
/// ```rust
/// use mws_api::Region;
///
/// // Custom regions are handy for pointing the client at a test server.
/// let region = Region::new("NA", "US", "http://127.0.0.1:8080/", "ATVPDKIKX0DER");
/// assert_eq!(region.endpoint(), "http://127.0.0.1:8080/");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Region {
    region_id: String,
    country: String,
    endpoint: String,
    marketplace_id: String,
}

impl Region {
    /// Creates a region.
    ///
    /// The endpoint is the base URL that API paths such as
    /// `Orders/2013-09-01` are appended to.
    #[must_use]
    pub fn new(
        region_id: impl Into<String>,
        country: impl Into<String>,
        endpoint: impl Into<String>,
        marketplace_id: impl Into<String>,
    ) -> Self {
        Self {
            region_id: region_id.into(),
            country: country.into(),
            endpoint: endpoint.into(),
            marketplace_id: marketplace_id.into(),
        }
    }

    /// Returns the region id (`NA`, `EU`, `FE`, `CN`).
    #[must_use]
    pub fn region_id(&self) -> &str {
        &self.region_id
    }

    /// Returns the country code.
    #[must_use]
    pub fn country(&self) -> &str {
        &self.country
    }

    /// Returns the endpoint base URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Returns the marketplace id.
    #[must_use]
    pub fn marketplace_id(&self) -> &str {
        &self.marketplace_id
    }
}

const BUILTIN_REGIONS: &[(&str, &str, &str, &str)] = &[
    ("NA", "US", "https://mws.amazonservices.com/", "ATVPDKIKX0DER"),
    ("NA", "CA", "https://mws.amazonservices.ca/", "A2EUQ1WTGCTBG2"),
    ("EU", "DE", "https://mws-eu.amazonservices.com/", "A1PA6795UKMFR9"),
    ("EU", "ES", "https://mws-eu.amazonservices.com/", "A1RKKUPIHCS9HS"),
    ("EU", "FR", "https://mws-eu.amazonservices.com/", "A13V1IB3VIYZZH"),
    ("EU", "IN", "https://mws.amazonservices.in/", "A21TJRUUN4KGV"),
    ("EU", "IT", "https://mws-eu.amazonservices.com/", "APJ6JRA9NG5V4"),
    ("EU", "UK", "https://mws-eu.amazonservices.com/", "A1F83G8C2ARO7P"),
    ("FE", "JP", "https://mws.amazonservices.jp/", "A1VC38T7YXB528"),
    ("CN", "CN", "https://mws.amazonservices.com.cn/", "AAHKV2X7AFYLW"),
];

/// Immutable country → region lookup.
///
/// `RegionTable::default()` contains the published MWS marketplaces. Build a
/// custom table with [`RegionTable::new`] when additional or overridden
/// endpoints are needed.
///
/// # Example
///
/// ```rust
/// use mws_api::RegionTable;
///
/// let table = RegionTable::default();
/// let uk = table.lookup("uk").unwrap();
/// assert_eq!(uk.marketplace_id(), "A1F83G8C2ARO7P");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegionTable {
    regions: Vec<Region>,
}

impl RegionTable {
    /// Creates a table from an explicit list of regions.
    #[must_use]
    pub const fn new(regions: Vec<Region>) -> Self {
        Self { regions }
    }

    /// Looks up a region by country code, ignoring ASCII case.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownRegion`] if no region matches.
    pub fn lookup(&self, country: &str) -> Result<&Region, ConfigError> {
        self.regions
            .iter()
            .find(|region| region.country.eq_ignore_ascii_case(country))
            .ok_or_else(|| ConfigError::UnknownRegion {
                country: country.to_string(),
            })
    }

    /// Returns all regions in the table.
    #[must_use]
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }
}

impl Default for RegionTable {
    fn default() -> Self {
        Self::new(
            BUILTIN_REGIONS
                .iter()
                .map(|&(id, country, endpoint, marketplace)| {
                    Region::new(id, country, endpoint, marketplace)
                })
                .collect(),
        )
    }
}
