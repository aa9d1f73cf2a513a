//! The parameter multimap carried by every MWS request.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};

/// Request parameters: each name maps to one or more values.
///
/// Names are kept in sorted order and values in insertion order; the
/// canonical encoding sorts both, so the order in which callers add
/// parameters never affects the signed query string.
///
/// # Example
///
/// ```rust
/// use mws_api::auth::ParameterBag;
///
/// let mut params = ParameterBag::new();
/// params.add("Action", "GetOrder");
/// params.add_indexed("AmazonOrderId.Id", ["111", "222"]);
///
/// assert_eq!(params.first("Action"), Some("GetOrder"));
/// assert_eq!(params.first("AmazonOrderId.Id.2"), Some("222"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParameterBag {
    values: BTreeMap<String, Vec<String>>,
}

impl ParameterBag {
    /// Creates an empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value to `name`, keeping any existing values.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values
            .entry(name.into())
            .or_default()
            .push(value.into());
    }

    /// Replaces all values of `name` with a single value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), vec![value.into()]);
    }

    /// Adds one parameter per item as `<prefix>.1`, `<prefix>.2`, ...
    ///
    /// This is the MWS convention for list parameters such as
    /// `OrderStatus.Status.1`.
    pub fn add_indexed<I, V>(&mut self, prefix: &str, items: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        for (i, item) in items.into_iter().enumerate() {
            self.set(format!("{prefix}.{}", i + 1), item);
        }
    }

    /// Returns the first value of `name`.
    #[must_use]
    pub fn first(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns all values of `name`.
    #[must_use]
    pub fn get_all(&self, name: &str) -> &[String] {
        self.values.get(name).map_or(&[][..], Vec::as_slice)
    }

    /// Returns `true` if `name` has at least one value.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Returns `true` if the bag holds no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over names and their values, names in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.values
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }
}

impl<K, V> FromIterator<(K, V)> for ParameterBag
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut bag = Self::new();
        for (name, value) in iter {
            bag.add(name, value);
        }
        bag
    }
}

/// Formats a timestamp as MWS expects: UTC, second precision,
/// `YYYY-MM-DDTHH:MM:SSZ`.
///
/// # Example
///
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use mws_api::auth::format_timestamp;
///
/// let t = Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap();
/// assert_eq!(format_timestamp(&t), "2020-01-02T03:04:05Z");
/// ```
#[must_use]
pub fn format_timestamp(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}
