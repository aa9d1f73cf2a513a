//! # MWS API Rust SDK
//!
//! A Rust SDK for the Amazon Marketplace Web Service (MWS) API, providing
//! type-safe configuration, signature version 2 request signing, and an
//! async HTTP client with pagination and feed encoding on top.
//!
//! ## Overview
//!
//! This SDK provides:
//! - Type-safe configuration via [`MwsConfig`] and [`MwsConfigBuilder`]
//! - Marketplace lookup by country via [`RegionTable`]
//! - HMAC-SHA256 request signing via [`auth`]
//! - Async HTTP client with opt-in retries and cancellation via [`HttpClient`]
//! - Cursor pagination that keeps partial results on failure via [`clients::collect_all`]
//! - Feed document encoding with `ContentMD5Value` checksums via [`feeds`]
//! - Orders, Reports and Feeds API wrappers
//!
//! ## Quick Start
//!
//! ```rust
//! use mws_api::{ApiSection, Credentials, MwsConfig, RegionTable};
//!
//! let regions = RegionTable::default();
//! let config = MwsConfig::builder()
//!     .credentials(Credentials::new("access-key-id", "secret-key", "merchant-id"))
//!     .country("DE", &regions)
//!     .unwrap()
//!     .app_name("inventory-sync")
//!     .build()
//!     .unwrap();
//!
//! let orders = config.endpoint(ApiSection::Orders);
//! assert_eq!(orders.url(), "https://mws-eu.amazonservices.com/Orders/2013-09-01");
//! assert_eq!(orders.version(), "2013-09-01");
//! ```
//!
//! ## Signing a Request
//!
//! ```rust
//! use mws_api::{ApiSection, Credentials, HttpClient, MwsConfig, RegionTable};
//! use mws_api::clients::{HttpMethod, MwsRequest};
//!
//! let config = MwsConfig::builder()
//!     .credentials(Credentials::new("access-key-id", "secret-key", "merchant-id"))
//!     .country("US", &RegionTable::default())
//!     .unwrap()
//!     .build()
//!     .unwrap();
//! let client = HttpClient::new(&config).unwrap();
//!
//! let request = MwsRequest::builder(
//!     HttpMethod::Post,
//!     &config.endpoint(ApiSection::Reports),
//!     "GetReportCount",
//! )
//! .build();
//!
//! let signed = client.assemble(request).unwrap();
//! assert_eq!(signed.params.first("SellerId"), Some("merchant-id"));
//! assert_eq!(signed.params.first("SignatureMethod"), Some("HmacSHA256"));
//! assert!(signed.params.contains("Signature"));
//! ```
//!
//! ## Calling an API
//!
//! ```rust,ignore
//! use mws_api::orders::OrdersApi;
//! use tokio_util::sync::CancellationToken;
//!
//! let cancel = CancellationToken::new();
//! let orders = OrdersApi::new(&client, &config)
//!     .list_orders()
//!     .created_after(since)
//!     .order_statuses(["Unshipped", "PartiallyShipped"])
//!     .all(&cancel)
//!     .await?;
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: Configuration is instance-based and passed explicitly
//! - **Fail-fast validation**: Missing credentials are rejected before any network I/O
//! - **Thread-safe**: The client and configuration are `Send + Sync`
//! - **Async-first**: Designed for use with the Tokio async runtime

pub mod auth;
pub mod clients;
pub mod config;
pub mod error;
pub mod feeds;
pub mod orders;
pub mod reports;

// Re-export public types at crate root for convenience
pub use config::{
    ApiSection, Credentials, Endpoint, MwsConfig, MwsConfigBuilder, PollPolicy, Region,
    RegionTable, SecretKey,
};
pub use error::ConfigError;

// Re-export HTTP client types
pub use clients::{HttpClient, MwsError, Transport};
