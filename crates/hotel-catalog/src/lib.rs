//! hotel-catalog: catalog access and scans around the `hotel-dedup` engine
//!
//! - [`client`]: rate-limited, retrying client for the catalog API
//! - [`catalog`]: payload types and sanitization into engine records
//! - [`scan`]: load / enrich / detect orchestration with per-scan state
//! - [`export`]: CSV and JSON output
//! - [`config`]: TOML configuration with environment override

pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod export;
pub mod rate_limiter;
pub mod scan;
pub mod stats;

pub use catalog::{CatalogHotel, HotelInfo, NamedEntity};
pub use client::{CatalogClient, CatalogSource};
pub use config::{ConfigError, ScanConfig};
pub use error::{CatalogError, ScanError};
pub use scan::{
    run_error_scan, run_scan, CancelFlag, DescriptionIssue, EnrichmentCache, ScanContext,
    ScanOutcome, ScanPhase, ScanProgress,
};
pub use stats::{RequestStats, StatsSnapshot};
