//! hotel-dedup: duplicate detection for hotel catalog feeds
//!
//! This library provides pure Rust implementations of:
//! - Name, address, phone and web-site normalization
//! - Candidate generation (geo, name-token and no-coordinate blocking)
//! - Pairwise similarity scoring with weighted feature fusion
//! - Confidence-threshold flag classification (auto / review)
//! - Transitive-closure clustering of flagged pairs into duplicate groups
//!
//! The engine is synchronous and performs no I/O. Fetching catalog pages and
//! enrichment lives in the `hotel-catalog` crate.

pub mod deduplication;
pub mod domain;
pub mod error;

// Re-export main types for convenience
pub use deduplication::{consolidate, find_duplicates};
pub use domain::{
    Coordinates, DuplicateCluster, DuplicatePair, FlagDecision, FlagKind, HotelId, HotelRecord,
};
pub use error::RecordError;
