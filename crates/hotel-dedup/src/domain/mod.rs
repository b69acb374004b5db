//! Domain models for hotel deduplication
//!
//! `HotelRecord` is the scan-time snapshot of one catalog entry.
//! `DuplicatePair` and `DuplicateCluster` are the derived results.

pub mod duplicate;
pub mod hotel;

pub use duplicate::{DuplicateCluster, DuplicatePair, FlagDecision, FlagKind};
pub use hotel::{Coordinates, HotelId, HotelRecord};
