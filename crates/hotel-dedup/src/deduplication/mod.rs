//! Deduplication algorithms for detecting duplicate hotel listings
//!
//! Pipeline: blocking produces candidate pairs, the scorer fuses four
//! sub-scores into a confidence, the classifier decides auto / review / none,
//! and the consolidator merges flagged pairs into connected groups.

pub mod blocking;
pub mod classify;
pub mod clustering;
pub mod geo;
pub mod normalization;
pub mod orchestration;
pub mod similarity;

pub use blocking::{candidate_radius_m, generate_candidates, CandidatePair, CandidateSet};
pub use classify::classify;
pub use clustering::consolidate;
pub use geo::{distance_m, distance_score, haversine_km};
pub use normalization::{
    address_tokens, name_tokens, normalize_address, normalize_name, normalize_phone,
    normalize_site, DEFAULT_MIN_TOKEN_LEN,
};
pub use orchestration::{find_duplicates, needs_enrichment, reason, select_for_enrichment};
pub use similarity::{address_score, contact_match, name_score, score_pair, PairScore};
