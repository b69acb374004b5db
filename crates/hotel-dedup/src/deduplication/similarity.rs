//! Similarity scoring for deduplication
//!
//! Four sub-scores per pair (distance, name, address, contact) are fused
//! into one confidence with fixed weights. Components without data
//! (no contacts on one side, unknown distance) drop out of the fusion and the
//! remaining weights are rescaled instead of counting as a mismatch.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::geo::{distance_m, distance_score};
use super::normalization::{
    address_tokens, name_tokens, normalize_phone, normalize_site, DEFAULT_MIN_TOKEN_LEN,
};
use crate::domain::HotelRecord;

pub const CONTACT_WEIGHT: f64 = 0.35;
pub const DISTANCE_WEIGHT: f64 = 0.25;
pub const NAME_WEIGHT: f64 = 0.25;
pub const ADDRESS_WEIGHT: f64 = 0.15;

/// Bonus per shared name token, for up to `MAX_BONUS_TOKENS` tokens
pub const SHARED_TOKEN_BONUS: f64 = 0.1;
pub const MAX_BONUS_TOKENS: usize = 3;

/// Brand protection: high name match at a different place is likely a chain branch
pub const BRAND_NAME_THRESHOLD: f64 = 0.85;
pub const BRAND_ADDRESS_CEILING: f64 = 0.3;
pub const BRAND_MIN_DISTANCE_M: f64 = 500.0;
pub const BRAND_PENALTY: f64 = 0.7;

/// Full scoring breakdown for one candidate pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PairScore {
    /// Great-circle distance, if both records have coordinates
    pub distance_m: Option<f64>,
    pub distance_score: f64,
    pub name_score: f64,
    pub address_score: f64,
    pub contact_match: bool,
    /// Whether the contact component took part in the fusion
    pub contact_weighted: bool,
    /// Fused confidence before brand protection
    pub raw_confidence: f64,
    /// Final confidence
    pub confidence: f64,
    pub brand_protected: bool,
}

/// Jaccard similarity of two token sets; 0.0 if either is empty
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    intersection as f64 / union as f64
}

/// Name similarity: token Jaccard plus a bonus for shared tokens, capped at 1.0
pub fn name_score(name1: &str, name2: &str) -> f64 {
    let tokens1 = name_tokens(name1, DEFAULT_MIN_TOKEN_LEN);
    let tokens2 = name_tokens(name2, DEFAULT_MIN_TOKEN_LEN);
    if tokens1.is_empty() || tokens2.is_empty() {
        return 0.0;
    }

    let shared = tokens1.intersection(&tokens2).count();
    let bonus = SHARED_TOKEN_BONUS * shared.min(MAX_BONUS_TOKENS) as f64;
    (jaccard(&tokens1, &tokens2) + bonus).min(1.0)
}

/// Plain Jaccard of normalized address tokens
pub fn address_score(address1: &str, address2: &str) -> f64 {
    if address1.trim().is_empty() || address2.trim().is_empty() {
        return 0.0;
    }
    jaccard(&address_tokens(address1), &address_tokens(address2))
}

/// True if normalized sites or normalized phones are equal and non-empty
pub fn contact_match(a: &HotelRecord, b: &HotelRecord) -> bool {
    let same_site = {
        let (s1, s2) = (normalize_site(&a.site), normalize_site(&b.site));
        !s1.is_empty() && s1 == s2
    };
    if same_site {
        return true;
    }

    let (p1, p2) = (normalize_phone(&a.phone), normalize_phone(&b.phone));
    !p1.is_empty() && p1 == p2
}

/// Score one candidate pair
pub fn score_pair(a: &HotelRecord, b: &HotelRecord) -> PairScore {
    let distance = match (&a.coordinates, &b.coordinates) {
        (Some(ca), Some(cb)) => Some(distance_m(ca, cb)),
        _ => None,
    };
    let dist_score = distance.map(distance_score).unwrap_or(0.0);
    let name = name_score(&a.name, &b.name);
    let address = address_score(&a.address, &b.address);
    let contact = contact_match(a, b);
    let contact_weighted = a.has_contacts() && b.has_contacts();

    let mut weighted_sum = NAME_WEIGHT * name + ADDRESS_WEIGHT * address;
    let mut total_weight = NAME_WEIGHT + ADDRESS_WEIGHT;
    if distance.is_some() {
        weighted_sum += DISTANCE_WEIGHT * dist_score;
        total_weight += DISTANCE_WEIGHT;
    }
    if contact_weighted {
        let contact_value = if contact { 1.0 } else { 0.0 };
        weighted_sum += CONTACT_WEIGHT * contact_value;
        total_weight += CONTACT_WEIGHT;
    }
    let raw_confidence = weighted_sum / total_weight;

    let brand_protected = name >= BRAND_NAME_THRESHOLD
        && address < BRAND_ADDRESS_CEILING
        && distance.is_some_and(|d| d > BRAND_MIN_DISTANCE_M);
    let confidence = if brand_protected {
        raw_confidence * BRAND_PENALTY
    } else {
        raw_confidence
    };

    PairScore {
        distance_m: distance,
        distance_score: dist_score,
        name_score: name,
        address_score: address,
        contact_match: contact,
        contact_weighted,
        raw_confidence,
        confidence,
        brand_protected,
    }
}
