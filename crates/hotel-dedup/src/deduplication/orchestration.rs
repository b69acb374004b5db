//! Duplicate detection entry points
//!
//! `find_duplicates` runs blocking, scoring and classification over one
//! scan's working set. `select_for_enrichment` applies the same scoring
//! primitives to decide which records are worth an extra contact lookup.

use std::borrow::Cow;
use std::collections::{BTreeSet, HashMap, HashSet};

use super::blocking::{
    candidate_radius_m, generate_candidates, geo_candidates, name_token_candidates,
};
use super::classify::classify;
use super::geo::distance_m;
use super::similarity::{address_score, name_score, score_pair};
use crate::domain::{DuplicatePair, HotelId, HotelRecord};

/// Enrichment is skipped for pairs with a name score below this
pub const ENRICH_MIN_NAME_SCORE: f64 = 0.5;
/// Close enough to be worth enriching
pub const ENRICH_MAX_DISTANCE_M: f64 = 500.0;
pub const ENRICH_MIN_ADDRESS_SCORE: f64 = 0.2;
pub const ENRICH_STRONG_NAME_SCORE: f64 = 0.75;

/// Score and classify every candidate pair; returns the flagged ones
///
/// Output is ordered by `(smaller id, larger id)`. If an id occurs more than
/// once, the first record wins.
pub fn find_duplicates(records: &[HotelRecord]) -> Vec<DuplicatePair> {
    let records = unique_by_id(records);
    let by_id: HashMap<HotelId, &HotelRecord> = records.iter().map(|r| (r.id, r)).collect();

    let candidates = generate_candidates(&records);
    let mut results = Vec::new();

    for (a, b) in &candidates.pairs {
        let (Some(h1), Some(h2)) = (by_id.get(a), by_id.get(b)) else {
            continue;
        };

        let score = score_pair(h1, h2);
        let decision = classify(
            score.confidence,
            score.distance_m,
            score.name_score,
            score.contact_match,
        );
        let Some(flag) = decision.flag() else {
            continue;
        };

        results.push(DuplicatePair {
            hotel1: (*h1).clone(),
            hotel2: (*h2).clone(),
            confidence: score.confidence,
            flag,
            distance_m: score.distance_m,
            distance_score: score.distance_score,
            name_score: score.name_score,
            address_score: score.address_score,
            contact_match: score.contact_match,
            reason: reason(
                score.distance_m,
                score.name_score,
                score.address_score,
                score.contact_match,
            ),
        });
    }

    tracing::debug!(
        hotels = records.len(),
        candidates = candidates.len(),
        flagged = results.len(),
        "Scored candidate pairs"
    );

    results
}

/// Human-readable explanation of a flag
///
/// Format: `distance 42 m, name similarity 0.91, address similarity 0.40, phone/site match`.
/// The distance part is present only when known (truncated to whole meters),
/// the contact part only on a match.
pub fn reason(
    distance_m: Option<f64>,
    name_score: f64,
    address_score: f64,
    contact_match: bool,
) -> String {
    let mut parts = Vec::with_capacity(4);
    if let Some(d) = distance_m {
        parts.push(format!("distance {} m", d.trunc() as i64));
    }
    parts.push(format!("name similarity {:.2}", name_score));
    parts.push(format!("address similarity {:.2}", address_score));
    if contact_match {
        parts.push("phone/site match".to_string());
    }
    parts.join(", ")
}

/// Whether a raw candidate pair would benefit from fetching contact details
pub fn needs_enrichment(a: &HotelRecord, b: &HotelRecord) -> bool {
    let name = name_score(&a.name, &b.name);
    if name < ENRICH_MIN_NAME_SCORE {
        return false;
    }

    let close = match (&a.coordinates, &b.coordinates) {
        (Some(ca), Some(cb)) => distance_m(ca, cb) <= ENRICH_MAX_DISTANCE_M,
        _ => false,
    };

    close
        || address_score(&a.address, &b.address) > ENRICH_MIN_ADDRESS_SCORE
        || name >= ENRICH_STRONG_NAME_SCORE
}

/// Ids of records that should be enriched before final scoring
///
/// Uses the geo and name-token strategies over the un-enriched working set.
pub fn select_for_enrichment(records: &[HotelRecord]) -> BTreeSet<HotelId> {
    let records = unique_by_id(records);
    let by_id: HashMap<HotelId, &HotelRecord> = records.iter().map(|r| (r.id, r)).collect();

    let mut candidates = geo_candidates(&records, candidate_radius_m(records.len()));
    candidates.extend(name_token_candidates(&records));

    let mut selected = BTreeSet::new();
    for (a, b) in candidates {
        let (Some(h1), Some(h2)) = (by_id.get(&a), by_id.get(&b)) else {
            continue;
        };
        if needs_enrichment(h1, h2) {
            selected.insert(a);
            selected.insert(b);
        }
    }

    tracing::debug!(
        hotels = records.len(),
        selected = selected.len(),
        "Selected hotels for enrichment"
    );

    selected
}

/// Drop repeated ids, keeping the first record; borrows when already unique
fn unique_by_id(records: &[HotelRecord]) -> Cow<'_, [HotelRecord]> {
    let mut seen = HashSet::with_capacity(records.len());
    if records.iter().all(|r| seen.insert(r.id)) {
        return Cow::Borrowed(records);
    }

    let mut seen = HashSet::with_capacity(records.len());
    let unique: Vec<HotelRecord> = records
        .iter()
        .filter(|r| {
            let first = seen.insert(r.id);
            if !first {
                tracing::warn!(hotel_id = r.id, "Duplicate hotel id in working set, keeping first");
            }
            first
        })
        .cloned()
        .collect();
    Cow::Owned(unique)
}
