//! Candidate generation (blocking)
//!
//! Three overlapping strategies cut the all-pairs problem down to pairs worth
//! scoring. Their union, keyed by `(smaller id, larger id)`, is the candidate set.

use std::collections::{BTreeSet, HashMap};

use super::geo::{distance_m, METERS_PER_DEGREE_LAT};
use super::normalization::{name_tokens, DEFAULT_MIN_TOKEN_LEN};
use crate::domain::{Coordinates, HotelId, HotelRecord};

/// Unordered candidate pair, smaller id first
pub type CandidatePair = (HotelId, HotelId);

/// Working sets at or above this size use the tighter geo radius
pub const DENSE_CATALOG_SIZE: usize = 200;
/// Geo radius for sparse working sets
pub const SPARSE_RADIUS_M: f64 = 500.0;
/// Geo radius for dense working sets
pub const DENSE_RADIUS_M: f64 = 250.0;

/// Candidate pairs plus per-strategy counts (before union)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateSet {
    pub pairs: BTreeSet<CandidatePair>,
    pub geo: usize,
    pub name_tokens: usize,
    pub no_coordinates: usize,
}

impl CandidateSet {
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Geo radius adapted to the size of the working set
pub fn candidate_radius_m(total_hotels: usize) -> f64 {
    if total_hotels < DENSE_CATALOG_SIZE {
        SPARSE_RADIUS_M
    } else {
        DENSE_RADIUS_M
    }
}

/// Run all three strategies and merge them
pub fn generate_candidates(records: &[HotelRecord]) -> CandidateSet {
    let radius = candidate_radius_m(records.len());

    let geo = geo_candidates(records, radius);
    let by_name = name_token_candidates(records);
    let no_coords = no_coordinate_candidates(records);

    let mut set = CandidateSet {
        pairs: BTreeSet::new(),
        geo: geo.len(),
        name_tokens: by_name.len(),
        no_coordinates: no_coords.len(),
    };
    set.pairs.extend(geo);
    set.pairs.extend(by_name);
    set.pairs.extend(no_coords);

    tracing::debug!(
        radius_m = radius,
        geo = set.geo,
        name_tokens = set.name_tokens,
        no_coordinates = set.no_coordinates,
        total = set.pairs.len(),
        "Generated candidate pairs"
    );

    set
}

/// Pairs of located records within `radius_m` of each other (inclusive)
///
/// Records are swept in latitude order; the inner loop stops once the
/// latitude gap alone exceeds the radius, since great-circle distance is
/// never shorter than the meridian arc between two latitudes.
pub fn geo_candidates(records: &[HotelRecord], radius_m: f64) -> BTreeSet<CandidatePair> {
    let mut located: Vec<(HotelId, Coordinates)> = records
        .iter()
        .filter_map(|r| r.coordinates.map(|c| (r.id, c)))
        .collect();
    located.sort_by(|a, b| a.1.latitude.total_cmp(&b.1.latitude));

    let max_lat_gap = radius_m / METERS_PER_DEGREE_LAT + 1e-9;
    let mut pairs = BTreeSet::new();

    for (i, (id_a, a)) in located.iter().enumerate() {
        for (id_b, b) in &located[i + 1..] {
            if b.latitude - a.latitude > max_lat_gap {
                break;
            }
            if id_a == id_b {
                continue;
            }
            if distance_m(a, b) <= radius_m {
                pairs.insert(ordered(*id_a, *id_b));
            }
        }
    }

    pairs
}

/// Pairs of records whose full name-token sets are identical
///
/// Partial overlaps are left to geo blocking and the scorer.
pub fn name_token_candidates(records: &[HotelRecord]) -> BTreeSet<CandidatePair> {
    let mut groups: HashMap<BTreeSet<String>, Vec<HotelId>> = HashMap::new();
    for record in records {
        let tokens = name_tokens(&record.name, DEFAULT_MIN_TOKEN_LEN);
        if tokens.is_empty() {
            continue;
        }
        groups.entry(tokens).or_default().push(record.id);
    }

    let mut pairs = BTreeSet::new();
    for ids in groups.values() {
        for (i, a) in ids.iter().enumerate() {
            for b in &ids[i + 1..] {
                if a != b {
                    pairs.insert(ordered(*a, *b));
                }
            }
        }
    }

    pairs
}

/// Pairs of records without coordinates that share at least one name token
pub fn no_coordinate_candidates(records: &[HotelRecord]) -> BTreeSet<CandidatePair> {
    let unlocated: Vec<(HotelId, BTreeSet<String>)> = records
        .iter()
        .filter(|r| r.coordinates.is_none())
        .map(|r| (r.id, name_tokens(&r.name, DEFAULT_MIN_TOKEN_LEN)))
        .collect();

    let mut pairs = BTreeSet::new();
    for (i, (id_a, tokens_a)) in unlocated.iter().enumerate() {
        if tokens_a.is_empty() {
            continue;
        }
        for (id_b, tokens_b) in &unlocated[i + 1..] {
            if id_a != id_b && !tokens_a.is_disjoint(tokens_b) {
                pairs.insert(ordered(*id_a, *id_b));
            }
        }
    }

    pairs
}

fn ordered(a: HotelId, b: HotelId) -> CandidatePair {
    (a.min(b), a.max(b))
}
