//! Consolidation of flagged pairs into duplicate groups
//!
//! Groups are connected components of the flagged-pair graph. Each group
//! reports the reason, flag and confidence of its single highest-confidence
//! edge. Weak links are not re-checked transitively: a long chain of
//! moderately confident edges still forms one group.

use std::collections::{BTreeMap, HashMap};

use crate::domain::{DuplicateCluster, DuplicatePair, HotelId, HotelRecord};

/// Disjoint-set forest over dense indices
///
/// `find` is iterative with path halving, so deep chains cannot overflow the stack.
#[derive(Debug)]
struct DisjointSet {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl DisjointSet {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            size: vec![1; len],
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (mut ra, mut rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        if self.size[ra] < self.size[rb] {
            std::mem::swap(&mut ra, &mut rb);
        }
        self.parent[rb] = ra;
        self.size[ra] += self.size[rb];
    }
}

/// Merge flagged pairs into duplicate groups
///
/// Clusters come back ordered by their smallest member id; members are
/// ascending. Singleton groups are never returned.
pub fn consolidate(pairs: &[DuplicatePair]) -> Vec<DuplicateCluster> {
    if pairs.is_empty() {
        return vec![];
    }

    // First record seen for each id, in id order
    let mut hotels: BTreeMap<HotelId, &HotelRecord> = BTreeMap::new();
    // One pair per edge; repeated edges keep the most confident one
    let mut edges: BTreeMap<(HotelId, HotelId), &DuplicatePair> = BTreeMap::new();
    for pair in pairs {
        hotels.entry(pair.hotel1.id).or_insert(&pair.hotel1);
        hotels.entry(pair.hotel2.id).or_insert(&pair.hotel2);
        edges
            .entry(pair.edge())
            .and_modify(|kept| {
                if pair.confidence > kept.confidence {
                    *kept = pair;
                }
            })
            .or_insert(pair);
    }

    let index: HashMap<HotelId, usize> = hotels
        .keys()
        .enumerate()
        .map(|(i, id)| (*id, i))
        .collect();

    let mut forest = DisjointSet::new(index.len());
    for (a, b) in edges.keys() {
        forest.union(index[a], index[b]);
    }

    let mut members: BTreeMap<usize, Vec<HotelId>> = BTreeMap::new();
    for (id, i) in hotels.keys().map(|id| (*id, index[id])) {
        let root = forest.find(i);
        members.entry(root).or_default().push(id);
    }

    // Representative edge per root: highest confidence, ties to the smallest edge
    let mut best: HashMap<usize, &DuplicatePair> = HashMap::new();
    let mut edge_counts: HashMap<usize, usize> = HashMap::new();
    for (&(a, _), &pair) in &edges {
        let root = forest.find(index[&a]);
        *edge_counts.entry(root).or_insert(0) += 1;
        best.entry(root)
            .and_modify(|current| {
                if pair.confidence > current.confidence {
                    *current = pair;
                }
            })
            .or_insert(pair);
    }

    let mut clusters: Vec<DuplicateCluster> = members
        .into_iter()
        .filter(|(_, ids)| ids.len() >= 2)
        .filter_map(|(root, ids)| {
            let representative = best.get(&root)?;
            let records: Vec<&HotelRecord> = ids.iter().map(|id| hotels[id]).collect();
            Some(DuplicateCluster {
                hotel_name: join_distinct(records.iter().map(|r| r.name.as_str()), " / "),
                address: join_distinct(records.iter().map(|r| r.address.as_str()), " | "),
                reason: representative.reason.clone(),
                flag: representative.flag,
                confidence: round_to(representative.confidence, 3),
                edge_count: edge_counts.get(&root).copied().unwrap_or(0),
                hotel_ids: ids,
            })
        })
        .collect();

    clusters.sort_by_key(|c| c.primary_id());

    tracing::debug!(
        pairs = pairs.len(),
        clusters = clusters.len(),
        "Consolidated flagged pairs"
    );

    clusters
}

/// Join distinct non-empty values, keeping first-seen order
fn join_distinct<'a>(values: impl Iterator<Item = &'a str>, separator: &str) -> String {
    let mut seen: Vec<&str> = Vec::new();
    for value in values {
        if !value.is_empty() && !seen.contains(&value) {
            seen.push(value);
        }
    }
    seen.join(separator)
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FlagKind;

    fn pair(a: HotelId, b: HotelId, confidence: f64, flag: FlagKind) -> DuplicatePair {
        DuplicatePair {
            hotel1: HotelRecord::new(a, format!("Hotel {}", a), format!("{} Main St", a)),
            hotel2: HotelRecord::new(b, format!("Hotel {}", b), format!("{} Main St", b)),
            confidence,
            flag,
            distance_m: None,
            distance_score: 0.0,
            name_score: 0.0,
            address_score: 0.0,
            contact_match: false,
            reason: format!("edge {}-{}", a, b),
        }
    }

    #[test]
    fn test_disjoint_set_long_chain() {
        let mut forest = DisjointSet::new(100_000);
        for i in 1..100_000 {
            forest.union(i - 1, i);
        }
        let root = forest.find(0);
        assert_eq!(forest.find(99_999), root);
    }

    #[test]
    fn test_transitive_grouping() {
        let pairs = vec![
            pair(1, 2, 0.8, FlagKind::Review),
            pair(2, 3, 0.9, FlagKind::Auto),
        ];
        let clusters = consolidate(&pairs);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].hotel_ids, vec![1, 2, 3]);
        assert_eq!(clusters[0].reason, "edge 2-3");
        assert_eq!(clusters[0].flag, FlagKind::Auto);
        assert_eq!(clusters[0].edge_count, 2);
    }

    #[test]
    fn test_separate_groups_sorted_by_primary() {
        let pairs = vec![
            pair(10, 11, 0.7, FlagKind::Review),
            pair(3, 1, 0.8, FlagKind::Review),
        ];
        let clusters = consolidate(&pairs);
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].hotel_ids, vec![1, 3]);
        assert_eq!(clusters[1].hotel_ids, vec![10, 11]);
        assert_eq!(clusters[0].primary_id(), 1);
        assert_eq!(clusters[0].other_ids(), &[3]);
    }

    #[test]
    fn test_tie_goes_to_smallest_edge() {
        let pairs = vec![
            pair(2, 3, 0.8, FlagKind::Review),
            pair(1, 2, 0.8, FlagKind::Auto),
        ];
        let clusters = consolidate(&pairs);
        assert_eq!(clusters[0].reason, "edge 1-2");
    }

    #[test]
    fn test_names_and_addresses_distinct() {
        let mut p = pair(1, 2, 0.81234, FlagKind::Review);
        p.hotel2.name = p.hotel1.name.clone();
        p.hotel2.address = String::new();
        let clusters = consolidate(&[p]);
        assert_eq!(clusters[0].hotel_name, "Hotel 1");
        assert_eq!(clusters[0].address, "1 Main St");
        assert_eq!(clusters[0].confidence, 0.812);
    }

    #[test]
    fn test_empty_input() {
        assert!(consolidate(&[]).is_empty());
    }
}
