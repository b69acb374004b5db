//! Duplicate pair and cluster result types

use serde::{Deserialize, Serialize};

use super::hotel::{HotelId, HotelRecord};

/// Kind of a raised flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagKind {
    /// Strong enough to act on without human review
    Auto,
    /// Needs a human decision
    Review,
}

impl FlagKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlagKind::Auto => "auto",
            FlagKind::Review => "review",
        }
    }
}

impl std::fmt::Display for FlagKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifier output for one scored pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagDecision {
    None,
    Review,
    Auto,
}

impl FlagDecision {
    /// The flag to raise, if any
    pub fn flag(self) -> Option<FlagKind> {
        match self {
            FlagDecision::None => None,
            FlagDecision::Review => Some(FlagKind::Review),
            FlagDecision::Auto => Some(FlagKind::Auto),
        }
    }
}

/// A scored candidate pair that the classifier decided to flag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicatePair {
    /// Record with the smaller id
    pub hotel1: HotelRecord,
    /// Record with the larger id
    pub hotel2: HotelRecord,
    /// Fused confidence (0.0 to 1.0)
    pub confidence: f64,
    pub flag: FlagKind,
    /// Great-circle distance, if both records have coordinates
    pub distance_m: Option<f64>,
    pub distance_score: f64,
    pub name_score: f64,
    pub address_score: f64,
    pub contact_match: bool,
    /// Human-readable explanation of the flag
    pub reason: String,
}

impl DuplicatePair {
    /// Unordered edge key, smaller id first
    pub fn edge(&self) -> (HotelId, HotelId) {
        let (a, b) = (self.hotel1.id, self.hotel2.id);
        (a.min(b), a.max(b))
    }
}

/// A group of hotel ids connected through flagged pairs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateCluster {
    /// Member ids, ascending (at least two)
    pub hotel_ids: Vec<HotelId>,
    /// Distinct non-empty member names joined with " / "
    pub hotel_name: String,
    /// Distinct non-empty member addresses joined with " | "
    pub address: String,
    /// Reason of the highest-confidence edge in the group
    pub reason: String,
    pub flag: FlagKind,
    /// Confidence of the representative edge, rounded to 3 decimals
    pub confidence: f64,
    /// Number of flagged edges inside the group
    pub edge_count: usize,
}

impl DuplicateCluster {
    /// Smallest member id
    pub fn primary_id(&self) -> HotelId {
        self.hotel_ids.first().copied().unwrap_or_default()
    }

    /// Every member except the primary one
    pub fn other_ids(&self) -> &[HotelId] {
        self.hotel_ids.get(1..).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.hotel_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hotel_ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_serialization() {
        assert_eq!(serde_json::to_string(&FlagKind::Auto).unwrap(), "\"auto\"");
        assert_eq!(serde_json::to_string(&FlagKind::Review).unwrap(), "\"review\"");
        assert_eq!(FlagDecision::None.flag(), None);
        assert_eq!(FlagDecision::Review.flag(), Some(FlagKind::Review));
    }
}
