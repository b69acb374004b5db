//! Flag classification of scored pairs

use crate::domain::FlagDecision;

/// No flag below this confidence
pub const CONFIDENCE_FLOOR: f64 = 0.60;

/// Pairs farther apart than this need a contact match to be flagged at all
pub const VETO_DISTANCE_M: f64 = 2000.0;

/// Auto flag via contacts: contact match and name at least this
pub const AUTO_CONTACT_NAME_MIN: f64 = 0.75;

/// Auto flag via proximity: closer than this and name at least `AUTO_NEAR_NAME_MIN`
pub const AUTO_NEAR_DISTANCE_M: f64 = 150.0;
pub const AUTO_NEAR_NAME_MIN: f64 = 0.88;

/// Review threshold. Carried over as a fixed constant, not re-derived from data.
pub const REVIEW_CONFIDENCE_MIN: f64 = 0.75;

/// Decide whether a scored pair is flagged, and how
///
/// The distance veto runs before the auto/review checks, so a far-apart
/// pair without a contact match is never flagged whatever its confidence.
pub fn classify(
    confidence: f64,
    distance_m: Option<f64>,
    name_score: f64,
    contact_match: bool,
) -> FlagDecision {
    if confidence < CONFIDENCE_FLOOR {
        return FlagDecision::None;
    }
    if distance_m.is_some_and(|d| d > VETO_DISTANCE_M) && !contact_match {
        return FlagDecision::None;
    }

    if contact_match && name_score >= AUTO_CONTACT_NAME_MIN {
        return FlagDecision::Auto;
    }
    if distance_m.is_some_and(|d| d < AUTO_NEAR_DISTANCE_M) && name_score >= AUTO_NEAR_NAME_MIN {
        return FlagDecision::Auto;
    }

    if confidence >= REVIEW_CONFIDENCE_MIN {
        return FlagDecision::Review;
    }

    FlagDecision::None
}
