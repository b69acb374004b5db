//! Error types for hotel records

use thiserror::Error;

/// Result type alias for record construction
pub type Result<T> = std::result::Result<T, RecordError>;

/// Errors raised while building a [`crate::HotelRecord`] from raw values
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordError {
    /// Latitude or longitude is not a finite number in range
    #[error("Invalid coordinates: lat={latitude}, lon={longitude}")]
    InvalidCoordinates { latitude: f64, longitude: f64 },
}
