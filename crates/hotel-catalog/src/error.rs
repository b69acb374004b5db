//! Error types for catalog access and scans

use thiserror::Error;

/// Failure talking to the catalog API
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("API key not configured")]
    MissingApiKey,

    #[error("API error {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Rate limited (429)")]
    RateLimited,

    #[error("Server error {status}")]
    Server { status: u16 },

    #[error("Request timeout")]
    Timeout,

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Malformed hotel record: {0}")]
    MalformedRecord(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl CatalogError {
    /// Whether the request may succeed if repeated
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CatalogError::RateLimited
                | CatalogError::Server { .. }
                | CatalogError::Timeout
                | CatalogError::Transport(_)
        )
    }
}

/// Failure of a whole scan
#[derive(Error, Debug)]
pub enum ScanError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("Scan cancelled")]
    Cancelled,

    #[error("No cities selected")]
    NoCities,
}

/// Result type for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Result type for scans
pub type ScanResult<T> = std::result::Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable() {
        assert!(CatalogError::RateLimited.is_retryable());
        assert!(CatalogError::Server { status: 503 }.is_retryable());
        assert!(CatalogError::Timeout.is_retryable());
        assert!(!CatalogError::MissingApiKey.is_retryable());
        assert!(!CatalogError::Http {
            status: 404,
            body: String::new()
        }
        .is_retryable());
    }

    #[test]
    fn test_display() {
        let err = CatalogError::Http {
            status: 403,
            body: "forbidden".to_string(),
        };
        assert_eq!(err.to_string(), "API error 403: forbidden");

        let scan: ScanError = CatalogError::MissingApiKey.into();
        assert_eq!(scan.to_string(), "API key not configured");
    }
}
