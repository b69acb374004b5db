//! Hotel record domain type

use serde::{Deserialize, Serialize};

use crate::error::{RecordError, Result};

/// Catalog-assigned hotel identifier
pub type HotelId = u64;

/// A latitude/longitude pair in decimal degrees
///
/// Both values travel together, so a record either has a full position or none.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Build coordinates, rejecting non-finite or out-of-range values
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        if !valid {
            return Err(RecordError::InvalidCoordinates {
                latitude,
                longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

/// Snapshot of one catalog entry at scan time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotelRecord {
    /// Unique within a scan
    pub id: HotelId,
    /// Display name as supplied by the catalog
    pub name: String,
    /// Street address (free text, may be empty)
    #[serde(default)]
    pub address: String,
    /// Geocoordinates, if the catalog has them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    /// Website (empty until enrichment)
    #[serde(default)]
    pub site: String,
    /// Phone number (empty until enrichment)
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub city_id: u64,
    #[serde(default)]
    pub country_id: u64,
}

impl HotelRecord {
    pub fn new(id: HotelId, name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            address: address.into(),
            coordinates: None,
            site: String::new(),
            phone: String::new(),
            city_id: 0,
            country_id: 0,
        }
    }

    /// Attach validated coordinates
    pub fn with_coordinates(mut self, latitude: f64, longitude: f64) -> Result<Self> {
        self.coordinates = Some(Coordinates::new(latitude, longitude)?);
        Ok(self)
    }

    pub fn with_location(mut self, city_id: u64, country_id: u64) -> Self {
        self.city_id = city_id;
        self.country_id = country_id;
        self
    }

    pub fn with_contacts(mut self, site: impl Into<String>, phone: impl Into<String>) -> Self {
        self.site = site.into().trim().to_string();
        self.phone = phone.into().trim().to_string();
        self
    }

    /// Apply enrichment results
    ///
    /// Both fields are overwritten (absent values clear the field), matching
    /// a single enrichment write per record.
    pub fn apply_contacts(&mut self, site: Option<&str>, phone: Option<&str>) {
        self.site = site.map(str::trim).unwrap_or_default().to_string();
        self.phone = phone.map(str::trim).unwrap_or_default().to_string();
    }

    /// True if the record carries a site or a phone
    pub fn has_contacts(&self) -> bool {
        !self.site.is_empty() || !self.phone.is_empty()
    }

    pub fn has_coordinates(&self) -> bool {
        self.coordinates.is_some()
    }
}
