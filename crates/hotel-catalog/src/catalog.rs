//! Catalog payload types and their conversion into engine records
//!
//! The catalog is loose about types: ids and coordinates arrive as numbers
//! or numeric strings, optional fields may be missing, null or empty.

use hotel_dedup::{Coordinates, HotelId, HotelRecord};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::{CatalogError, Result};

/// Country or city entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedEntity {
    #[serde(deserialize_with = "flexible_id")]
    pub id: u64,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub name: String,
}

/// Hotel entry as returned by `/hotels`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogHotel {
    #[serde(default)]
    pub id: Value,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub address: String,
    #[serde(default)]
    pub latitude: Value,
    #[serde(default)]
    pub longitude: Value,
    #[serde(default)]
    pub city_id: Value,
    #[serde(default)]
    pub country_id: Value,
}

impl CatalogHotel {
    /// Sanitize into a `HotelRecord`
    ///
    /// The id must be numeric. Coordinates that cannot be parsed, are out of
    /// range, are only half present or sit at the `(0, 0)` placeholder are
    /// dropped.
    pub fn into_record(self) -> Result<HotelRecord> {
        let id = parse_id(&self.id).ok_or_else(|| {
            CatalogError::MalformedRecord(format!("non-numeric hotel id {}", self.id))
        })?;

        let mut record = HotelRecord::new(id, self.name.trim(), self.address.trim())
            .with_location(
                parse_id(&self.city_id).unwrap_or(0),
                parse_id(&self.country_id).unwrap_or(0),
            );
        record.coordinates = parse_coordinates(&self.latitude, &self.longitude);
        Ok(record)
    }
}

/// Optional details from `/hotel_info`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HotelInfo {
    pub site: Option<String>,
    pub phone: Option<String>,
    pub description: Option<String>,
    pub stars: Option<String>,
}

const SITE_KEYS: &[&str] = &["site", "website", "url"];
const PHONE_KEYS: &[&str] = &["phone", "phones", "telephone"];
const DESCRIPTION_KEYS: &[&str] = &["description", "descr", "text"];
const STARS_KEYS: &[&str] = &["stars", "star_rating", "category"];

impl HotelInfo {
    /// Extract the known fields from a `data` payload
    ///
    /// For each field the first key in its priority list holding a usable
    /// value wins. Arrays contribute their first usable entry.
    pub fn from_payload(payload: &Value) -> Self {
        let Some(object) = payload.as_object() else {
            return Self::default();
        };
        Self {
            site: first_text(object, SITE_KEYS),
            phone: first_text(object, PHONE_KEYS),
            description: first_text(object, DESCRIPTION_KEYS),
            stars: first_text(object, STARS_KEYS),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.site.is_none()
            && self.phone.is_none()
            && self.description.is_none()
            && self.stars.is_none()
    }

    pub fn has_contacts(&self) -> bool {
        self.site.is_some() || self.phone.is_some()
    }
}

fn first_text(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find_map(value_text)
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => items.iter().find_map(value_text),
        _ => None,
    }
}

/// Integer id from a number or a numeric string
pub fn parse_id(value: &Value) -> Option<HotelId> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_coordinates(latitude: &Value, longitude: &Value) -> Option<Coordinates> {
    let (lat, lon) = (parse_float(latitude)?, parse_float(longitude)?);
    if lat == 0.0 && lon == 0.0 {
        return None;
    }
    Coordinates::new(lat, lon).ok()
}

fn flexible_id<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    parse_id(&value)
        .ok_or_else(|| serde::de::Error::custom(format!("expected numeric id, got {}", value)))
}

fn string_or_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn hotel(value: Value) -> CatalogHotel {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_sanitize_numeric_strings() {
        let record = hotel(json!({
            "id": "42",
            "name": " Hotel Bristol ",
            "address": null,
            "latitude": "50.45",
            "longitude": 30.52,
            "city_id": "7",
        }))
        .into_record()
        .unwrap();

        assert_eq!(record.id, 42);
        assert_eq!(record.name, "Hotel Bristol");
        assert_eq!(record.address, "");
        assert_eq!(record.city_id, 7);
        assert_eq!(record.country_id, 0);
        let coords = record.coordinates.unwrap();
        assert_eq!(coords.latitude, 50.45);
        assert_eq!(coords.longitude, 30.52);
    }

    #[test]
    fn test_sanitize_rejects_bad_id() {
        let err = hotel(json!({"id": "abc", "name": "X"})).into_record();
        assert!(matches!(err, Err(CatalogError::MalformedRecord(_))));

        let err = hotel(json!({"name": "X"})).into_record();
        assert!(matches!(err, Err(CatalogError::MalformedRecord(_))));
    }

    #[test]
    fn test_sanitize_drops_unusable_coordinates() {
        let cases = [
            json!({"id": 1, "latitude": "n/a", "longitude": 30.0}),
            json!({"id": 1, "latitude": 50.0}),
            json!({"id": 1, "latitude": 0, "longitude": 0}),
            json!({"id": 1, "latitude": 95.0, "longitude": 30.0}),
        ];
        for case in cases {
            let record = hotel(case).into_record().unwrap();
            assert!(record.coordinates.is_none());
        }
    }

    #[test]
    fn test_hotel_info_priority() {
        let info = HotelInfo::from_payload(&json!({
            "website": "https://bristol.ua",
            "url": "https://other.ua",
            "phone": "",
            "phones": ["", "+380441112233", "+380441112234"],
            "descr": "Cozy place",
            "category": 4,
        }));
        assert_eq!(info.site.as_deref(), Some("https://bristol.ua"));
        assert_eq!(info.phone.as_deref(), Some("+380441112233"));
        assert_eq!(info.description.as_deref(), Some("Cozy place"));
        assert_eq!(info.stars.as_deref(), Some("4"));
        assert!(info.has_contacts());
    }

    #[test]
    fn test_hotel_info_from_non_object() {
        assert!(HotelInfo::from_payload(&json!([])).is_empty());
        assert!(HotelInfo::from_payload(&Value::Null).is_empty());
        assert!(!HotelInfo::from_payload(&json!({"text": "x"})).has_contacts());
    }

    #[test]
    fn test_named_entity_flexible_id() {
        let entities: Vec<NamedEntity> =
            serde_json::from_value(json!([{"id": "3", "name": "Ukraine"}, {"id": 4, "name": null}]))
                .unwrap();
        assert_eq!(entities[0].id, 3);
        assert_eq!(entities[1].name, "");
    }
}
