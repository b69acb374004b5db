//! Catalog API client with rate limiting and retry
//!
//! Every request goes through the client's token bucket. Rate limiting,
//! server errors, timeouts and transport failures are retried with
//! exponential backoff. Other client errors fail at once.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use hotel_dedup::HotelId;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::catalog::{CatalogHotel, HotelInfo, NamedEntity};
use crate::config::ScanConfig;
use crate::error::{CatalogError, Result};
use crate::rate_limiter::RateLimiter;
use crate::stats::{RequestStats, StatsSnapshot};

/// Page size for `/countries`
pub const COUNTRIES_PER_PAGE: u32 = 500;
/// Page size for `/cities` (single page)
pub const CITIES_PER_PAGE: u32 = 1000;
/// Characters of an error body kept in `CatalogError::Http`
pub const ERROR_BODY_LIMIT: usize = 300;

/// What scans need from the catalog
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// One page of raw hotels for a city (pages start at 1)
    async fn hotels_page(
        &self,
        city_id: u64,
        country_id: Option<u64>,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<CatalogHotel>>;

    /// Enrichment details for one hotel
    async fn hotel_info(&self, hotel_id: HotelId) -> Result<HotelInfo>;

    /// Request statistics so far
    fn stats(&self) -> StatsSnapshot {
        StatsSnapshot::default()
    }
}

pub struct CatalogClient {
    http: Client,
    config: ScanConfig,
    limiter: RateLimiter,
    stats: RequestStats,
    backoff_unit: Duration,
}

impl CatalogClient {
    pub fn new(config: ScanConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!("hotel-dedup/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CatalogError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            limiter: RateLimiter::new(config.rps),
            stats: RequestStats::new(),
            backoff_unit: Duration::from_secs(1),
            config,
        })
    }

    /// Scale the retry backoff (`unit * 2^attempt`)
    pub fn with_backoff_unit(mut self, unit: Duration) -> Self {
        self.backoff_unit = unit;
        self
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// All countries, following pagination
    pub async fn countries(&self) -> Result<Vec<NamedEntity>> {
        let mut countries = Vec::new();
        let mut page = 1u32;
        loop {
            let data = self
                .get_data(
                    "/countries",
                    &[
                        ("page", page.to_string()),
                        ("per_page", COUNTRIES_PER_PAGE.to_string()),
                    ],
                )
                .await?;
            let items: Vec<NamedEntity> = decode_list(data)?;
            let short_page = items.len() < COUNTRIES_PER_PAGE as usize;
            countries.extend(items);
            if short_page {
                break;
            }
            page += 1;
        }
        Ok(countries)
    }

    /// Cities of one country
    pub async fn cities(&self, country_id: u64) -> Result<Vec<NamedEntity>> {
        let data = self
            .get_data(
                "/cities",
                &[
                    ("country_id", country_id.to_string()),
                    ("per_page", CITIES_PER_PAGE.to_string()),
                ],
            )
            .await?;
        decode_list(data)
    }

    /// GET `path` and return the `data` field of the response
    async fn get_data(&self, path: &str, params: &[(&str, String)]) -> Result<Value> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(CatalogError::MissingApiKey)?;

        let url = self.endpoint(path, api_key, params)?;
        let attempts = self.config.max_retries.max(1);
        let mut last_error = CatalogError::Transport("no attempt made".to_string());

        for attempt in 0..attempts {
            match self.send_once(&url).await {
                Ok(data) => return Ok(data),
                Err(err) if err.is_retryable() => {
                    if attempt + 1 < attempts {
                        let wait = self.backoff_unit * 2u32.saturating_pow(attempt);
                        tracing::warn!(
                            path,
                            attempt = attempt + 1,
                            wait_ms = wait.as_millis() as u64,
                            error = %err,
                            "Catalog request failed, retrying"
                        );
                        tokio::time::sleep(wait).await;
                    }
                    last_error = err;
                }
                Err(err) => return Err(err),
            }
        }

        tracing::warn!(path, attempts, error = %last_error, "Catalog request gave up");
        Err(last_error)
    }

    async fn send_once(&self, url: &Url) -> Result<Value> {
        self.limiter.acquire().await;
        let started = Instant::now();

        let response = self.http.get(url.clone()).send().await.map_err(transport_error)?;
        self.stats.record(started.elapsed());

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(CatalogError::RateLimited);
        }
        if status.is_server_error() {
            return Err(CatalogError::Server {
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(transport_error)?;
        if status.is_client_error() {
            return Err(CatalogError::Http {
                status: status.as_u16(),
                body: body.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }

        let value: Value =
            serde_json::from_str(&body).map_err(|e| CatalogError::Decode(e.to_string()))?;
        match value {
            Value::Object(mut object) => Ok(object.remove("data").unwrap_or(Value::Null)),
            _ => Err(CatalogError::Decode(
                "expected a JSON object at top level".to_string(),
            )),
        }
    }

    fn endpoint(&self, path: &str, api_key: &str, params: &[(&str, String)]) -> Result<Url> {
        let base = format!("{}{}", self.config.base_url.trim_end_matches('/'), path);
        let query = params
            .iter()
            .map(|(k, v)| (*k, v.as_str()))
            .chain([("apikey", api_key), ("lang", self.config.lang.as_str())]);
        Url::parse_with_params(&base, query)
            .map_err(|e| CatalogError::InvalidUrl(format!("{}: {}", base, e)))
    }
}

#[async_trait]
impl CatalogSource for CatalogClient {
    async fn hotels_page(
        &self,
        city_id: u64,
        country_id: Option<u64>,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<CatalogHotel>> {
        let mut params = vec![
            ("city_id", city_id.to_string()),
            ("page", page.to_string()),
            ("per_page", per_page.to_string()),
        ];
        if let Some(country_id) = country_id {
            params.push(("country_id", country_id.to_string()));
        }
        let data = self.get_data("/hotels", &params).await?;
        decode_list(data)
    }

    async fn hotel_info(&self, hotel_id: HotelId) -> Result<HotelInfo> {
        let data = self
            .get_data("/hotel_info", &[("hotel_id", hotel_id.to_string())])
            .await?;
        Ok(HotelInfo::from_payload(&data))
    }

    fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }
}

fn transport_error(err: reqwest::Error) -> CatalogError {
    if err.is_timeout() {
        CatalogError::Timeout
    } else {
        CatalogError::Transport(err.to_string())
    }
}

/// Decode a list payload; a missing `data` field is an empty list
fn decode_list<T: DeserializeOwned>(data: Value) -> Result<Vec<T>> {
    if data.is_null() {
        return Ok(Vec::new());
    }
    serde_json::from_value(data).map_err(|e| CatalogError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client(base_url: &str) -> CatalogClient {
        let config = ScanConfig {
            base_url: base_url.to_string(),
            api_key: Some("k3y".to_string()),
            lang: "uk".to_string(),
            ..Default::default()
        };
        CatalogClient::new(config).unwrap()
    }

    #[test]
    fn test_endpoint_query() {
        let client = client("https://api.example.com/api/v3/");
        let url = client
            .endpoint("/hotels", "k3y", &[("city_id", "7".to_string())])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/api/v3/hotels?city_id=7&apikey=k3y&lang=uk"
        );
    }

    #[test]
    fn test_decode_list() {
        let empty: Vec<NamedEntity> = decode_list(Value::Null).unwrap();
        assert!(empty.is_empty());

        let items: Vec<NamedEntity> = decode_list(json!([{"id": 1, "name": "Kyiv"}])).unwrap();
        assert_eq!(items[0].name, "Kyiv");

        let bad: Result<Vec<NamedEntity>> = decode_list(json!({"id": 1}));
        assert!(matches!(bad, Err(CatalogError::Decode(_))));
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_before_request() {
        let config = ScanConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            ..Default::default()
        };
        let client = CatalogClient::new(config).unwrap();
        let err = client.hotel_info(1).await.unwrap_err();
        assert_eq!(err, CatalogError::MissingApiKey);
        assert_eq!(client.stats().request_count, 0);
    }
}
