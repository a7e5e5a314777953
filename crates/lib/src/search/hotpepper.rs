//! Hot Pepper Gourmet search client (GET /hotpepper/gourmet/v1/).

use crate::config::{mask_secret, SearchConfig};
use crate::search::truncate_chars;
use serde::Deserialize;

const GOURMET_SEARCH_PATH: &str = "/hotpepper/gourmet/v1/";

/// Addresses longer than this many code points are cut.
pub const ADDRESS_MAX_CHARS: usize = 60;

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("search api key not configured")]
    MissingKey,
    #[error("search request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("search api returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("search api error: {0}")]
    Upstream(String),
    #[error("reading search response failed: {0}")]
    Body(#[source] reqwest::Error),
    #[error("decoding search response failed: {0}")]
    Decode(#[from] serde_json::Error),
}

/// One restaurant from the search result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shop {
    pub name: String,
    /// At most [`ADDRESS_MAX_CHARS`] code points.
    pub address: String,
    pub photo_url: Option<String>,
    pub url: Option<String>,
}

/// Coordinates already formatted with the configured precision, plus radius and count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub lat: String,
    pub lng: String,
    pub range: u8,
    pub count: u32,
}

/// Format a coordinate with a fixed number of decimal places.
pub fn format_coordinate(value: f64, precision: usize) -> String {
    format!("{:.*}", precision, value)
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: SearchResults,
}

#[derive(Debug, Deserialize)]
struct SearchResults {
    #[serde(default)]
    shop: Vec<WireShop>,
    #[serde(default)]
    error: Vec<WireApiError>,
}

#[derive(Debug, Deserialize)]
struct WireApiError {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct WireShop {
    #[serde(default)]
    name: String,
    #[serde(default)]
    address: String,
    #[serde(default)]
    photo: Option<WirePhoto>,
    #[serde(default)]
    urls: Option<WireUrls>,
}

#[derive(Debug, Deserialize)]
struct WirePhoto {
    #[serde(default)]
    mobile: Option<WirePhotoSizes>,
}

#[derive(Debug, Deserialize)]
struct WirePhotoSizes {
    #[serde(default)]
    l: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireUrls {
    #[serde(default)]
    pc: Option<String>,
}

impl From<WireShop> for Shop {
    fn from(w: WireShop) -> Self {
        Shop {
            name: w.name,
            address: truncate_chars(&w.address, ADDRESS_MAX_CHARS),
            photo_url: w
                .photo
                .and_then(|p| p.mobile)
                .and_then(|m| m.l)
                .filter(|s| !s.is_empty()),
            url: w.urls.and_then(|u| u.pc).filter(|s| !s.is_empty()),
        }
    }
}

/// Decode a response body into shops. An `error` list in the results is an upstream failure.
fn decode_shops(body: &[u8]) -> Result<Vec<Shop>, SearchError> {
    let data: SearchResponse = serde_json::from_slice(body)?;
    if let Some(err) = data.results.error.first() {
        let code = err.code.map(|c| c.to_string()).unwrap_or_default();
        return Err(SearchError::Upstream(format!("{} {}", code, err.message).trim().to_string()));
    }
    Ok(data.results.shop.into_iter().map(Shop::from).collect())
}

/// Client for the gourmet search endpoint.
#[derive(Clone)]
pub struct HotPepperClient {
    base_url: String,
    api_key: Option<String>,
    range: u8,
    count: u32,
    precision: usize,
    client: reqwest::Client,
}

impl HotPepperClient {
    /// `client` should carry the request timeout; see `gateway::build_http_client`.
    pub fn new(config: &SearchConfig, client: reqwest::Client) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            range: config.range,
            count: config.count,
            precision: config.coordinate_precision,
            client,
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Build the query for a location using the configured precision, range and count.
    pub fn query(&self, latitude: f64, longitude: f64) -> SearchQuery {
        SearchQuery {
            lat: format_coordinate(latitude, self.precision),
            lng: format_coordinate(longitude, self.precision),
            range: self.range,
            count: self.count,
        }
    }

    /// Single GET, no retries. Returns the shops in provider order (possibly empty).
    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<Shop>, SearchError> {
        let key = self.api_key.as_deref().ok_or(SearchError::MissingKey)?;
        let url = format!("{}{}", self.base_url, GOURMET_SEARCH_PATH);
        log::info!(
            "requesting gourmet search: {}?format=json&key={}&lat={}&lng={}&range={}&count={}",
            url,
            mask_secret(key),
            query.lat,
            query.lng,
            query.range,
            query.count
        );
        let range = query.range.to_string();
        let count = query.count.to_string();
        let res = self
            .client
            .get(&url)
            .query(&[
                ("format", "json"),
                ("key", key),
                ("lat", query.lat.as_str()),
                ("lng", query.lng.as_str()),
                ("range", range.as_str()),
                ("count", count.as_str()),
            ])
            .send()
            .await
            .map_err(SearchError::Request)?;
        if !res.status().is_success() {
            return Err(SearchError::Status(res.status()));
        }
        let body = res.bytes().await.map_err(SearchError::Body)?;
        log::debug!("gourmet search response: {} bytes", body.len());
        decode_shops(&body)
    }
}
