use std::time::Duration;

use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::{Coordinates, GeocodeError, Geocoder};

const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";
const USER_AGENT: &str = concat!("rf-pipeline/", env!("CARGO_PKG_VERSION"));

/// OSM Nominatim client with the service's usage policy baked in: one
/// request at a time, a pause after every uncached call (slightly over a
/// second on success, shorter when nothing was found), 10 s per-call
/// timeout. The pause blocks the whole batch; that is acceptable because
/// the caller caches every answer, including misses.
pub struct NominatimClient {
    http: reqwest::blocking::Client,
    base_url: String,
    success_delay: Duration,
    failure_delay: Duration,
}

#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
}

impl NominatimClient {
    pub fn new() -> Result<Self, GeocodeError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self, GeocodeError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| GeocodeError::Request(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            success_delay: Duration::from_millis(1100),
            failure_delay: Duration::from_millis(500),
        })
    }

    fn search_url(&self, address: &str) -> Result<Url, GeocodeError> {
        let mut url = Url::parse(&format!("{}/search", self.base_url))
            .map_err(|e| GeocodeError::Request(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("q", address)
            .append_pair("format", "json")
            .append_pair("limit", "1");
        Ok(url)
    }

    fn throttle(&self, found: bool) {
        let delay = if found {
            self.success_delay
        } else {
            self.failure_delay
        };
        std::thread::sleep(delay);
    }
}

impl Geocoder for NominatimClient {
    fn name(&self) -> &'static str {
        "nominatim"
    }

    fn geocode(&self, address: &str) -> Result<Option<Coordinates>, GeocodeError> {
        let url = self.search_url(address)?;
        let response = self
            .http
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                self.throttle(false);
                GeocodeError::Request(e.to_string())
            })?;
        let places: Vec<Place> = response.json().map_err(|e| {
            self.throttle(false);
            GeocodeError::Malformed(e.to_string())
        })?;

        let coords = places.first().map(parse_place).transpose()?;
        debug!(address, found = coords.is_some(), "nominatim lookup");
        self.throttle(coords.is_some());
        Ok(coords)
    }
}

fn parse_place(place: &Place) -> Result<Coordinates, GeocodeError> {
    let lat = place
        .lat
        .parse::<f64>()
        .map_err(|_| GeocodeError::Malformed(format!("lat: {}", place.lat)))?;
    let lon = place
        .lon
        .parse::<f64>()
        .map_err(|_| GeocodeError::Malformed(format!("lon: {}", place.lon)))?;
    Ok(Coordinates { lat, lon })
}
