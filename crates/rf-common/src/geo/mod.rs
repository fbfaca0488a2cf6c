pub mod nominatim;

pub use nominatim::NominatimClient;

use std::collections::HashMap;

use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("geocoding request failed: {0}")]
    Request(String),
    #[error("geocoding response malformed: {0}")]
    Malformed(String),
}

/// Address-resolution backend. `Ok(None)` means the service answered but
/// found nothing; `Err` covers transport and decoding failures. Either way
/// the caller records the miss and moves on, the batch never aborts.
pub trait Geocoder {
    fn name(&self) -> &'static str;

    fn geocode(&self, address: &str) -> Result<Option<Coordinates>, GeocodeError>;
}

/// Geocoder that resolves nothing; used for offline runs and tests where
/// the proximity columns should exist but stay empty.
pub struct NullGeocoder;

impl Geocoder for NullGeocoder {
    fn name(&self) -> &'static str {
        "null"
    }

    fn geocode(&self, _address: &str) -> Result<Option<Coordinates>, GeocodeError> {
        Ok(None)
    }
}

/// Great-circle distance in kilometers.
pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    const EARTH_RADIUS_KM: f64 = 6371.0088;

    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// Proximity in (0, 1]: 1 at the reference point, falling off with
/// distance. Negative distances cannot come out of [`haversine_km`] but are
/// clamped to full proximity rather than scoring above 1.
pub fn proximity_score(distance_km: f64) -> f64 {
    if distance_km < 0.0 {
        1.0
    } else {
        1.0 / (distance_km + 1.0)
    }
}

/// Process-lifetime address → coordinates cache.
///
/// Failures are cached as `None` so a failing address is asked of the
/// external service at most once per run.
#[derive(Debug, Default)]
pub struct CoordinateCache {
    entries: HashMap<String, Option<Coordinates>>,
}

impl CoordinateCache {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve an address through the cache. Blank addresses resolve to
    /// `None` without touching the service.
    pub fn resolve(&mut self, geocoder: &dyn Geocoder, address: &str) -> Option<Coordinates> {
        let address = address.trim();
        if address.is_empty() {
            return None;
        }
        if let Some(cached) = self.entries.get(address) {
            return *cached;
        }

        let resolved = match geocoder.geocode(address) {
            Ok(coords) => coords,
            Err(err) => {
                warn!(geocoder = geocoder.name(), error = %err, address, "geocoding failed");
                None
            }
        };
        self.entries.insert(address.to_string(), resolved);
        resolved
    }
}
