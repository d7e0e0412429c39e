//! Geolocation values for content records and location searches

use serde::{Deserialize, Serialize};

/// A latitude/longitude pair
///
/// Latitude is expected in `[-90, 90]` and longitude in `[-180, 180]`;
/// out-of-range values are not rejected and are forwarded to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    latitude: f64,
    longitude: f64,
}

impl GeoLocation {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn set_latitude(&mut self, latitude: f64) {
        self.latitude = latitude;
    }

    pub fn set_longitude(&mut self, longitude: f64) {
        self.longitude = longitude;
    }

    /// `"lat,lon"` as stored in the combined location field
    pub fn to_pair_string(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }
}
