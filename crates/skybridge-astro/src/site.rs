use crate::error::{AstroError, Result};

/// Geodetic position of the observer.
///
/// Fixed at startup and passed by value into the transform; never mutated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SiteLocation {
    latitude_radians: f64,
    longitude_radians: f64,
}

impl SiteLocation {
    /// Latitude of the original mount deployment.
    pub const DEFAULT_LATITUDE_RADIANS: f64 = -0.269_909_915_379_874_6;
    /// Longitude of the original mount deployment (east positive).
    pub const DEFAULT_LONGITUDE_RADIANS: f64 = -0.829_986_089_798_147_4;

    /// Build from radians without validation.
    pub const fn from_radians(latitude_radians: f64, longitude_radians: f64) -> Self {
        Self {
            latitude_radians,
            longitude_radians,
        }
    }

    /// Build from degrees, rejecting values outside the geodetic range.
    pub fn from_degrees(latitude_degrees: f64, longitude_degrees: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&latitude_degrees) {
            return Err(AstroError::InvalidLatitude(latitude_degrees));
        }
        if !(-180.0..=180.0).contains(&longitude_degrees) {
            return Err(AstroError::InvalidLongitude(longitude_degrees));
        }
        Ok(Self::from_radians(
            latitude_degrees.to_radians(),
            longitude_degrees.to_radians(),
        ))
    }

    pub fn latitude_radians(&self) -> f64 {
        self.latitude_radians
    }

    pub fn longitude_radians(&self) -> f64 {
        self.longitude_radians
    }

    pub fn latitude_degrees(&self) -> f64 {
        self.latitude_radians.to_degrees()
    }

    pub fn longitude_degrees(&self) -> f64 {
        self.longitude_radians.to_degrees()
    }
}

impl Default for SiteLocation {
    fn default() -> Self {
        Self::from_radians(
            Self::DEFAULT_LATITUDE_RADIANS,
            Self::DEFAULT_LONGITUDE_RADIANS,
        )
    }
}
