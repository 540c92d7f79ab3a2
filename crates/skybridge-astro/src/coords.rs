use serde::Serialize;

use crate::angle::{
    decode_declination, decode_right_ascension, encode_declination, encode_right_ascension,
};
use crate::error::{AstroError, Result};

/// Sky position fixed to the celestial sphere.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EquatorialCoordinate {
    /// Right ascension in hours, [0, 24).
    pub right_ascension_hours: f64,
    /// Declination in degrees, [-90, 90].
    pub declination_degrees: f64,
}

impl EquatorialCoordinate {
    pub fn new(right_ascension_hours: f64, declination_degrees: f64) -> Self {
        Self {
            right_ascension_hours,
            declination_degrees,
        }
    }

    /// Build from the raw wire fields of a position frame.
    pub fn from_wire(ra: u32, dec: i32) -> Self {
        Self::new(decode_right_ascension(ra), decode_declination(dec))
    }

    /// Raw wire fields `(ra, dec)` for this coordinate.
    pub fn to_wire(&self) -> (u32, i32) {
        (
            encode_right_ascension(self.right_ascension_hours),
            encode_declination(self.declination_degrees),
        )
    }

    /// Right ascension expressed in degrees.
    pub fn right_ascension_degrees(&self) -> f64 {
        self.right_ascension_hours * 15.0
    }

    /// Reject coordinates outside their physical range.
    ///
    /// The declination encoding can carry up to ±180°, so a client bug shows
    /// up here rather than as a silently wrapped pointing.
    pub fn validate(self) -> Result<Self> {
        let ra_ok = self.right_ascension_hours.is_finite()
            && (0.0..24.0).contains(&self.right_ascension_hours);
        let dec_ok = self.declination_degrees.is_finite()
            && (-90.0..=90.0).contains(&self.declination_degrees);

        if ra_ok && dec_ok {
            Ok(self)
        } else {
            Err(AstroError::OutOfDomain {
                ra_hours: self.right_ascension_hours,
                dec_degrees: self.declination_degrees,
            })
        }
    }
}

/// Sky position relative to an observer at an instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HorizontalCoordinate {
    /// Azimuth in degrees, measured from north through east, [0, 360).
    pub azimuth_degrees: f64,
    /// Altitude above the horizon in degrees, [-90, 90].
    pub altitude_degrees: f64,
}

impl HorizontalCoordinate {
    pub fn new(azimuth_degrees: f64, altitude_degrees: f64) -> Self {
        Self {
            azimuth_degrees,
            altitude_degrees,
        }
    }
}
