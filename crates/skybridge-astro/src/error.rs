/// Errors raised while interpreting or transforming coordinates.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AstroError {
    /// A decoded coordinate lies outside its physical range.
    #[error("coordinate out of range: ra {ra_hours}h, dec {dec_degrees}°")]
    OutOfDomain { ra_hours: f64, dec_degrees: f64 },

    /// Text could not be read as an angle.
    #[error("cannot parse angle {input:?}: {reason}")]
    ParseAngle { input: String, reason: &'static str },

    /// Observer latitude outside [-90, 90] degrees.
    #[error("latitude {0}° outside [-90, 90]")]
    InvalidLatitude(f64),

    /// Observer longitude outside [-180, 180] degrees.
    #[error("longitude {0}° outside [-180, 180]")]
    InvalidLongitude(f64),
}

pub type Result<T> = std::result::Result<T, AstroError>;

/// Azimuth has no defined value for this geometry.
///
/// Happens when `cos(latitude) * cos(altitude)` vanishes: the target sits at
/// the zenith or nadir, or the observer stands on a pole. Altitude is still
/// well defined and is carried along so callers can pick a fallback azimuth.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("azimuth undefined at altitude {altitude_degrees:.6}° (zenith, nadir or polar observer)")]
pub struct TransformSingularity {
    pub altitude_degrees: f64,
}
