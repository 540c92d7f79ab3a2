//! Angles and the equatorial-to-horizontal transform.
//!
//! - [`angle`]: wire fixed-point units to hours/degrees and back
//! - [`sexagesimal`]: `6h30m0.0s` / `-45°30'0''` rendering and parsing
//! - [`site`]: the observer's location
//! - [`horizontal`]: sidereal time, hour angle, azimuth/altitude

pub mod angle;
pub mod coords;
pub mod error;
pub mod horizontal;
pub mod sexagesimal;
pub mod site;

pub use angle::{
    decode_declination, decode_right_ascension, encode_declination, encode_right_ascension,
};
pub use coords::{EquatorialCoordinate, HorizontalCoordinate};
pub use error::{AstroError, Result, TransformSingularity};
pub use horizontal::{
    horizontal_from_hour_angle, hour_angle, local_sidereal_time, HorizontalTransform, Solution,
};
pub use sexagesimal::{degrees_to_sexagesimal, hours_to_sexagesimal, parse_degrees, parse_hours};
pub use site::SiteLocation;
