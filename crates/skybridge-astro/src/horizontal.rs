//! Equatorial to horizontal coordinates by the hour-angle method.
//!
//! The observation instant is always an explicit argument. The sidereal time
//! uses the low-precision linear model
//! `LST = 100.46 + 0.985647 * d + longitude + 15 * UT`, where `d` counts days
//! (with fraction) since 2000-01-01 and `UT` is the decimal UTC hour. Good to
//! well under a degree for the foreseeable future, which is far below what an
//! open-loop stepper mount can hold.

use chrono::{DateTime, Datelike, Timelike, Utc};
use tracing::trace;

use crate::coords::{EquatorialCoordinate, HorizontalCoordinate};
use crate::error::TransformSingularity;
use crate::site::SiteLocation;

/// `num_days_from_ce` of 2000-01-01.
const J2000_DAYS_FROM_CE: i32 = 730_120;

/// Below this `cos(latitude) * cos(altitude)` the azimuth is undefined.
const SINGULARITY_EPSILON: f64 = 1e-9;

/// Decimal UTC hour of day, whole seconds resolution.
pub fn utc_decimal_hours(instant: &DateTime<Utc>) -> f64 {
    f64::from(instant.hour())
        + f64::from(instant.minute()) / 60.0
        + f64::from(instant.second()) / 3600.0
}

/// Days elapsed since 2000-01-01 00:00 UTC, including the fraction of the
/// current day.
pub fn days_since_j2000(instant: &DateTime<Utc>) -> f64 {
    let whole_days = instant.num_days_from_ce() - J2000_DAYS_FROM_CE;
    f64::from(whole_days) + utc_decimal_hours(instant) / 24.0
}

/// Local sidereal time in degrees, [0, 360).
pub fn local_sidereal_time(instant: &DateTime<Utc>, longitude_degrees: f64) -> f64 {
    let lst = 100.46
        + 0.985_647 * days_since_j2000(instant)
        + longitude_degrees
        + 15.0 * utc_decimal_hours(instant);
    lst.rem_euclid(360.0)
}

/// Hour angle in degrees, [0, 360): how far west of the meridian the target is.
pub fn hour_angle(lst_degrees: f64, right_ascension_hours: f64) -> f64 {
    (lst_degrees - right_ascension_hours * 15.0).rem_euclid(360.0)
}

/// Altitude and azimuth for a target at `hour_angle_degrees` seen from
/// `latitude_radians`.
///
/// The arccosine gives azimuth only up to east/west; a strictly positive
/// `sin(HA)` puts the target west of the meridian, so the azimuth is
/// reflected to `360 - az`. At HA = 0 exactly the value is left as is.
pub fn horizontal_from_hour_angle(
    declination_degrees: f64,
    hour_angle_degrees: f64,
    latitude_radians: f64,
) -> Result<HorizontalCoordinate, TransformSingularity> {
    let dec = declination_degrees.to_radians();
    let ha = hour_angle_degrees.to_radians();
    let lat = latitude_radians;

    let sin_alt = dec.sin() * lat.sin() + dec.cos() * lat.cos() * ha.cos();
    let alt = sin_alt.clamp(-1.0, 1.0).asin();
    let altitude_degrees = alt.to_degrees();

    let denominator = lat.cos() * alt.cos();
    if denominator.abs() < SINGULARITY_EPSILON {
        return Err(TransformSingularity { altitude_degrees });
    }

    let cos_az = (dec.sin() - lat.sin() * alt.sin()) / denominator;
    let mut azimuth_degrees = cos_az.clamp(-1.0, 1.0).acos().to_degrees();
    if ha.sin() > 0.0 {
        azimuth_degrees = 360.0 - azimuth_degrees;
    }

    Ok(HorizontalCoordinate::new(
        azimuth_degrees.rem_euclid(360.0),
        altitude_degrees,
    ))
}

/// Intermediate and final values of one transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Solution {
    pub local_sidereal_degrees: f64,
    pub hour_angle_degrees: f64,
    pub horizontal: Result<HorizontalCoordinate, TransformSingularity>,
}

/// Equatorial to horizontal transform for one observing site.
#[derive(Debug, Clone, Copy, Default)]
pub struct HorizontalTransform {
    site: SiteLocation,
}

impl HorizontalTransform {
    pub fn new(site: SiteLocation) -> Self {
        Self { site }
    }

    pub fn site(&self) -> SiteLocation {
        self.site
    }

    /// Transform `target` as seen at `instant`, keeping the intermediate angles.
    pub fn solve(&self, target: &EquatorialCoordinate, instant: &DateTime<Utc>) -> Solution {
        let lst = local_sidereal_time(instant, self.site.longitude_degrees());
        let ha = hour_angle(lst, target.right_ascension_hours);
        let horizontal = horizontal_from_hour_angle(
            target.declination_degrees,
            ha,
            self.site.latitude_radians(),
        );

        trace!(
            %instant,
            lst,
            hour_angle = ha,
            ?horizontal,
            "solved horizontal position"
        );

        Solution {
            local_sidereal_degrees: lst,
            hour_angle_degrees: ha,
            horizontal,
        }
    }

    /// Transform `target` as seen at `instant`.
    pub fn apply(
        &self,
        target: &EquatorialCoordinate,
        instant: &DateTime<Utc>,
    ) -> Result<HorizontalCoordinate, TransformSingularity> {
        self.solve(target, instant).horizontal
    }
}
