use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use skybridge_astro::{
    degrees_to_sexagesimal, hours_to_sexagesimal, parse_degrees, parse_hours,
    EquatorialCoordinate, HorizontalTransform,
};

use crate::cmd::ConvertArgs;
use crate::config::SiteSection;
use crate::exit::{astro_error, config_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_report, OutputFormat, Report};

#[derive(Debug, Serialize)]
struct ConversionReport {
    time: String,
    latitude_degrees: f64,
    longitude_degrees: f64,
    ra_hours: f64,
    dec_degrees: f64,
    ra_hms: String,
    dec_dms: String,
    wire_ra: u32,
    wire_dec: i32,
    local_sidereal_degrees: f64,
    hour_angle_degrees: f64,
    /// Absent when the target is at the zenith or nadir.
    azimuth_degrees: Option<f64>,
    altitude_degrees: f64,
}

impl Report for ConversionReport {
    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("time", self.time.clone()),
            (
                "site",
                format!("{:.6}, {:.6}", self.latitude_degrees, self.longitude_degrees),
            ),
            ("ra", format!("{} ({:.6}h)", self.ra_hms, self.ra_hours)),
            ("dec", format!("{} ({:.6}°)", self.dec_dms, self.dec_degrees)),
            ("lst", format!("{:.6}°", self.local_sidereal_degrees)),
            ("hour_angle", format!("{:.6}°", self.hour_angle_degrees)),
            (
                "azimuth",
                self.azimuth_degrees
                    .map(|az| format!("{az:.6}°"))
                    .unwrap_or_else(|| "undefined".to_string()),
            ),
            ("altitude", format!("{:.6}°", self.altitude_degrees)),
        ]
    }
}

pub fn run(args: ConvertArgs, format: OutputFormat) -> CliResult<i32> {
    let target = parse_target(&args.ra, &args.dec)?;
    let instant = match &args.time {
        Some(text) => parse_instant(text)?,
        None => Utc::now(),
    };
    let site = SiteSection {
        latitude_degrees: args.latitude,
        longitude_degrees: args.longitude,
    }
    .resolve()
    .map_err(config_error)?;

    let solution = HorizontalTransform::new(site).solve(&target, &instant);
    let (azimuth_degrees, altitude_degrees) = match solution.horizontal {
        Ok(horizontal) => (Some(horizontal.azimuth_degrees), horizontal.altitude_degrees),
        Err(singularity) => (None, singularity.altitude_degrees),
    };
    let (wire_ra, wire_dec) = target.to_wire();

    let report = ConversionReport {
        time: instant.to_rfc3339_opts(SecondsFormat::Secs, true),
        latitude_degrees: site.latitude_degrees(),
        longitude_degrees: site.longitude_degrees(),
        ra_hours: target.right_ascension_hours,
        dec_degrees: target.declination_degrees,
        ra_hms: hours_to_sexagesimal(target.right_ascension_hours),
        dec_dms: degrees_to_sexagesimal(target.declination_degrees),
        wire_ra,
        wire_dec,
        local_sidereal_degrees: solution.local_sidereal_degrees,
        hour_angle_degrees: solution.hour_angle_degrees,
        azimuth_degrees,
        altitude_degrees,
    };
    print_report(&report, format);

    Ok(SUCCESS)
}

/// Parse and range-check a target given on the command line.
pub(crate) fn parse_target(ra: &str, dec: &str) -> CliResult<EquatorialCoordinate> {
    let ra_hours = parse_hours(ra).map_err(|err| astro_error("--ra", err))?;
    let dec_degrees = parse_degrees(dec).map_err(|err| astro_error("--dec", err))?;
    EquatorialCoordinate::new(ra_hours, dec_degrees)
        .validate()
        .map_err(|err| astro_error("target", err))
}

fn parse_instant(text: &str) -> CliResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|instant| instant.with_timezone(&Utc))
        .map_err(|err| CliError::new(USAGE, format!("--time {text:?} is not RFC 3339: {err}")))
}
