//! Human-readable sexagesimal angles.
//!
//! Rendering is for logs and CLI output only. Carry-over from rounding
//! (59.96s → next minute, 60m → next hour/degree) is applied so a value never
//! prints as `…m60s`.

use crate::error::{AstroError, Result};

/// Render hours as `HhMmS.Ss`, e.g. `6h30m0.0s`.
///
/// Input is reduced into [0, 24) first.
pub fn hours_to_sexagesimal(hours: f64) -> String {
    let hours = hours.rem_euclid(24.0);
    let mut h = hours.floor() as u32;
    let minutes = (hours - f64::from(h)) * 60.0;
    let mut m = minutes.floor() as u32;
    let mut s = ((minutes - f64::from(m)) * 600.0).round() / 10.0;

    if s >= 60.0 {
        s = 0.0;
        m += 1;
    }
    if m >= 60 {
        m = 0;
        h += 1;
    }
    if h >= 24 {
        h = 0;
    }

    format!("{h}h{m}m{s:.1}s")
}

/// Render degrees as `D°M'S''`, e.g. `-45°30'0''`.
///
/// The sign belongs to the degree component only, so `-0.5` renders as
/// `-0°30'0''`.
pub fn degrees_to_sexagesimal(degrees: f64) -> String {
    let negative = degrees < 0.0;
    let magnitude = degrees.abs();

    let mut d = magnitude.floor() as u32;
    let minutes = (magnitude - f64::from(d)) * 60.0;
    let mut m = minutes.floor() as u32;
    let mut s = ((minutes - f64::from(m)) * 60.0).round() as u32;

    if s >= 60 {
        s = 0;
        m += 1;
    }
    if m >= 60 {
        m = 0;
        d += 1;
    }

    let sign = if negative && (d, m, s) != (0, 0, 0) {
        "-"
    } else {
        ""
    };
    format!("{sign}{d}°{m}'{s}''")
}

/// Parse a right ascension in hours.
///
/// Accepts decimal hours (`6.5`) or up to three components separated by unit
/// markers or colons (`6h30m`, `6:30:00`, `6h30m0.0s`).
pub fn parse_hours(input: &str) -> Result<f64> {
    parse_components(input, &['h', 'm', 's', ':'])
}

/// Parse an angle in degrees.
///
/// Accepts decimal degrees (`-45.5`) or up to three components
/// (`-45°30'0''`, `-45d30m`, `-45:30:00`).
pub fn parse_degrees(input: &str) -> Result<f64> {
    parse_components(input, &['°', 'd', 'm', 's', '\'', '"', ':'])
}

fn parse_components(input: &str, markers: &[char]) -> Result<f64> {
    let fail = |reason| AstroError::ParseAngle {
        input: input.to_string(),
        reason,
    };

    let trimmed = input.trim();
    let (negative, body) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    if body.is_empty() {
        return Err(fail("empty value"));
    }
    if let Some(bad) = body
        .chars()
        .find(|c| !(c.is_ascii_digit() || *c == '.' || c.is_whitespace() || markers.contains(c)))
    {
        return Err(fail(if bad == '-' {
            "sign allowed only in front"
        } else {
            "unexpected character"
        }));
    }

    let parts = body
        .split(|c: char| markers.contains(&c) || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<f64>().map_err(|_| fail("invalid number")))
        .collect::<Result<Vec<f64>>>()?;

    if parts.is_empty() {
        return Err(fail("no digits"));
    }
    if parts.len() > 3 {
        return Err(fail("more than three components"));
    }
    if parts.iter().skip(1).any(|value| *value >= 60.0) {
        return Err(fail("minutes and seconds must be below 60"));
    }

    let magnitude = parts
        .iter()
        .zip([1.0, 60.0, 3600.0])
        .map(|(value, divisor)| value / divisor)
        .sum::<f64>();

    Ok(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_whole_hours() {
        assert_eq!(hours_to_sexagesimal(6.0), "6h0m0.0s");
        assert_eq!(hours_to_sexagesimal(6.5), "6h30m0.0s");
        assert_eq!(hours_to_sexagesimal(0.0), "0h0m0.0s");
    }

    #[test]
    fn renders_fractional_seconds() {
        // 1h 2m 3.4s
        let hours = 1.0 + 2.0 / 60.0 + 3.4 / 3600.0;
        assert_eq!(hours_to_sexagesimal(hours), "1h2m3.4s");
    }

    #[test]
    fn hour_seconds_carry_into_minutes_and_hours() {
        // 5h 59m 59.97s rounds to 60.0s
        let hours = 5.0 + 59.0 / 60.0 + 59.97 / 3600.0;
        assert_eq!(hours_to_sexagesimal(hours), "6h0m0.0s");
    }

    #[test]
    fn hours_wrap_past_midnight() {
        let hours = 23.0 + 59.0 / 60.0 + 59.99 / 3600.0;
        assert_eq!(hours_to_sexagesimal(hours), "0h0m0.0s");
        assert_eq!(hours_to_sexagesimal(-1.0), "23h0m0.0s");
    }

    #[test]
    fn renders_degrees() {
        assert_eq!(degrees_to_sexagesimal(45.0), "45°0'0''");
        assert_eq!(degrees_to_sexagesimal(12.5), "12°30'0''");
        assert_eq!(degrees_to_sexagesimal(-45.5), "-45°30'0''");
    }

    #[test]
    fn negative_sign_stays_on_degree_component() {
        assert_eq!(degrees_to_sexagesimal(-0.5), "-0°30'0''");
        assert_eq!(degrees_to_sexagesimal(-1e-9), "0°0'0''");
    }

    #[test]
    fn degree_seconds_carry_into_minutes_and_degrees() {
        // 10° 59' 59.6'' rounds to 60''
        let degrees = 10.0 + 59.0 / 60.0 + 59.6 / 3600.0;
        assert_eq!(degrees_to_sexagesimal(degrees), "11°0'0''");
        assert_eq!(degrees_to_sexagesimal(-degrees), "-11°0'0''");

        // 20° 14' 59.7'' rounds to 20° 15' 0''
        let degrees = 20.0 + 14.0 / 60.0 + 59.7 / 3600.0;
        assert_eq!(degrees_to_sexagesimal(degrees), "20°15'0''");
    }

    #[test]
    fn parses_decimal_and_component_forms() {
        assert_eq!(parse_hours("6.5").unwrap(), 6.5);
        assert_eq!(parse_hours("6h30m").unwrap(), 6.5);
        assert_eq!(parse_hours("6:30:00").unwrap(), 6.5);
        let expected = 1.0 + 2.0 / 60.0 + 3.4 / 3600.0;
        assert!((parse_hours("1h2m3.4s").unwrap() - expected).abs() < 1e-12);

        assert_eq!(parse_degrees("-45.5").unwrap(), -45.5);
        assert_eq!(parse_degrees("-45°30'0''").unwrap(), -45.5);
        assert_eq!(parse_degrees("+45d30m").unwrap(), 45.5);
        assert_eq!(parse_degrees(" 45 30 ").unwrap(), 45.5);
    }

    #[test]
    fn rendered_values_parse_back() {
        for hours in [0.0, 6.25, 13.75, 23.5] {
            assert!((parse_hours(&hours_to_sexagesimal(hours)).unwrap() - hours).abs() < 1e-4);
        }
        for degrees in [-89.5, -0.5, 0.0, 45.25] {
            let parsed = parse_degrees(&degrees_to_sexagesimal(degrees)).unwrap();
            assert!((parsed - degrees).abs() < 1e-3);
        }
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(parse_hours(""), Err(AstroError::ParseAngle { .. })));
        assert!(parse_hours("six").is_err());
        assert!(parse_hours("6h-30m").is_err());
        assert!(parse_degrees("1:2:3:4").is_err());
        assert!(parse_degrees("45°75'").is_err());
        assert!(parse_degrees("4.5.6").is_err());
    }
}
