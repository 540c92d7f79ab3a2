//! Fixed-point angle encodings used on the wire.
//!
//! Right ascension spans the whole u32 range for one full day (24 hours).
//! Declination uses 2^30 units per 90 degrees, so the i32 range could express
//! ±180°; anything past ±90° is rejected one level up, not here.

/// Wire units per hour of right ascension (2^32 / 24).
pub const RA_UNITS_PER_HOUR: f64 = 4_294_967_296.0 / 24.0;

/// Wire units per degree of declination (2^30 / 90).
pub const DEC_UNITS_PER_DEGREE: f64 = 1_073_741_824.0 / 90.0;

/// Smallest representable step of right ascension, in hours.
pub const RA_QUANTUM_HOURS: f64 = 1.0 / RA_UNITS_PER_HOUR;

/// Smallest representable step of declination, in degrees.
pub const DEC_QUANTUM_DEGREES: f64 = 1.0 / DEC_UNITS_PER_DEGREE;

const FULL_CIRCLE_UNITS: u64 = 1 << 32;

/// Wire right ascension to hours in [0, 24).
pub fn decode_right_ascension(raw: u32) -> f64 {
    f64::from(raw) / RA_UNITS_PER_HOUR
}

/// Wire declination to degrees.
pub fn decode_declination(raw: i32) -> f64 {
    f64::from(raw) / DEC_UNITS_PER_DEGREE
}

/// Hours to wire right ascension, rounding to the nearest unit.
///
/// Hours are reduced into [0, 24) first; a value that rounds up to a full
/// day wraps to zero.
pub fn encode_right_ascension(hours: f64) -> u32 {
    let units = (hours.rem_euclid(24.0) * RA_UNITS_PER_HOUR).round() as u64;
    (units % FULL_CIRCLE_UNITS) as u32
}

/// Degrees to wire declination, rounding to the nearest unit.
///
/// Saturates at the i32 range.
pub fn encode_declination(degrees: f64) -> i32 {
    (degrees * DEC_UNITS_PER_DEGREE).round() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_reference_values() {
        assert_eq!(decode_right_ascension(1_073_741_824), 6.0);
        assert_eq!(decode_right_ascension(0), 0.0);
        assert_eq!(decode_declination(536_870_912), 45.0);
        assert_eq!(decode_declination(-1_073_741_824), -90.0);
        assert_eq!(decode_declination(1_073_741_824), 90.0);
    }

    #[test]
    fn encodes_reference_values() {
        assert_eq!(encode_right_ascension(6.0), 1_073_741_824);
        assert_eq!(encode_right_ascension(12.0), 2_147_483_648);
        assert_eq!(encode_declination(45.0), 536_870_912);
        assert_eq!(encode_declination(-90.0), -1_073_741_824);
    }

    #[test]
    fn right_ascension_roundtrip_within_one_quantum() {
        let mut hours = 0.0;
        while hours < 24.0 {
            let back = decode_right_ascension(encode_right_ascension(hours));
            assert!(
                (back - hours).abs() <= RA_QUANTUM_HOURS,
                "{hours}h came back as {back}h"
            );
            hours += 0.173_205;
        }
    }

    #[test]
    fn declination_roundtrip_within_one_quantum() {
        let mut degrees = -90.0;
        while degrees <= 90.0 {
            let back = decode_declination(encode_declination(degrees));
            assert!(
                (back - degrees).abs() <= DEC_QUANTUM_DEGREES,
                "{degrees}° came back as {back}°"
            );
            degrees += 0.707_106;
        }
    }

    #[test]
    fn right_ascension_wraps_at_full_day() {
        assert_eq!(encode_right_ascension(24.0), 0);
        assert_eq!(encode_right_ascension(24.0 - RA_QUANTUM_HOURS / 4.0), 0);
        assert_eq!(encode_right_ascension(-6.0), encode_right_ascension(18.0));
        assert_eq!(encode_right_ascension(30.0), encode_right_ascension(6.0));
    }

    #[test]
    fn declination_saturates() {
        assert_eq!(encode_declination(1e9), i32::MAX);
        assert_eq!(encode_declination(-1e9), i32::MIN);
    }

    #[test]
    fn raw_declination_can_exceed_ninety() {
        assert!(decode_declination(i32::MAX) > 179.0);
        assert!(decode_declination(i32::MIN) <= -180.0);
    }
}
