use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::DriverFault;

/// Which of the two mount axes a driver moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Azimuth,
    Altitude,
}

impl Axis {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Azimuth => "azimuth",
            Self::Altitude => "altitude",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coil sequencing of a four-wire stepper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StepModeRepr", into = "u8")]
pub enum StepMode {
    /// One coil energised at a time.
    Wave,
    /// Two coils energised at a time.
    Full,
    /// Alternating one and two coils; doubles the step count per turn.
    Half,
}

impl StepMode {
    /// Steps taken per full step of the motor.
    pub fn microsteps(&self) -> u32 {
        match self {
            Self::Wave | Self::Full => 1,
            Self::Half => 2,
        }
    }

    /// Numeric mode index used by stepper driver boards (1 = wave, 2 = full, 3 = half).
    pub fn index(&self) -> u8 {
        match self {
            Self::Wave => 1,
            Self::Full => 2,
            Self::Half => 3,
        }
    }

    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            1 => Some(Self::Wave),
            2 => Some(Self::Full),
            3 => Some(Self::Half),
            _ => None,
        }
    }
}

impl FromStr for StepMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "wave" | "1" => Ok(Self::Wave),
            "full" | "2" => Ok(Self::Full),
            "half" | "3" => Ok(Self::Half),
            other => Err(format!(
                "unknown step mode {other:?} (expected wave, full, half or 1-3)"
            )),
        }
    }
}

impl From<StepMode> for u8 {
    fn from(mode: StepMode) -> Self {
        mode.index()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StepModeRepr {
    Index(u8),
    Name(String),
}

impl TryFrom<StepModeRepr> for StepMode {
    type Error = String;

    fn try_from(repr: StepModeRepr) -> Result<Self, Self::Error> {
        match repr {
            StepModeRepr::Index(index) => {
                Self::from_index(index).ok_or_else(|| format!("step mode index {index} not in 1-3"))
            }
            StepModeRepr::Name(name) => name.parse(),
        }
    }
}

/// Fixed actuation parameters of one axis, set once at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AxisConfig {
    /// Full steps per output revolution, gearing included.
    pub steps_per_revolution: u32,
    /// Rotation speed in revolutions per minute.
    pub rpm: f64,
    pub step_mode: StepMode,
    /// Driver board input pins, in coil order.
    pub pins: [u8; 4],
}

impl AxisConfig {
    pub const DEFAULT_STEPS_PER_REVOLUTION: u32 = 2048;
    pub const DEFAULT_RPM: f64 = 5.0;

    /// Azimuth defaults of the reference mount.
    pub fn azimuth() -> Self {
        Self {
            steps_per_revolution: Self::DEFAULT_STEPS_PER_REVOLUTION,
            rpm: Self::DEFAULT_RPM,
            step_mode: StepMode::Full,
            pins: [31, 33, 35, 37],
        }
    }

    /// Altitude defaults of the reference mount.
    pub fn altitude() -> Self {
        Self {
            step_mode: StepMode::Half,
            pins: [32, 36, 38, 40],
            ..Self::azimuth()
        }
    }

    /// Defaults for `axis`.
    pub fn for_axis(axis: Axis) -> Self {
        match axis {
            Axis::Azimuth => Self::azimuth(),
            Axis::Altitude => Self::altitude(),
        }
    }

    pub fn validate(&self) -> Result<(), DriverFault> {
        if self.steps_per_revolution == 0 {
            return Err(DriverFault::InvalidConfig(
                "steps_per_revolution must be positive".to_string(),
            ));
        }
        if !(self.rpm.is_finite() && self.rpm > 0.0) {
            return Err(DriverFault::InvalidConfig(format!(
                "rpm must be positive, got {}",
                self.rpm
            )));
        }
        if self.checked_step_interval().is_none() {
            return Err(DriverFault::InvalidConfig(format!(
                "rpm {} is too slow to time a single step",
                self.rpm
            )));
        }
        let mut pins = self.pins;
        pins.sort_unstable();
        if pins.windows(2).any(|pair| pair[0] == pair[1]) {
            return Err(DriverFault::InvalidConfig(format!(
                "pins must be distinct, got {:?}",
                self.pins
            )));
        }
        Ok(())
    }

    /// Motor steps per output degree in the configured step mode.
    pub fn steps_per_degree(&self) -> f64 {
        f64::from(self.steps_per_revolution) * f64::from(self.step_mode.microsteps()) / 360.0
    }

    /// Signed whole steps for a relative rotation.
    pub fn steps_for(&self, delta_degrees: f64) -> i64 {
        (delta_degrees * self.steps_per_degree()).round() as i64
    }

    /// Time between two steps at the configured speed.
    ///
    /// Saturates at `Duration::MAX` for speeds `validate` would reject.
    pub fn step_interval(&self) -> Duration {
        self.checked_step_interval().unwrap_or(Duration::MAX)
    }

    fn checked_step_interval(&self) -> Option<Duration> {
        let steps_per_minute = self.rpm
            * f64::from(self.steps_per_revolution)
            * f64::from(self.step_mode.microsteps());
        Duration::try_from_secs_f64(60.0 / steps_per_minute).ok()
    }
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self::azimuth()
    }
}

/// Acknowledgement of an accepted move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveAck {
    /// Signed step count issued to the actuator.
    pub steps: i64,
    /// Expected duration of the move at the configured speed.
    pub estimated: Duration,
}

impl MoveAck {
    pub fn for_steps(config: &AxisConfig, steps: i64) -> Self {
        let count = u32::try_from(steps.unsigned_abs()).unwrap_or(u32::MAX);
        Self {
            steps,
            estimated: config
                .step_interval()
                .checked_mul(count)
                .unwrap_or(Duration::MAX),
        }
    }
}

/// Relative-move actuator behind one mount axis.
///
/// Implementations are long-lived: configured once at startup and reused by
/// every connection. `move_by_degrees` may block until the actuator has
/// accepted the command, but need not wait for the motion to finish.
pub trait AxisDriver {
    /// Apply the fixed actuation parameters. Called once, before any move.
    fn configure(&mut self, config: &AxisConfig) -> Result<(), DriverFault>;

    /// Rotate by `delta_degrees` relative to the current position.
    fn move_by_degrees(&mut self, delta_degrees: f64) -> Result<MoveAck, DriverFault>;
}

impl<D: AxisDriver + ?Sized> AxisDriver for Box<D> {
    fn configure(&mut self, config: &AxisConfig) -> Result<(), DriverFault> {
        (**self).configure(config)
    }

    fn move_by_degrees(&mut self, delta_degrees: f64) -> Result<MoveAck, DriverFault> {
        (**self).move_by_degrees(delta_degrees)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_defaults() {
        let az = AxisConfig::azimuth();
        let alt = AxisConfig::altitude();
        assert_eq!(az.step_mode.index(), 2);
        assert_eq!(alt.step_mode.index(), 3);
        assert_eq!(az.pins, [31, 33, 35, 37]);
        assert_eq!(alt.pins, [32, 36, 38, 40]);
        assert_eq!(az.rpm, 5.0);
        assert!(az.validate().is_ok());
        assert!(alt.validate().is_ok());
    }

    #[test]
    fn steps_follow_mode() {
        let az = AxisConfig::azimuth();
        assert_eq!(az.steps_for(360.0), 2048);
        assert_eq!(az.steps_for(-90.0), -512);

        let alt = AxisConfig::altitude();
        assert_eq!(alt.steps_for(360.0), 4096);
        assert_eq!(alt.steps_for(0.01), 0);
    }

    #[test]
    fn step_interval_from_rpm() {
        let az = AxisConfig::azimuth();
        // 5 rpm * 2048 steps = 10240 steps per minute
        let expected = Duration::from_secs_f64(60.0 / 10_240.0);
        assert_eq!(az.step_interval(), expected);

        let ack = MoveAck::for_steps(&az, -10_240);
        assert!((ack.estimated.as_secs_f64() - 60.0).abs() < 1e-6);
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut cfg = AxisConfig::azimuth();
        cfg.steps_per_revolution = 0;
        assert!(matches!(cfg.validate(), Err(DriverFault::InvalidConfig(_))));

        let mut cfg = AxisConfig::azimuth();
        cfg.rpm = 0.0;
        assert!(cfg.validate().is_err());
        cfg.rpm = f64::NAN;
        assert!(cfg.validate().is_err());

        let mut cfg = AxisConfig::azimuth();
        cfg.pins = [1, 2, 2, 3];
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn vanishing_rpm_is_rejected() {
        let mut cfg = AxisConfig::azimuth();
        cfg.rpm = 1e-300;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("too slow"), "{err}");

        cfg.rpm = f64::MIN_POSITIVE;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn estimates_saturate_instead_of_overflowing() {
        let mut cfg = AxisConfig::azimuth();
        cfg.rpm = 1e-300;
        assert_eq!(cfg.step_interval(), Duration::MAX);
        assert_eq!(MoveAck::for_steps(&cfg, -3).estimated, Duration::MAX);

        // Valid but slow enough that a long move overflows the estimate.
        cfg.rpm = 1e-12;
        assert!(cfg.validate().is_ok());
        let ack = MoveAck::for_steps(&cfg, i64::MAX);
        assert_eq!(ack.steps, i64::MAX);
        assert_eq!(ack.estimated, Duration::MAX);
    }

    #[test]
    fn step_mode_parsing() {
        assert_eq!("half".parse::<StepMode>().unwrap(), StepMode::Half);
        assert_eq!("2".parse::<StepMode>().unwrap(), StepMode::Full);
        assert_eq!("WAVE".parse::<StepMode>().unwrap(), StepMode::Wave);
        assert!("quarter".parse::<StepMode>().is_err());
        assert_eq!(StepMode::from_index(4), None);
    }

    #[test]
    fn axis_names() {
        assert_eq!(Axis::Azimuth.to_string(), "azimuth");
        assert_eq!(Axis::Altitude.as_str(), "altitude");
    }
}
