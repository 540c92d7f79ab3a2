use std::str::FromStr;

use serde::{Deserialize, Serialize};
use skybridge_astro::{HorizontalTransform, SiteLocation};
use tracing::info;

use crate::axis::{AxisConfig, AxisDriver};
use crate::error::DriverFault;
use crate::session::DriveSession;

/// Where the observation instant for the sidereal time comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeSource {
    /// The `time` field of each received frame.
    #[default]
    Frame,
    /// The bridge's own clock at processing time.
    System,
}

impl FromStr for TimeSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "frame" => Ok(Self::Frame),
            "system" => Ok(Self::System),
            other => Err(format!(
                "unknown time source {other:?} (expected frame or system)"
            )),
        }
    }
}

/// Per-connection behaviour shared by every session of a mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    /// How many times each acknowledgement frame is written.
    pub ack_repeats: usize,
    pub time_source: TimeSource,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            ack_repeats: 1,
            time_source: TimeSource::Frame,
        }
    }
}

/// Everything needed to bring a mount up.
#[derive(Debug, Clone)]
pub struct MountConfig {
    pub site: SiteLocation,
    pub azimuth: AxisConfig,
    pub altitude: AxisConfig,
    pub session: SessionSettings,
}

impl MountConfig {
    /// Reference mount: default site and axis defaults.
    pub fn reference() -> Self {
        Self {
            site: SiteLocation::default(),
            azimuth: AxisConfig::azimuth(),
            altitude: AxisConfig::altitude(),
            session: SessionSettings::default(),
        }
    }
}

impl Default for MountConfig {
    fn default() -> Self {
        Self::reference()
    }
}

/// The physical mount: two configured axis drivers and the observing site.
///
/// Lives for the whole process. Connections borrow it through
/// [`Mount::session`], one at a time.
pub struct Mount<D> {
    azimuth: D,
    altitude: D,
    transform: HorizontalTransform,
    settings: SessionSettings,
}

impl<D: AxisDriver> Mount<D> {
    /// Configure both drivers and assemble the mount.
    pub fn new(
        mut azimuth: D,
        mut altitude: D,
        config: &MountConfig,
    ) -> Result<Self, DriverFault> {
        azimuth.configure(&config.azimuth)?;
        altitude.configure(&config.altitude)?;

        info!(
            latitude = config.site.latitude_degrees(),
            longitude = config.site.longitude_degrees(),
            ack_repeats = config.session.ack_repeats,
            time_source = ?config.session.time_source,
            "mount ready"
        );

        Ok(Self {
            azimuth,
            altitude,
            transform: HorizontalTransform::new(config.site),
            settings: config.session,
        })
    }

    /// Start a session for a new connection, tracking from (0, 0).
    pub fn session(&mut self) -> DriveSession<'_, D> {
        DriveSession::new(self)
    }

    pub fn transform(&self) -> &HorizontalTransform {
        &self.transform
    }

    pub fn settings(&self) -> SessionSettings {
        self.settings
    }

    pub fn azimuth(&self) -> &D {
        &self.azimuth
    }

    pub fn altitude(&self) -> &D {
        &self.altitude
    }

    pub(crate) fn drivers_mut(&mut self) -> (&mut D, &mut D) {
        (&mut self.azimuth, &mut self.altitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::Axis;
    use crate::simulated::SimulatedAxis;

    #[test]
    fn new_configures_both_axes() {
        let mount = Mount::new(
            SimulatedAxis::new(Axis::Azimuth),
            SimulatedAxis::new(Axis::Altitude),
            &MountConfig::reference(),
        )
        .unwrap();

        assert_eq!(mount.azimuth().position_degrees(), Some(0.0));
        assert_eq!(mount.altitude().position_degrees(), Some(0.0));
        assert_eq!(mount.settings(), SessionSettings::default());
    }

    #[test]
    fn new_fails_on_bad_axis_config() {
        let mut config = MountConfig::reference();
        config.altitude.steps_per_revolution = 0;

        let result = Mount::new(
            SimulatedAxis::new(Axis::Azimuth),
            SimulatedAxis::new(Axis::Altitude),
            &config,
        );
        assert!(matches!(result, Err(DriverFault::InvalidConfig(_))));
    }

    #[test]
    fn time_source_parsing() {
        assert_eq!("frame".parse::<TimeSource>().unwrap(), TimeSource::Frame);
        assert_eq!("System".parse::<TimeSource>().unwrap(), TimeSource::System);
        assert!("gps".parse::<TimeSource>().is_err());
    }
}
