//! `skybridge.toml`: listener, site and axis settings for `serve`.
//!
//! Every key is optional. Command-line flags are applied on top of the file
//! and the result is validated once, before anything binds.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use skybridge_astro::SiteLocation;
use skybridge_mount::{Axis, AxisConfig, MountConfig, SessionSettings, StepMode, TimeSource};
use skybridge_transport::{DEFAULT_BIND, DEFAULT_PORT};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("cannot parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeConfig {
    pub server: ServerSection,
    pub site: SiteSection,
    pub azimuth: AxisSection,
    pub altitude: AxisSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    pub bind: String,
    pub port: u16,
    /// Copies of each acknowledgement; older clients expect 10.
    pub ack_repeats: usize,
    pub time_source: TimeSource,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            port: DEFAULT_PORT,
            ack_repeats: SessionSettings::default().ack_repeats,
            time_source: TimeSource::default(),
        }
    }
}

/// Observer location in degrees; unset values fall back to the reference site.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude_degrees: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude_degrees: Option<f64>,
}

impl SiteSection {
    pub fn resolve(&self) -> Result<SiteLocation, ConfigError> {
        let reference = SiteLocation::default();
        if self.latitude_degrees.is_none() && self.longitude_degrees.is_none() {
            return Ok(reference);
        }
        SiteLocation::from_degrees(
            self.latitude_degrees
                .unwrap_or_else(|| reference.latitude_degrees()),
            self.longitude_degrees
                .unwrap_or_else(|| reference.longitude_degrees()),
        )
        .map_err(|err| ConfigError::Invalid(format!("[site] {err}")))
    }
}

/// Per-axis overrides on top of that axis' reference defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AxisSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps_per_revolution: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_mode: Option<StepMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pins: Option<[u8; 4]>,
}

impl AxisSection {
    pub fn resolve(&self, axis: Axis) -> Result<AxisConfig, ConfigError> {
        let defaults = AxisConfig::for_axis(axis);
        let config = AxisConfig {
            steps_per_revolution: self
                .steps_per_revolution
                .unwrap_or(defaults.steps_per_revolution),
            rpm: self.rpm.unwrap_or(defaults.rpm),
            step_mode: self.step_mode.unwrap_or(defaults.step_mode),
            pins: self.pins.unwrap_or(defaults.pins),
        };
        config
            .validate()
            .map_err(|fault| ConfigError::Invalid(format!("[{axis}] {fault}")))?;
        Ok(config)
    }
}

impl BridgeConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text, path)
    }

    /// Parse TOML text; `origin` names the source in errors.
    pub fn from_toml(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Socket address to listen on.
    pub fn listen_addr(&self) -> String {
        let bind = self.server.bind.as_str();
        if bind.contains(':') && !bind.starts_with('[') {
            format!("[{bind}]:{}", self.server.port)
        } else {
            format!("{bind}:{}", self.server.port)
        }
    }

    /// Validate everything and produce the mount settings.
    pub fn mount_config(&self) -> Result<MountConfig, ConfigError> {
        if self.server.ack_repeats == 0 {
            return Err(ConfigError::Invalid(
                "[server] ack_repeats must be at least 1".to_string(),
            ));
        }
        if self.server.bind.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "[server] bind must not be empty".to_string(),
            ));
        }

        Ok(MountConfig {
            site: self.site.resolve()?,
            azimuth: self.azimuth.resolve(Axis::Azimuth)?,
            altitude: self.altitude.resolve(Axis::Altitude)?,
            session: SessionSettings {
                ack_repeats: self.server.ack_repeats,
                time_source: self.server.time_source,
            },
        })
    }
}
