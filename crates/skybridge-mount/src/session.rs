use std::io::{ErrorKind, Read, Write};

use chrono::{DateTime, Utc};
use serde::Serialize;
use skybridge_astro::{
    degrees_to_sexagesimal, hours_to_sexagesimal, EquatorialCoordinate, HorizontalCoordinate,
    TransformSingularity,
};
use skybridge_frame::{
    message_kind_name, FrameError, FrameReader, FrameWriter, TelescopeFrame, MSG_POSITION,
};
use tracing::{debug, error, info, warn};

use crate::axis::{Axis, AxisDriver, MoveAck};
use crate::error::{DriverFault, Result, SessionError};
use crate::mount::{Mount, TimeSource};

const MICROS_PER_SECOND: i64 = 1_000_000;

/// Where a session is in its frame cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingFrame,
    Processing,
    Closed,
}

/// Last commanded absolute position.
///
/// Starts at (0, 0) for every connection and follows the commands, not the
/// motors: the mount is open-loop.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct DriveState {
    pub last_azimuth_degrees: f64,
    pub last_altitude_degrees: f64,
}

/// Result of commanding one axis.
#[derive(Debug, Clone, PartialEq)]
pub enum AxisOutcome {
    Moved(MoveAck),
    Faulted(DriverFault),
}

impl AxisOutcome {
    pub fn is_fault(&self) -> bool {
        matches!(self, Self::Faulted(_))
    }
}

/// Relative moves issued for one target.
#[derive(Debug, Clone, PartialEq)]
pub struct DriveStep {
    /// Raw signed difference; crossing north can ask for nearly a full turn.
    pub delta_azimuth_degrees: f64,
    pub delta_altitude_degrees: f64,
    pub azimuth: AxisOutcome,
    pub altitude: AxisOutcome,
}

/// Everything that happened while processing one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub equatorial: EquatorialCoordinate,
    pub instant: DateTime<Utc>,
    /// Target actually driven to (fallback azimuth applied when singular).
    pub horizontal: HorizontalCoordinate,
    pub singularity: Option<TransformSingularity>,
    pub drive: DriveStep,
    /// Position report to send back to the client.
    pub ack: TelescopeFrame,
}

/// Counters for one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SessionSummary {
    pub frames_processed: u64,
    pub frames_rejected: u64,
    pub driver_faults: u64,
    pub singularities: u64,
}

/// One client connection driving the mount.
///
/// Borrows the mount exclusively for the lifetime of the connection, so only
/// one session can command the axes at a time.
pub struct DriveSession<'m, D> {
    mount: &'m mut Mount<D>,
    state: DriveState,
    status: SessionState,
    summary: SessionSummary,
}

impl<'m, D: AxisDriver> DriveSession<'m, D> {
    pub(crate) fn new(mount: &'m mut Mount<D>) -> Self {
        Self {
            mount,
            state: DriveState::default(),
            status: SessionState::AwaitingFrame,
            summary: SessionSummary::default(),
        }
    }

    pub fn state(&self) -> DriveState {
        self.state
    }

    pub fn status(&self) -> SessionState {
        self.status
    }

    pub fn summary(&self) -> SessionSummary {
        self.summary
    }

    /// Pump frames from `reader` until the client goes away.
    ///
    /// Each frame is fully processed and acknowledged before the next one is
    /// read. Frame-level failures are logged and skipped; only transport
    /// failures other than a disconnect end the session with an error.
    pub fn run<R: Read, W: Write>(
        &mut self,
        reader: &mut FrameReader<R>,
        writer: &mut FrameWriter<W>,
    ) -> Result<SessionSummary> {
        let repeats = self.mount.settings().ack_repeats;

        loop {
            self.status = SessionState::AwaitingFrame;

            let frame = match reader.read_frame() {
                Ok(frame) => frame,
                Err(FrameError::Malformed { reason, raw }) => {
                    warn!(%reason, raw = %hex::encode(&raw), "discarding malformed frame");
                    self.summary.frames_rejected += 1;
                    continue;
                }
                Err(err) if is_disconnect(&err) => {
                    self.close();
                    return Ok(self.summary);
                }
                Err(err) => {
                    self.close();
                    return Err(err.into());
                }
            };

            let report = match self.process_frame(&frame) {
                Ok(report) => report,
                Err(err) => {
                    warn!(
                        error = %err,
                        raw = %hex::encode(frame.to_bytes()),
                        "discarding frame"
                    );
                    continue;
                }
            };

            if let Err(err) = writer.write_repeated(&report.ack, repeats) {
                self.close();
                if is_disconnect(&err) {
                    return Ok(self.summary);
                }
                return Err(err.into());
            }
            debug!(
                ra = report.ack.ra,
                dec = report.ack.dec,
                time = report.ack.time,
                repeats,
                "acknowledged position"
            );
        }
    }

    /// Process one decoded frame: transform, drive both axes, build the
    /// acknowledgement.
    ///
    /// A rejected frame leaves the drive state untouched.
    pub fn process_frame(&mut self, frame: &TelescopeFrame) -> Result<FrameReport> {
        self.status = SessionState::Processing;
        let result = self.process(frame);
        self.status = SessionState::AwaitingFrame;

        match result {
            Ok(_) => self.summary.frames_processed += 1,
            Err(_) => self.summary.frames_rejected += 1,
        }
        result
    }

    /// Command both axes towards an absolute horizontal target.
    ///
    /// The stored position moves to `target` whatever the drivers report.
    pub fn drive_to(&mut self, target: HorizontalCoordinate) -> DriveStep {
        let delta_azimuth_degrees = target.azimuth_degrees - self.state.last_azimuth_degrees;
        let delta_altitude_degrees = target.altitude_degrees - self.state.last_altitude_degrees;

        info!(
            azimuth = target.azimuth_degrees,
            altitude = target.altitude_degrees,
            delta_az = delta_azimuth_degrees,
            delta_alt = delta_altitude_degrees,
            "commanding axes"
        );

        let (azimuth_driver, altitude_driver) = self.mount.drivers_mut();
        let azimuth = command(Axis::Azimuth, azimuth_driver, delta_azimuth_degrees);
        let altitude = command(Axis::Altitude, altitude_driver, delta_altitude_degrees);

        self.summary.driver_faults +=
            u64::from(azimuth.is_fault()) + u64::from(altitude.is_fault());
        self.state = DriveState {
            last_azimuth_degrees: target.azimuth_degrees,
            last_altitude_degrees: target.altitude_degrees,
        };

        DriveStep {
            delta_azimuth_degrees,
            delta_altitude_degrees,
            azimuth,
            altitude,
        }
    }

    fn process(&mut self, frame: &TelescopeFrame) -> Result<FrameReport> {
        if frame.kind != MSG_POSITION {
            return Err(SessionError::UnsupportedKind(frame.kind));
        }

        let equatorial = EquatorialCoordinate::from_wire(frame.ra, frame.dec);
        debug!(
            size = frame.size,
            kind = message_kind_name(frame.kind),
            time = frame.time,
            ra = frame.ra,
            dec = frame.dec,
            ra_hms = %hours_to_sexagesimal(equatorial.right_ascension_hours),
            dec_dms = %degrees_to_sexagesimal(equatorial.declination_degrees),
            "received position frame"
        );
        let equatorial = equatorial.validate()?;
        let instant = self.observation_instant(frame)?;

        let (horizontal, singularity) = match self.mount.transform().apply(&equatorial, &instant)
        {
            Ok(horizontal) => (horizontal, None),
            Err(singularity) => {
                warn!(
                    altitude = singularity.altitude_degrees,
                    fallback_azimuth = self.state.last_azimuth_degrees,
                    "{singularity}; holding previous azimuth"
                );
                self.summary.singularities += 1;
                let fallback = HorizontalCoordinate::new(
                    self.state.last_azimuth_degrees,
                    singularity.altitude_degrees,
                );
                (fallback, Some(singularity))
            }
        };

        let drive = self.drive_to(horizontal);

        // The acknowledgement carries the bridge clock, not the observation instant.
        let (ra, dec) = equatorial.to_wire();
        let ack = TelescopeFrame::position(Utc::now().timestamp(), ra, dec);

        Ok(FrameReport {
            equatorial,
            instant,
            horizontal,
            singularity,
            drive,
            ack,
        })
    }

    fn observation_instant(&self, frame: &TelescopeFrame) -> Result<DateTime<Utc>> {
        match self.mount.settings().time_source {
            TimeSource::Frame => {
                let seconds = frame.time.div_euclid(MICROS_PER_SECOND);
                DateTime::from_timestamp(seconds, 0)
                    .ok_or(SessionError::InvalidTimestamp(frame.time))
            }
            TimeSource::System => {
                let now = Utc::now();
                Ok(DateTime::from_timestamp(now.timestamp(), 0).unwrap_or(now))
            }
        }
    }

    fn close(&mut self) {
        self.status = SessionState::Closed;
        info!(
            frames_processed = self.summary.frames_processed,
            frames_rejected = self.summary.frames_rejected,
            driver_faults = self.summary.driver_faults,
            singularities = self.summary.singularities,
            "session closed"
        );
    }
}

fn command<D: AxisDriver>(axis: Axis, driver: &mut D, delta_degrees: f64) -> AxisOutcome {
    match driver.move_by_degrees(delta_degrees) {
        Ok(ack) => AxisOutcome::Moved(ack),
        Err(fault) => {
            error!(%axis, delta_degrees, %fault, "axis move failed");
            AxisOutcome::Faulted(fault)
        }
    }
}

fn is_disconnect(err: &FrameError) -> bool {
    match err {
        FrameError::ConnectionClosed { .. } => true,
        FrameError::Io(io) => matches!(
            io.kind(),
            ErrorKind::ConnectionReset
                | ErrorKind::ConnectionAborted
                | ErrorKind::BrokenPipe
                | ErrorKind::UnexpectedEof
        ),
        FrameError::Malformed { .. } => false,
    }
}
