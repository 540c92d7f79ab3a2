//! Open-loop driving of a two-axis alt-az mount.
//!
//! A [`Mount`] owns the two long-lived [`AxisDriver`]s and the site. Each
//! client connection borrows it as a [`DriveSession`], which turns every
//! position frame into relative azimuth/altitude moves and an
//! acknowledgement. Nothing is read back from the motors.

pub mod axis;
pub mod error;
pub mod mount;
pub mod session;
pub mod simulated;
pub mod threaded;

pub use axis::{Axis, AxisConfig, AxisDriver, MoveAck, StepMode};
pub use error::{DriverFault, Result, SessionError};
pub use mount::{Mount, MountConfig, SessionSettings, TimeSource};
pub use session::{
    AxisOutcome, DriveSession, DriveState, DriveStep, FrameReport, SessionState, SessionSummary,
};
pub use simulated::SimulatedAxis;
pub use threaded::ThreadedAxis;
