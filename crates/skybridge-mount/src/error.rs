use skybridge_astro::AstroError;
use skybridge_frame::FrameError;

/// Failure reported by an axis driver.
///
/// Local to one move: the session logs it, abandons that axis for the current
/// frame and carries on.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DriverFault {
    /// A move was requested before `configure`.
    #[error("driver used before configure")]
    NotConfigured,

    /// The axis configuration cannot be driven.
    #[error("invalid axis configuration: {0}")]
    InvalidConfig(String),

    /// The actuator refused this particular move.
    #[error("move of {delta_degrees}° rejected: {reason}")]
    Rejected { delta_degrees: f64, reason: String },

    /// The actuator (or its control thread) is gone.
    #[error("actuator unavailable: {0}")]
    Unavailable(String),
}

/// Errors that end the processing of one frame, or of the whole session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Framing or transport failure.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// The decoded coordinate is outside its physical range.
    #[error("coordinate error: {0}")]
    Coordinate(#[from] AstroError),

    /// The frame carries a message kind this bridge does not handle.
    #[error("unsupported message kind {0}")]
    UnsupportedKind(u16),

    /// The frame timestamp cannot be placed on the calendar.
    #[error("timestamp {0}µs outside the supported calendar range")]
    InvalidTimestamp(i64),
}

pub type Result<T> = std::result::Result<T, SessionError>;
