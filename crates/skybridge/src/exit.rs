use std::fmt;
use std::io;

use skybridge_astro::AstroError;
use skybridge_frame::FrameError;
use skybridge_mount::{DriverFault, SessionError};
use skybridge_transport::TransportError;

use crate::config::ConfigError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::AddrInUse
        | io::ErrorKind::AddrNotAvailable
        | io::ErrorKind::ConnectionRefused
        | io::ErrorKind::ConnectionReset => TRANSPORT_ERROR,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Bind { source, .. }
        | TransportError::Connect { source, .. }
        | TransportError::Accept(source)
        | TransportError::Io(source) => io_error(context, source),
    }
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Io(source) => io_error(context, source),
        FrameError::Malformed { .. } => CliError::new(DATA_INVALID, format!("{context}: {err}")),
        FrameError::ConnectionClosed { .. } => CliError::new(FAILURE, format!("{context}: {err}")),
    }
}

pub fn astro_error(context: &str, err: AstroError) -> CliError {
    let code = match err {
        AstroError::OutOfDomain { .. } => DATA_INVALID,
        AstroError::ParseAngle { .. }
        | AstroError::InvalidLatitude(_)
        | AstroError::InvalidLongitude(_) => USAGE,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn session_error(context: &str, err: SessionError) -> CliError {
    match err {
        SessionError::Frame(err) => frame_error(context, err),
        SessionError::Coordinate(err) => astro_error(context, err),
        SessionError::UnsupportedKind(_) | SessionError::InvalidTimestamp(_) => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
    }
}

pub fn driver_fault(context: &str, fault: DriverFault) -> CliError {
    let code = match fault {
        DriverFault::InvalidConfig(_) => DATA_INVALID,
        DriverFault::Unavailable(_) => INTERNAL,
        DriverFault::NotConfigured | DriverFault::Rejected { .. } => FAILURE,
    };
    CliError::new(code, format!("{context}: {fault}"))
}

pub fn config_error(err: ConfigError) -> CliError {
    match err {
        ConfigError::Read { path, source } => {
            io_error(&format!("cannot read {}", path.display()), source)
        }
        other @ (ConfigError::Parse { .. } | ConfigError::Invalid(_)) => {
            CliError::new(DATA_INVALID, other.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_conflict_maps_to_transport_code() {
        let err = TransportError::Bind {
            addr: "0.0.0.0:10001".to_string(),
            source: io::Error::from(io::ErrorKind::AddrInUse),
        };
        assert_eq!(transport_error("bind failed", err).code, TRANSPORT_ERROR);
    }

    #[test]
    fn bind_permission_maps_to_50() {
        let err = TransportError::Bind {
            addr: "0.0.0.0:80".to_string(),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        assert_eq!(transport_error("bind failed", err).code, PERMISSION_DENIED);
    }

    #[test]
    fn coordinate_errors_split_usage_and_data() {
        let parse = AstroError::ParseAngle {
            input: "north".to_string(),
            reason: "not a number",
        };
        assert_eq!(astro_error("--dec", parse).code, USAGE);

        let domain = SessionError::Coordinate(AstroError::OutOfDomain {
            ra_hours: 1.0,
            dec_degrees: 120.0,
        });
        assert_eq!(session_error("frame", domain).code, DATA_INVALID);
    }

    #[test]
    fn read_timeout_maps_to_124() {
        let err = FrameError::Io(io::Error::from(io::ErrorKind::WouldBlock));
        assert_eq!(frame_error("ack", err).code, TIMEOUT);
    }
}
