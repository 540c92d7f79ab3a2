//! Bridge between Stellarium's telescope protocol and an open-loop alt-az mount.
//!
//! A planetarium client sends target right ascension and declination; the
//! bridge turns each target into azimuth/altitude for the observing site,
//! drives both stepper axes by the difference from the last target, and echoes
//! the position back.
//!
//! # Crate Structure
//!
//! - [`transport`]: single-connection TCP listener and client streams
//! - [`frame`]: the fixed 20-byte telescope frame and partial-read reassembly
//! - [`astro`]: angle codecs, sexagesimal text, sidereal time and the horizontal transform
//! - [`mount`]: axis drivers, the mount and per-connection drive sessions

/// Re-export transport types.
pub mod transport {
    pub use skybridge_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use skybridge_frame::*;
}

/// Re-export coordinate and time types.
pub mod astro {
    pub use skybridge_astro::*;
}

/// Re-export mount and session types.
pub mod mount {
    pub use skybridge_mount::*;
}
