//! Single-connection TCP transport.
//!
//! The planetarium client talks to the bridge over one persistent TCP
//! connection. This crate owns the listening socket and hands out
//! [`MountStream`] values; everything above it only sees `Read + Write`.

pub mod error;
pub mod stream;
pub mod tcp;

pub use error::{Result, TransportError};
pub use stream::MountStream;
pub use tcp::{TcpTransport, DEFAULT_BIND, DEFAULT_PORT};
