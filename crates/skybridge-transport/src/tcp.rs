use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};

use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::stream::MountStream;

/// Default listening address.
pub const DEFAULT_BIND: &str = "0.0.0.0";

/// Default listening port used by planetarium telescope plugins.
pub const DEFAULT_PORT: u16 = 10001;

/// TCP transport serving one client connection at a time.
///
/// `accept` blocks until a client connects. Callers are expected to serve a
/// connection to completion before accepting again; further clients wait in
/// the kernel backlog meanwhile.
pub struct TcpTransport {
    listener: TcpListener,
    local: SocketAddr,
}

impl TcpTransport {
    /// Bind and listen on `addr` (anything accepted by `ToSocketAddrs`).
    pub fn bind(addr: impl ToSocketAddrs + std::fmt::Debug) -> Result<Self> {
        let label = format!("{addr:?}");
        let listener = TcpListener::bind(addr).map_err(|e| TransportError::Bind {
            addr: label.clone(),
            source: e,
        })?;
        let local = listener.local_addr().map_err(|e| TransportError::Bind {
            addr: label,
            source: e,
        })?;

        info!(%local, "listening for telescope client");

        Ok(Self { listener, local })
    }

    /// Accept an incoming connection (blocking).
    pub fn accept(&self) -> Result<MountStream> {
        let (stream, addr) = self.listener.accept().map_err(TransportError::Accept)?;
        debug!(%addr, "accepted connection");
        Ok(MountStream::from_tcp(stream))
    }

    /// Connect to a listening bridge (blocking).
    pub fn connect(addr: impl ToSocketAddrs + std::fmt::Debug) -> Result<MountStream> {
        let label = format!("{addr:?}");
        let stream = TcpStream::connect(addr).map_err(|e| TransportError::Connect {
            addr: label,
            source: e,
        })?;
        debug!(peer = ?stream.peer_addr().ok(), "connected to bridge");
        Ok(MountStream::from_tcp(stream))
    }

    /// The address this transport is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local
    }

    /// Transport name for diagnostics.
    pub fn transport_name(&self) -> &'static str {
        "tcp"
    }
}
