use bytes::Bytes;

/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// A complete frame was received but its contents are inconsistent.
    ///
    /// The offending bytes have already been consumed from the stream.
    #[error("malformed frame ({reason}): {}", hex::encode(.raw))]
    Malformed { reason: String, raw: Bytes },

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The connection was closed, possibly in the middle of a frame.
    #[error("connection closed ({buffered} bytes of partial frame discarded)")]
    ConnectionClosed { buffered: usize },
}

pub type Result<T> = std::result::Result<T, FrameError>;
