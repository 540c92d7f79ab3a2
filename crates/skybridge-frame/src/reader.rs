use std::io::{ErrorKind, Read};

use bytes::BytesMut;
use skybridge_transport::MountStream;
use tracing::trace;

use crate::codec::{decode_frame, TelescopeFrame, FRAME_LEN};
use crate::error::{FrameError, Result};

const READ_CHUNK_SIZE: usize = 4 * FRAME_LEN;

/// Reads complete telescope frames from any `Read` stream.
///
/// Handles partial reads internally. Callers always get complete frames,
/// and bytes belonging to the next frame stay buffered between calls.
pub struct FrameReader<T> {
    inner: T,
    buf: BytesMut,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader.
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(READ_CHUNK_SIZE),
        }
    }

    /// Read the next complete frame (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached.
    /// A malformed frame is returned as an error after its bytes were
    /// consumed; the reader can keep going afterwards.
    pub fn read_frame(&mut self) -> Result<TelescopeFrame> {
        loop {
            if let Some(frame) = decode_frame(&mut self.buf)? {
                return Ok(frame);
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                return Err(FrameError::ConnectionClosed {
                    buffered: self.buf.len(),
                });
            }

            self.buf.extend_from_slice(&chunk[..read]);
            trace!(read, buffered = self.buf.len(), "buffered partial frame data");
        }
    }

    /// Number of bytes buffered towards the next frame.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl FrameReader<MountStream> {
    /// Create a frame reader for a client connection with an optional read timeout.
    pub fn for_stream(inner: MountStream, timeout: Option<std::time::Duration>) -> Result<Self> {
        inner
            .set_read_timeout(timeout)
            .map_err(transport_to_frame_error)?;
        Ok(Self::new(inner))
    }
}

pub(crate) fn transport_to_frame_error(err: skybridge_transport::TransportError) -> FrameError {
    match err {
        skybridge_transport::TransportError::Io(io)
        | skybridge_transport::TransportError::Accept(io) => FrameError::Io(io),
        skybridge_transport::TransportError::Bind { source, .. }
        | skybridge_transport::TransportError::Connect { source, .. } => FrameError::Io(source),
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Write};

    use super::*;
    use crate::codec::encode_frame;

    fn wire(frames: &[TelescopeFrame]) -> Vec<u8> {
        let mut buf = BytesMut::new();
        for frame in frames {
            encode_frame(frame, &mut buf);
        }
        buf.to_vec()
    }

    #[test]
    fn read_single_frame() {
        let sent = TelescopeFrame::position(1, 2, 3);
        let mut reader = FrameReader::new(Cursor::new(wire(&[sent])));
        assert_eq!(reader.read_frame().unwrap(), sent);
    }

    #[test]
    fn read_multiple_frames() {
        let frames = [
            TelescopeFrame::position(1, 10, -10),
            TelescopeFrame::position(2, 20, -20),
            TelescopeFrame::position(3, 30, -30),
        ];
        let mut reader = FrameReader::new(Cursor::new(wire(&frames)));

        for expected in frames {
            assert_eq!(reader.read_frame().unwrap(), expected);
        }
        assert_eq!(reader.buffered(), 0);
    }

    #[test]
    fn partial_read_handling() {
        let sent = TelescopeFrame::position(4, u32::MAX, i32::MIN);
        let byte_reader = ByteByByteReader {
            bytes: wire(&[sent]),
            pos: 0,
        };
        let mut reader = FrameReader::new(byte_reader);

        assert_eq!(reader.read_frame().unwrap(), sent);
    }

    #[test]
    fn connection_closed_cleanly() {
        let mut reader = FrameReader::new(Cursor::new(Vec::<u8>::new()));
        let err = reader.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed { buffered: 0 }));
    }

    #[test]
    fn connection_closed_mid_frame() {
        let partial = wire(&[TelescopeFrame::position(1, 1, 1)])[..12].to_vec();
        let mut reader = FrameReader::new(Cursor::new(partial));
        let err = reader.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed { buffered: 12 }));
    }

    #[test]
    fn malformed_frame_does_not_poison_stream() {
        let mut bad = TelescopeFrame::position(1, 1, 1);
        bad.size = 3;
        let good = TelescopeFrame::position(2, 2, 2);
        let mut reader = FrameReader::new(Cursor::new(wire(&[bad, good])));

        assert!(matches!(
            reader.read_frame(),
            Err(FrameError::Malformed { .. })
        ));
        assert_eq!(reader.read_frame().unwrap(), good);
    }

    #[derive(Debug)]
    struct ByteByByteReader {
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for ByteByByteReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.pos >= self.bytes.len() || buf.is_empty() {
                return Ok(0);
            }

            buf[0] = self.bytes[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    #[test]
    fn interrupted_read_retries() {
        let sent = TelescopeFrame::position(8, 8, 8);
        let reader = InterruptedThenData {
            interrupted: false,
            bytes: Cursor::new(wire(&[sent])),
        };
        let mut framed = FrameReader::new(reader);
        assert_eq!(framed.read_frame().unwrap(), sent);
    }

    struct InterruptedThenData {
        interrupted: bool,
        bytes: Cursor<Vec<u8>>,
    }

    impl Read for InterruptedThenData {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            self.bytes.read(buf)
        }
    }

    #[test]
    fn frame_split_across_two_socket_writes() {
        let transport = skybridge_transport::TcpTransport::bind("127.0.0.1:0").unwrap();
        let addr = transport.local_addr();
        let sent = TelescopeFrame::position(1_700_000_000_000_000, 1_073_741_824, 536_870_912);
        let bytes = sent.to_bytes();

        let client = std::thread::spawn(move || {
            let mut stream = skybridge_transport::TcpTransport::connect(addr).unwrap();
            stream.set_nodelay(true).unwrap();
            stream.write_all(&bytes[..7]).unwrap();
            stream.flush().unwrap();
            std::thread::sleep(std::time::Duration::from_millis(20));
            stream.write_all(&bytes[7..]).unwrap();
        });

        let stream = transport.accept().unwrap();
        let mut reader = FrameReader::for_stream(stream, None).unwrap();
        assert_eq!(reader.read_frame().unwrap(), sent);

        client.join().unwrap();
        assert!(matches!(
            reader.read_frame(),
            Err(FrameError::ConnectionClosed { .. })
        ));
    }
}
