use std::io::{ErrorKind, Write};

use skybridge_transport::MountStream;

use crate::codec::TelescopeFrame;
use crate::error::{FrameError, Result};
use crate::reader::transport_to_frame_error;

/// Writes complete telescope frames to any `Write` stream.
pub struct FrameWriter<T> {
    inner: T,
}

impl<T: Write> FrameWriter<T> {
    /// Create a new frame writer.
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Write one complete frame and flush (blocking).
    pub fn write_frame(&mut self, frame: &TelescopeFrame) -> Result<()> {
        let bytes = frame.to_bytes();

        let mut offset = 0usize;
        while offset < bytes.len() {
            match self.inner.write(&bytes[offset..]) {
                Ok(0) => return Err(FrameError::ConnectionClosed { buffered: 0 }),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }

        self.flush()
    }

    /// Write the same frame `times` times back to back.
    ///
    /// Some clients drop acknowledgements they cannot align; repeating the
    /// report keeps them in sync.
    pub fn write_repeated(&mut self, frame: &TelescopeFrame, times: usize) -> Result<()> {
        for _ in 0..times {
            self.write_frame(frame)?;
        }
        Ok(())
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl FrameWriter<MountStream> {
    /// Create a frame writer for a client connection with an optional write timeout.
    pub fn for_stream(inner: MountStream, timeout: Option<std::time::Duration>) -> Result<Self> {
        inner
            .set_write_timeout(timeout)
            .map_err(transport_to_frame_error)?;
        Ok(Self::new(inner))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use bytes::BytesMut;

    use super::*;
    use crate::codec::{decode_frame, FRAME_LEN};

    #[test]
    fn write_single_frame() {
        let mut writer = FrameWriter::new(Cursor::new(Vec::<u8>::new()));
        let sent = TelescopeFrame::position(1_429_000_000, 1_073_741_824, 536_870_912);

        writer.write_frame(&sent).unwrap();

        let inner = writer.into_inner().into_inner();
        assert_eq!(inner.len(), FRAME_LEN);
        let mut wire = BytesMut::from(inner.as_slice());
        assert_eq!(decode_frame(&mut wire).unwrap().unwrap(), sent);
    }

    #[test]
    fn write_repeated_frames() {
        let mut writer = FrameWriter::new(Cursor::new(Vec::<u8>::new()));
        let sent = TelescopeFrame::position(7, 8, 9);

        writer.write_repeated(&sent, 10).unwrap();

        let mut wire = BytesMut::from(writer.into_inner().into_inner().as_slice());
        assert_eq!(wire.len(), 10 * FRAME_LEN);
        for _ in 0..10 {
            assert_eq!(decode_frame(&mut wire).unwrap().unwrap(), sent);
        }
    }

    #[test]
    fn short_writes_are_completed() {
        let mut writer = FrameWriter::new(TwoBytesAtATime::default());
        let sent = TelescopeFrame::position(-1, 0, 0);

        writer.write_frame(&sent).unwrap();
        assert_eq!(writer.get_ref().written, sent.to_bytes().to_vec());
        assert!(writer.get_ref().flushed);
    }

    #[test]
    fn zero_length_write_reports_closed() {
        let mut writer = FrameWriter::new(ClosedSink);
        let err = writer
            .write_frame(&TelescopeFrame::position(0, 0, 0))
            .unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed { .. }));
    }

    #[derive(Default)]
    struct TwoBytesAtATime {
        written: Vec<u8>,
        flushed: bool,
        interrupted_once: bool,
    }

    impl Write for TwoBytesAtATime {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if !self.interrupted_once {
                self.interrupted_once = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            let n = buf.len().min(2);
            self.written.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.flushed = true;
            Ok(())
        }
    }

    struct ClosedSink;

    impl Write for ClosedSink {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}
