use bytes::{Buf, BufMut, BytesMut};

use crate::error::{FrameError, Result};
use crate::kind::MSG_POSITION;

/// Wire size of every frame: size (2) + type (2) + time (8) + ra (4) + dec (4).
pub const FRAME_LEN: usize = 20;

/// One telescope protocol message with its raw integer fields.
///
/// Field semantics (angle scaling, time units) live above this layer; the
/// codec only moves integers to and from the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelescopeFrame {
    /// Declared frame length. Informational; clients are not consistent.
    pub size: u16,
    /// Message kind, see [`crate::kind`].
    pub kind: u16,
    /// Microseconds since epoch inbound, whole seconds outbound.
    pub time: i64,
    /// Right ascension, full circle over the u32 range.
    pub ra: u32,
    /// Declination, 90 degrees per 2^30 units.
    pub dec: i32,
}

impl TelescopeFrame {
    /// Create a position frame with the canonical length field.
    pub fn position(time: i64, ra: u32, dec: i32) -> Self {
        Self {
            size: FRAME_LEN as u16,
            kind: MSG_POSITION,
            time,
            ra,
            dec,
        }
    }

    /// Encode this frame into a fresh 20-byte array.
    pub fn to_bytes(&self) -> [u8; FRAME_LEN] {
        let mut out = [0u8; FRAME_LEN];
        let mut cursor = &mut out[..];
        cursor.put_u16_le(self.size);
        cursor.put_u16_le(self.kind);
        cursor.put_i64_le(self.time);
        cursor.put_u32_le(self.ra);
        cursor.put_i32_le(self.dec);
        out
    }
}

/// Encode a frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────────┬──────────┬────────────┬──────────┬──────────┐
/// │ Size     │ Type     │ Time       │ RA       │ Dec      │
/// │ (2B LE)  │ (2B LE)  │ (8B LE i64)│ (4B LE)  │ (4B LE)  │
/// └──────────┴──────────┴────────────┴──────────┴──────────┘
/// ```
pub fn encode_frame(frame: &TelescopeFrame, dst: &mut BytesMut) {
    dst.reserve(FRAME_LEN);
    dst.put_slice(&frame.to_bytes());
}

/// Decode a frame from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet.
/// Otherwise exactly [`FRAME_LEN`] bytes are consumed, even when the frame is
/// rejected as malformed, so the stream stays aligned on frame boundaries.
pub fn decode_frame(src: &mut BytesMut) -> Result<Option<TelescopeFrame>> {
    if src.len() < FRAME_LEN {
        return Ok(None); // Need more data
    }

    let raw = src.split_to(FRAME_LEN).freeze();
    let mut fields = &raw[..];

    let frame = TelescopeFrame {
        size: fields.get_u16_le(),
        kind: fields.get_u16_le(),
        time: fields.get_i64_le(),
        ra: fields.get_u32_le(),
        dec: fields.get_i32_le(),
    };

    if usize::from(frame.size) < FRAME_LEN {
        return Err(FrameError::Malformed {
            reason: format!("declared length {} shorter than {FRAME_LEN}", frame.size),
            raw,
        });
    }

    Ok(Some(frame))
}
