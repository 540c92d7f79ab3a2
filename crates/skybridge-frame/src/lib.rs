//! Fixed-length framing for the planetarium telescope protocol.
//!
//! Every message on the wire is exactly 20 bytes, all little-endian:
//! - 2-byte frame length
//! - 2-byte message kind
//! - 8-byte signed timestamp
//! - 4-byte unsigned right ascension
//! - 4-byte signed declination
//!
//! TCP delivers bytes, not messages, so the reader buffers partial reads and
//! only ever hands out complete frames.

pub mod codec;
pub mod error;
pub mod kind;
pub mod reader;
pub mod writer;

pub use codec::{decode_frame, encode_frame, TelescopeFrame, FRAME_LEN};
pub use error::{FrameError, Result};
pub use kind::{message_kind_name, MSG_POSITION};
pub use reader::FrameReader;
pub use writer::FrameWriter;
