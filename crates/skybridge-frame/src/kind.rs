//! Message kinds carried in the `type` field.

/// Position command (client → bridge) and position report (bridge → client).
pub const MSG_POSITION: u16 = 0;

/// Returns a human-readable name for a message kind.
pub fn message_kind_name(kind: u16) -> &'static str {
    match kind {
        MSG_POSITION => "POSITION",
        _ => "UNKNOWN",
    }
}
