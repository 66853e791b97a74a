//! Two-valued completion tokens.
//!
//! Stores without a native boolean persist completion as `"t"` or `"f"`.
//! Anything else is corrupt data and must be rejected by the caller.

/// Token stored for a completed todo.
pub const COMPLETED_TOKEN: &str = "t";

/// Token stored for an incomplete todo.
pub const INCOMPLETE_TOKEN: &str = "f";

/// Converts a completion flag to its storage token.
pub fn to_token(completed: bool) -> &'static str {
    if completed {
        COMPLETED_TOKEN
    } else {
        INCOMPLETE_TOKEN
    }
}

/// Parses a storage token. Returns `None` for anything but `"t"` or `"f"`.
pub fn parse_token(token: &str) -> Option<bool> {
    match token {
        COMPLETED_TOKEN => Some(true),
        INCOMPLETE_TOKEN => Some(false),
        _ => None,
    }
}
