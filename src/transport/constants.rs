//! Transport timeouts.

/// Time allowed to establish a connection, in seconds.
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Time allowed for a whole request including the body, in seconds. Sized for
/// large attachments.
pub const REQUEST_TIMEOUT_SECS: u64 = 300;
