//! Session connection states.
//!
//! ```text
//!   +------------+  open()   +------------+  TCP up   +---------------+
//!   |Disconnected|---------->| Connecting |---------->| BannerPending |
//!   +------------+           +------------+           +---------------+
//!         ^                        |                          |
//!         |                        | fault                    | banner + 51
//!         |                        v                          v
//!         |     reconnect    +------------+   fault    +---------------+
//!         +<-----------------|  Closing   |<-----------| Authenticated |
//!            timer           +------------+   close    +---------------+
//! ```
//!
//! The frame terminator is LF while BannerPending and ETX from
//! Authenticated on. Any state reaches Closing on a local close or a
//! transport fault; Closing drains the pending queue before the session
//! returns to Disconnected and, when auto-reconnect is on, arms the
//! reconnect timer.

/// State of one CIMD2 connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum State {
    Disconnected,
    Connecting,
    BannerPending,
    Authenticated,
    Closing,
}
