//! Tokio client session in the ESME role.
//!
//! [`ClientCodec`] splits the inbound byte stream into the banner line and
//! ETX-delimited frames; [`Session`] drives a connection through banner,
//! login and pipelined request/response traffic, and reconnects after
//! transport faults.

mod codec;
mod session;

pub use codec::{ClientCodec, ClientCodecError, Event};
pub use session::{ClientConfig, EventSink, LogSink, Session, SessionError, SessionEvent};
