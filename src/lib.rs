//! Client-side implementation of CIMD2, the text-framed access protocol of
//! the Nokia Short Message Service Centre.
//!
//! The crate has two halves:
//!
//! * [`codec`] is the wire form: brace-escape text rendering, the 8-bit
//!   checksum, frame serialization, and nom-based frame parsing with
//!   parameter extraction.
//! * [`client`] (feature `client`, default) is a tokio session in the ESME
//!   role: banner, automatic login, pipelined request/response correlation
//!   and a reconnect loop.
//!
//! Protocol value types come from [`cimd_types`], re-exported as [`types`].
//!
//! A frame on the wire is
//!
//! ```text
//! <STX>OO:PPP<TAB>ccc:value<TAB>...[HH]<ETX>
//! ```
//!
//! with `OO` the two-digit opcode, `PPP` the three-digit packet number,
//! `ccc:value` the parameter blocks and `HH` the optional checksum over
//! everything up to and including the final TAB.
//!
//! ```
//! use cimd_codec::codec::{escape, serialize};
//! use cimd_codec::types::{command::Command, core::PacketNumber};
//!
//! let login = Command::login("name", "password", None, None)?;
//! let bytes = serialize(&login, PacketNumber::FIRST, false);
//! assert_eq!(
//!     escape::decode(&bytes),
//!     "{STX}01:001{TAB}010:name{TAB}011:password{TAB}{ETX}",
//! );
//! # Ok::<_, cimd_codec::types::command::CommandError>(())
//! ```
#![deny(missing_debug_implementations)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod codec;

/// This module is only available when the feature `client` was specified.
#[cfg(feature = "client")]
#[cfg_attr(docsrs, doc(cfg(feature = "client")))]
pub mod client;

pub use cimd_types;
pub use cimd_types as types;
