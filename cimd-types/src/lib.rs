//! Protocol types for CIMD2 (Computer Interface to Message Distribution,
//! version 2), the text-framed access protocol of the Nokia Short Message
//! Service Centre.
//!
//! This crate carries the value types and static dictionaries of the
//! protocol: control bytes, operation codes, parameter codes, packet
//! numbers, command constructors with their validation rules, the decoded
//! frame type, and the error-text tables. Serialization and parsing live in
//! the `cimd-codec` crate.
#![deny(missing_debug_implementations)]

pub mod command;
pub mod core;
pub mod frame;
pub mod opcode;
pub mod param;
pub mod state;
pub mod status;
