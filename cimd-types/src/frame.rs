//! Decoded inbound frames.

use thiserror::Error;

use crate::{
    opcode::OpCode,
    param::{find, Param, ParamCode},
    status::comm_error_text,
};

/// An error reported by the peer, either as opcode 98/99 or as a non-zero
/// error-code parameter inside a positive response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("SMSC error {code}: {text}")]
pub struct ProtocolError {
    pub code: u16,
    pub text: String,
}

/// One decoded CIMD2 frame: the header fields and the parameter blocks in
/// wire order.
///
/// Covers both directions: responses echo the packet number of the request
/// they answer, SMSC-originated operations (deliver, status report) carry
/// even packet numbers of their own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    opcode: OpCode,
    packet_number: u8,
    params: Vec<Param>,
}

impl Frame {
    pub fn new(opcode: OpCode, packet_number: u8, params: Vec<Param>) -> Self {
        Self {
            opcode,
            packet_number,
            params,
        }
    }

    pub fn opcode(&self) -> OpCode {
        self.opcode
    }

    pub fn packet_number(&self) -> u8 {
        self.packet_number
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Value of the first occurrence of `code`.
    pub fn param(&self, code: ParamCode) -> Option<&str> {
        find(&self.params, code)
    }

    /// The error the frame reports, if any.
    ///
    /// Opcode 98/99 is always an error. Other responses report one through
    /// a non-zero error-code parameter. The text comes from the error-text
    /// parameter when the peer sent one, from the communication-error table
    /// otherwise.
    pub fn protocol_error(&self) -> Option<ProtocolError> {
        let code = self
            .param(ParamCode::ErrorCode)
            .and_then(|value| value.parse::<u16>().ok());

        match code {
            Some(0) if !self.opcode.is_error_response() => None,
            Some(code) => Some(self.protocol_error_with(code)),
            None if self.opcode.is_error_response() => Some(self.protocol_error_with(0)),
            None => None,
        }
    }

    fn protocol_error_with(&self, code: u16) -> ProtocolError {
        // 0 only reaches this path through a 98/99 that named no error
        // code; the table's "No error" would be misleading there.
        let text = match self.param(ParamCode::ErrorText) {
            Some(text) => text.to_owned(),
            None => comm_error_text(code)
                .filter(|_| code != 0)
                .unwrap_or("unknown error")
                .to_owned(),
        };
        ProtocolError { code, text }
    }

    /// The status code of a status report, parsed.
    pub fn status_code(&self) -> Option<u16> {
        self.param(ParamCode::StatusCode)
            .and_then(|value| value.parse().ok())
    }
}
