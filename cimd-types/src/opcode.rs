//! CIMD2 operation codes.

use std::fmt::{Display, Formatter};

/// A CIMD2 operation code, two decimal digits on the wire.
///
/// Every request code has a response pair 50 higher. Opcodes 20 and 23 are
/// SMSC-originated; an ESME sees them inbound and answers with their
/// response pairs. 98 and 99 are error responses the SMSC may send in place
/// of any positive response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OpCode {
    Login,
    Logout,
    SubmitMessage,
    EnquireMessageStatus,
    DeliveryRequest,
    CancelMessage,
    Set,
    Get,
    DeliverMessage,
    DeliverStatusReport,
    Alive,
    LoginResponse,
    LogoutResponse,
    SubmitMessageResponse,
    EnquireMessageStatusResponse,
    DeliveryRequestResponse,
    CancelMessageResponse,
    SetResponse,
    GetResponse,
    DeliverMessageResponse,
    DeliverStatusReportResponse,
    AliveResponse,
    GeneralErrorResponse,
    Nack,
}

impl OpCode {
    pub fn code(&self) -> u8 {
        match self {
            Self::Login => 1,
            Self::Logout => 2,
            Self::SubmitMessage => 3,
            Self::EnquireMessageStatus => 4,
            Self::DeliveryRequest => 5,
            Self::CancelMessage => 6,
            Self::Set => 8,
            Self::Get => 9,
            Self::DeliverMessage => 20,
            Self::DeliverStatusReport => 23,
            Self::Alive => 40,
            Self::LoginResponse => 51,
            Self::LogoutResponse => 52,
            Self::SubmitMessageResponse => 53,
            Self::EnquireMessageStatusResponse => 54,
            Self::DeliveryRequestResponse => 55,
            Self::CancelMessageResponse => 56,
            Self::SetResponse => 58,
            Self::GetResponse => 59,
            Self::DeliverMessageResponse => 70,
            Self::DeliverStatusReportResponse => 73,
            Self::AliveResponse => 90,
            Self::GeneralErrorResponse => 98,
            Self::Nack => 99,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            1 => Self::Login,
            2 => Self::Logout,
            3 => Self::SubmitMessage,
            4 => Self::EnquireMessageStatus,
            5 => Self::DeliveryRequest,
            6 => Self::CancelMessage,
            8 => Self::Set,
            9 => Self::Get,
            20 => Self::DeliverMessage,
            23 => Self::DeliverStatusReport,
            40 => Self::Alive,
            51 => Self::LoginResponse,
            52 => Self::LogoutResponse,
            53 => Self::SubmitMessageResponse,
            54 => Self::EnquireMessageStatusResponse,
            55 => Self::DeliveryRequestResponse,
            56 => Self::CancelMessageResponse,
            58 => Self::SetResponse,
            59 => Self::GetResponse,
            70 => Self::DeliverMessageResponse,
            73 => Self::DeliverStatusReportResponse,
            90 => Self::AliveResponse,
            98 => Self::GeneralErrorResponse,
            99 => Self::Nack,
            _ => return None,
        })
    }

    /// The positive response pair of a request opcode, `None` for opcodes
    /// that are themselves responses.
    pub fn response(&self) -> Option<Self> {
        if self.is_response() {
            None
        } else {
            Self::from_code(self.code() + 50)
        }
    }

    pub fn is_response(&self) -> bool {
        self.code() > 50
    }

    /// Whether the opcode reports an error in place of a positive response.
    pub fn is_error_response(&self) -> bool {
        matches!(self, Self::GeneralErrorResponse | Self::Nack)
    }
}

impl Display for OpCode {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{:02}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [OpCode; 24] = [
        OpCode::Login,
        OpCode::Logout,
        OpCode::SubmitMessage,
        OpCode::EnquireMessageStatus,
        OpCode::DeliveryRequest,
        OpCode::CancelMessage,
        OpCode::Set,
        OpCode::Get,
        OpCode::DeliverMessage,
        OpCode::DeliverStatusReport,
        OpCode::Alive,
        OpCode::LoginResponse,
        OpCode::LogoutResponse,
        OpCode::SubmitMessageResponse,
        OpCode::EnquireMessageStatusResponse,
        OpCode::DeliveryRequestResponse,
        OpCode::CancelMessageResponse,
        OpCode::SetResponse,
        OpCode::GetResponse,
        OpCode::DeliverMessageResponse,
        OpCode::DeliverStatusReportResponse,
        OpCode::AliveResponse,
        OpCode::GeneralErrorResponse,
        OpCode::Nack,
    ];

    #[test]
    fn code_round_trips() {
        for op in ALL {
            assert_eq!(OpCode::from_code(op.code()), Some(op));
        }
        assert_eq!(OpCode::from_code(0), None);
        assert_eq!(OpCode::from_code(7), None);
        assert_eq!(OpCode::from_code(41), None);
    }

    #[test]
    fn requests_pair_with_responses() {
        for op in ALL {
            match op.response() {
                Some(resp) => {
                    assert!(!op.is_response());
                    assert_eq!(resp.code(), op.code() + 50);
                }
                None => assert!(op.is_response()),
            }
        }
    }

    #[test]
    fn displays_two_digits() {
        assert_eq!(OpCode::Login.to_string(), "01");
        assert_eq!(OpCode::Alive.to_string(), "40");
        assert_eq!(OpCode::Nack.to_string(), "99");
    }
}
