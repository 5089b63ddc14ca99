//! CIMD2 parameter codes and parameter blocks.

use std::fmt::{Display, Formatter};

/// A CIMD2 parameter code, three decimal digits on the wire.
///
/// Codes 041, 042, 045, 046 and 047 are obsolete since SMSC 8.0 but remain
/// in the dictionary so frames from older centres still decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParamCode {
    /// 010, string, at most 32 characters.
    UserId,
    /// 011, string, at most 32 characters.
    Password,
    /// 012, integer, at most 3 digits.
    SubAddr,
    /// 019, integer, 1..=128.
    WindowSize,
    /// 021.
    DestAddr,
    /// 023.
    OrigAddr,
    /// 026.
    OrigImsi,
    /// 027, string, at most 11 characters, alphanumerics and space.
    AlphaOrigAddr,
    /// 028.
    OrigVmscAddr,
    /// 030, integer, 0..=255.
    DataCodingScheme,
    /// 032.
    UserDataHeader,
    /// 033.
    UserData,
    /// 034.
    UserDataBinary,
    /// 041, obsolete.
    TransportType,
    /// 042, obsolete.
    MsgType,
    /// 044, integer, 0 or 1.
    MoreMsgs,
    /// 045, obsolete.
    OperTimer,
    /// 046, obsolete.
    DialogueId,
    /// 047, obsolete.
    UssdPhase,
    /// 048.
    ServiceCode,
    /// 050.
    ValidityPeriodRel,
    /// 051.
    ValidityPeriodAbs,
    /// 052.
    ProtocolId,
    /// 053.
    FirstDeliTimeRel,
    /// 054.
    FirstDeliTimeAbs,
    /// 055.
    ReplyPath,
    /// 056.
    StatusReportReq,
    /// 058.
    CancelEnabled,
    /// 059.
    CancelMode,
    /// 060, `yymmddhhmmss`.
    ServCentreTimestamp,
    /// 061, integer, at most 2 digits.
    StatusCode,
    /// 062.
    StatusErrorCode,
    /// 063, `yymmddhhmmss`.
    DischargeTime,
    /// 064.
    TariffClass,
    /// 065.
    ServiceDescr,
    /// 066.
    MsgCount,
    /// 067.
    Priority,
    /// 068, integer, 0..=2.
    DeliReqMode,
    /// 069.
    ServCentreAddr,
    /// 500, carries the three-digit code of the parameter being queried.
    GetParam,
    /// 501, `yymmddhhmmss`.
    McTime,
    /// 900.
    ErrorCode,
    /// 901.
    ErrorText,
}

impl ParamCode {
    pub fn code(&self) -> u16 {
        match self {
            Self::UserId => 10,
            Self::Password => 11,
            Self::SubAddr => 12,
            Self::WindowSize => 19,
            Self::DestAddr => 21,
            Self::OrigAddr => 23,
            Self::OrigImsi => 26,
            Self::AlphaOrigAddr => 27,
            Self::OrigVmscAddr => 28,
            Self::DataCodingScheme => 30,
            Self::UserDataHeader => 32,
            Self::UserData => 33,
            Self::UserDataBinary => 34,
            Self::TransportType => 41,
            Self::MsgType => 42,
            Self::MoreMsgs => 44,
            Self::OperTimer => 45,
            Self::DialogueId => 46,
            Self::UssdPhase => 47,
            Self::ServiceCode => 48,
            Self::ValidityPeriodRel => 50,
            Self::ValidityPeriodAbs => 51,
            Self::ProtocolId => 52,
            Self::FirstDeliTimeRel => 53,
            Self::FirstDeliTimeAbs => 54,
            Self::ReplyPath => 55,
            Self::StatusReportReq => 56,
            Self::CancelEnabled => 58,
            Self::CancelMode => 59,
            Self::ServCentreTimestamp => 60,
            Self::StatusCode => 61,
            Self::StatusErrorCode => 62,
            Self::DischargeTime => 63,
            Self::TariffClass => 64,
            Self::ServiceDescr => 65,
            Self::MsgCount => 66,
            Self::Priority => 67,
            Self::DeliReqMode => 68,
            Self::ServCentreAddr => 69,
            Self::GetParam => 500,
            Self::McTime => 501,
            Self::ErrorCode => 900,
            Self::ErrorText => 901,
        }
    }

    pub fn from_code(code: u16) -> Option<Self> {
        Some(match code {
            10 => Self::UserId,
            11 => Self::Password,
            12 => Self::SubAddr,
            19 => Self::WindowSize,
            21 => Self::DestAddr,
            23 => Self::OrigAddr,
            26 => Self::OrigImsi,
            27 => Self::AlphaOrigAddr,
            28 => Self::OrigVmscAddr,
            30 => Self::DataCodingScheme,
            32 => Self::UserDataHeader,
            33 => Self::UserData,
            34 => Self::UserDataBinary,
            41 => Self::TransportType,
            42 => Self::MsgType,
            44 => Self::MoreMsgs,
            45 => Self::OperTimer,
            46 => Self::DialogueId,
            47 => Self::UssdPhase,
            48 => Self::ServiceCode,
            50 => Self::ValidityPeriodRel,
            51 => Self::ValidityPeriodAbs,
            52 => Self::ProtocolId,
            53 => Self::FirstDeliTimeRel,
            54 => Self::FirstDeliTimeAbs,
            55 => Self::ReplyPath,
            56 => Self::StatusReportReq,
            58 => Self::CancelEnabled,
            59 => Self::CancelMode,
            60 => Self::ServCentreTimestamp,
            61 => Self::StatusCode,
            62 => Self::StatusErrorCode,
            63 => Self::DischargeTime,
            64 => Self::TariffClass,
            65 => Self::ServiceDescr,
            66 => Self::MsgCount,
            67 => Self::Priority,
            68 => Self::DeliReqMode,
            69 => Self::ServCentreAddr,
            500 => Self::GetParam,
            501 => Self::McTime,
            900 => Self::ErrorCode,
            901 => Self::ErrorText,
            _ => return None,
        })
    }
}

impl Display for ParamCode {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{:03}", self.code())
    }
}

/// One parameter block: a code and its textual value.
///
/// Values are text on the wire; integer-valued parameters are rendered
/// base-10 by the constructors in [`crate::command`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Param {
    code: ParamCode,
    value: String,
}

impl Param {
    pub fn new(code: ParamCode, value: impl Into<String>) -> Self {
        Self {
            code,
            value: value.into(),
        }
    }

    pub fn code(&self) -> ParamCode {
        self.code
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

/// First occurrence of `code` in `params`; the first one is authoritative
/// when a code repeats.
pub fn find(params: &[Param], code: ParamCode) -> Option<&str> {
    params
        .iter()
        .find(|param| param.code() == code)
        .map(Param::value)
}
