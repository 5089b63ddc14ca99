//! Client-side message construction.
//!
//! One constructor per CIMD2 operation. Every parameter rule (length
//! bounds, value ranges, mandatory parameters, mutual exclusions) is
//! enforced here, so an invalid message never reaches the serializer.

use thiserror::Error;

use crate::{
    opcode::OpCode,
    param::{find, Param, ParamCode},
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("parameter {param} exceeds its bound of {max}")]
    ParameterTooLong { param: ParamCode, max: usize },
    #[error("parameter {param} is out of range")]
    ParameterOutOfRange { param: ParamCode },
    #[error("mandatory parameter {0} is missing")]
    MissingMandatoryParameter(ParamCode),
    #[error("parameters {0} and {1} are mutually exclusive")]
    ConflictingParameters(ParamCode, ParamCode),
}

/// A validated client-side message: an opcode and its parameter blocks in
/// transmission order. Packet number and checksum are applied at
/// serialization time by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    opcode: OpCode,
    params: Vec<Param>,
}

impl Command {
    fn new(opcode: OpCode, params: Vec<Param>) -> Self {
        Self { opcode, params }
    }

    pub fn opcode(&self) -> OpCode {
        self.opcode
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Construct a login (opcode 01).
    ///
    /// `sub_addr` distinguishes application instances sharing one account;
    /// `window_size` is the submit window the client asks for.
    pub fn login(
        user_id: &str,
        password: &str,
        sub_addr: Option<u16>,
        window_size: Option<u8>,
    ) -> Result<Self, CommandError> {
        if user_id.len() > 32 {
            return Err(CommandError::ParameterTooLong {
                param: ParamCode::UserId,
                max: 32,
            });
        }
        if password.len() > 32 {
            return Err(CommandError::ParameterTooLong {
                param: ParamCode::Password,
                max: 32,
            });
        }

        let mut params = vec![
            Param::new(ParamCode::UserId, user_id),
            Param::new(ParamCode::Password, password),
        ];
        if let Some(sub_addr) = sub_addr {
            if sub_addr > 999 {
                return Err(CommandError::ParameterTooLong {
                    param: ParamCode::SubAddr,
                    max: 3,
                });
            }
            params.push(Param::new(ParamCode::SubAddr, sub_addr.to_string()));
        }
        if let Some(window_size) = window_size {
            if window_size == 0 {
                return Err(CommandError::ParameterOutOfRange {
                    param: ParamCode::WindowSize,
                });
            }
            if window_size > 128 {
                return Err(CommandError::ParameterTooLong {
                    param: ParamCode::WindowSize,
                    max: 128,
                });
            }
            params.push(Param::new(ParamCode::WindowSize, window_size.to_string()));
        }
        Ok(Self::new(OpCode::Login, params))
    }

    /// Construct a logout (opcode 02).
    pub fn logout() -> Self {
        Self::new(OpCode::Logout, Vec::new())
    }

    /// Construct a submit (opcode 03) from an encoded parameter list.
    ///
    /// At least one destination address must be present.
    pub fn submit(params: Vec<Param>) -> Result<Self, CommandError> {
        if find(&params, ParamCode::DestAddr).is_none() {
            return Err(CommandError::MissingMandatoryParameter(ParamCode::DestAddr));
        }
        Ok(Self::new(OpCode::SubmitMessage, params))
    }

    /// Construct an enquire-message-status (opcode 04).
    pub fn enquire_status(dest_addr: &str, serv_centre_timestamp: &str) -> Self {
        Self::new(
            OpCode::EnquireMessageStatus,
            vec![
                Param::new(ParamCode::DestAddr, dest_addr),
                Param::new(ParamCode::ServCentreTimestamp, serv_centre_timestamp),
            ],
        )
    }

    /// Construct a delivery request (opcode 05). `mode` is 0 (one message),
    /// 1 (all messages) or 2 (count only).
    pub fn delivery_request(mode: u8) -> Result<Self, CommandError> {
        if mode > 2 {
            return Err(CommandError::ParameterOutOfRange {
                param: ParamCode::DeliReqMode,
            });
        }
        Ok(Self::new(
            OpCode::DeliveryRequest,
            vec![Param::new(ParamCode::DeliReqMode, mode.to_string())],
        ))
    }

    /// Construct a cancel (opcode 06).
    ///
    /// Mode 0 cancels all messages to one address and requires `dest_addr`;
    /// mode 2 cancels a single message and requires both `dest_addr` and
    /// `serv_centre_timestamp`; mode 1 cancels everything and accepts both.
    pub fn cancel(
        mode: u8,
        dest_addr: Option<&str>,
        serv_centre_timestamp: Option<&str>,
    ) -> Result<Self, CommandError> {
        if mode > 2 {
            return Err(CommandError::ParameterOutOfRange {
                param: ParamCode::CancelMode,
            });
        }
        if mode == 0 && dest_addr.is_none() {
            return Err(CommandError::MissingMandatoryParameter(ParamCode::DestAddr));
        }
        if mode == 2 {
            if dest_addr.is_none() {
                return Err(CommandError::MissingMandatoryParameter(ParamCode::DestAddr));
            }
            if serv_centre_timestamp.is_none() {
                return Err(CommandError::MissingMandatoryParameter(
                    ParamCode::ServCentreTimestamp,
                ));
            }
        }

        let mut params = vec![Param::new(ParamCode::CancelMode, mode.to_string())];
        if let Some(dest_addr) = dest_addr {
            params.push(Param::new(ParamCode::DestAddr, dest_addr));
        }
        if let Some(timestamp) = serv_centre_timestamp {
            params.push(Param::new(ParamCode::ServCentreTimestamp, timestamp));
        }
        Ok(Self::new(OpCode::CancelMessage, params))
    }

    /// Construct a deliver (opcode 20). SMSC-originated; offered for
    /// symmetry and for fake-peer test harnesses.
    pub fn deliver(params: Vec<Param>) -> Result<Self, CommandError> {
        for required in [
            ParamCode::DestAddr,
            ParamCode::OrigAddr,
            ParamCode::ServCentreTimestamp,
        ] {
            if find(&params, required).is_none() {
                return Err(CommandError::MissingMandatoryParameter(required));
            }
        }
        Ok(Self::new(OpCode::DeliverMessage, params))
    }

    /// Construct a deliver-status-report (opcode 23). SMSC-originated.
    pub fn deliver_status_report(params: Vec<Param>) -> Result<Self, CommandError> {
        for required in [
            ParamCode::DestAddr,
            ParamCode::ServCentreTimestamp,
            ParamCode::StatusCode,
            ParamCode::DischargeTime,
        ] {
            if find(&params, required).is_none() {
                return Err(CommandError::MissingMandatoryParameter(required));
            }
        }
        Ok(Self::new(OpCode::DeliverStatusReport, params))
    }

    /// Construct a set-parameter (opcode 08).
    pub fn set_param(symbol: ParamCode, value: impl Into<String>) -> Self {
        Self::new(OpCode::Set, vec![Param::new(symbol, value)])
    }

    /// Construct a get-parameter (opcode 09). Parameter 500 carries the
    /// three-digit code of the symbol being queried.
    pub fn get_param(symbol: ParamCode) -> Self {
        Self::new(
            OpCode::Get,
            vec![Param::new(ParamCode::GetParam, symbol.to_string())],
        )
    }

    /// Construct an alive (opcode 40).
    pub fn alive() -> Self {
        Self::new(OpCode::Alive, Vec::new())
    }
}

/// The optional field set shared by submit, deliver and status-report
/// messages.
///
/// Fill in what the message needs and call [`MessageParams::into_params`];
/// fields are emitted in the catalog order the centre expects. Integer
/// fields are rendered base-10.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageParams {
    pub dest_addr: Option<String>,
    pub orig_addr: Option<String>,
    pub orig_imsi: Option<String>,
    /// At most 11 characters, alphanumerics and space.
    pub alpha_orig_addr: Option<String>,
    pub orig_vmsc_addr: Option<String>,
    pub data_coding_scheme: Option<u8>,
    pub user_data_header: Option<String>,
    /// Excludes `user_data_binary`.
    pub user_data: Option<String>,
    /// Excludes `user_data`.
    pub user_data_binary: Option<String>,
    pub more_msgs: Option<u8>,
    /// Excludes `validity_period_abs`.
    pub validity_period_rel: Option<u8>,
    /// Excludes `validity_period_rel`.
    pub validity_period_abs: Option<String>,
    pub protocol_id: Option<u8>,
    /// Excludes `first_deli_time_abs`.
    pub first_deli_time_rel: Option<u8>,
    /// Excludes `first_deli_time_rel`.
    pub first_deli_time_abs: Option<String>,
    pub reply_path: Option<u8>,
    pub status_report_req: Option<u8>,
    pub cancel_enabled: Option<u8>,
    /// `yymmddhhmmss`.
    pub serv_centre_timestamp: Option<String>,
    pub tariff_class: Option<String>,
    pub service_descr: Option<String>,
    pub priority: Option<u8>,
    pub serv_centre_addr: Option<String>,
    pub status_code: Option<u8>,
    /// `yymmddhhmmss`.
    pub discharge_time: Option<String>,
}

impl MessageParams {
    /// Validate the field combination and render the ordered parameter
    /// list.
    pub fn into_params(self) -> Result<Vec<Param>, CommandError> {
        if self.user_data.is_some() && self.user_data_binary.is_some() {
            return Err(CommandError::ConflictingParameters(
                ParamCode::UserData,
                ParamCode::UserDataBinary,
            ));
        }
        if self.validity_period_rel.is_some() && self.validity_period_abs.is_some() {
            return Err(CommandError::ConflictingParameters(
                ParamCode::ValidityPeriodRel,
                ParamCode::ValidityPeriodAbs,
            ));
        }
        if self.first_deli_time_rel.is_some() && self.first_deli_time_abs.is_some() {
            return Err(CommandError::ConflictingParameters(
                ParamCode::FirstDeliTimeRel,
                ParamCode::FirstDeliTimeAbs,
            ));
        }
        if let Some(alpha) = &self.alpha_orig_addr {
            if alpha.len() > 11 {
                return Err(CommandError::ParameterTooLong {
                    param: ParamCode::AlphaOrigAddr,
                    max: 11,
                });
            }
        }

        let mut params = Vec::new();
        let mut push_text = |code: ParamCode, value: Option<String>| {
            if let Some(value) = value {
                params.push(Param::new(code, value));
            }
        };

        push_text(ParamCode::DestAddr, self.dest_addr);
        push_text(ParamCode::OrigAddr, self.orig_addr);
        push_text(ParamCode::OrigImsi, self.orig_imsi);
        push_text(ParamCode::AlphaOrigAddr, self.alpha_orig_addr);
        push_text(ParamCode::OrigVmscAddr, self.orig_vmsc_addr);
        push_text(
            ParamCode::DataCodingScheme,
            self.data_coding_scheme.map(|v| v.to_string()),
        );
        push_text(ParamCode::UserDataHeader, self.user_data_header);
        push_text(ParamCode::UserData, self.user_data);
        push_text(ParamCode::UserDataBinary, self.user_data_binary);
        push_text(ParamCode::MoreMsgs, self.more_msgs.map(|v| v.to_string()));
        push_text(
            ParamCode::ValidityPeriodRel,
            self.validity_period_rel.map(|v| v.to_string()),
        );
        push_text(ParamCode::ValidityPeriodAbs, self.validity_period_abs);
        push_text(
            ParamCode::ProtocolId,
            self.protocol_id.map(|v| v.to_string()),
        );
        push_text(
            ParamCode::FirstDeliTimeRel,
            self.first_deli_time_rel.map(|v| v.to_string()),
        );
        push_text(ParamCode::FirstDeliTimeAbs, self.first_deli_time_abs);
        push_text(ParamCode::ReplyPath, self.reply_path.map(|v| v.to_string()));
        push_text(
            ParamCode::StatusReportReq,
            self.status_report_req.map(|v| v.to_string()),
        );
        push_text(
            ParamCode::CancelEnabled,
            self.cancel_enabled.map(|v| v.to_string()),
        );
        push_text(ParamCode::ServCentreTimestamp, self.serv_centre_timestamp);
        push_text(ParamCode::TariffClass, self.tariff_class);
        push_text(ParamCode::ServiceDescr, self.service_descr);
        push_text(ParamCode::Priority, self.priority.map(|v| v.to_string()));
        push_text(ParamCode::ServCentreAddr, self.serv_centre_addr);
        push_text(
            ParamCode::StatusCode,
            self.status_code.map(|v| v.to_string()),
        );
        push_text(ParamCode::DischargeTime, self.discharge_time);

        Ok(params)
    }
}
