//! Error-text dictionaries of the SMSC.

/// Diagnostic text for a communication error code (parameter 900).
pub fn comm_error_text(code: u16) -> Option<&'static str> {
    Some(match code {
        // General
        0 => "No error",
        1 => "Unexpected operation",
        2 => "Syntax error",
        3 => "Unsupported parameter",
        4 => "Connection to MC lost",
        5 => "No response from MC",
        6 => "General system error",
        7 => "Cannot find information",
        8 => "Parameter formatting error",
        9 => "Requested operation failed",
        10 => "Temporary congestion error",
        // Login
        100 => "Invalid login",
        101 => "Incorrect access type",
        102 => "Too many users with this login ID",
        103 => "Login refused by SMSC",
        104 => "Invalid window size",
        105 => "Windowing disabled",
        106 => "Virtual SMS Center-based barring",
        107 => "Invalid subaddr",
        108 => "Alias account, login refused",
        // Submit message
        300 => "Incorrect destination address",
        301 => "Incorrect number of destination addresses",
        302 => "Syntax error in user data parameter",
        303 => "Incorrect bin/head/normal user data parameter combination",
        304 => "Incorrect dcs parameter usage",
        305 => "Incorrect validity period parameters usage",
        306 => "Incorrect originator address usage",
        307 => "Incorrect PID parameter usage",
        308 => "Incorrect first delivery parameter usage",
        309 => "Incorrect reply path usage",
        310 => "Incorrect status report request parameter usage",
        311 => "Incorrect cancel enabled parameter usage",
        312 => "Incorrect priority parameter usage",
        313 => "Incorrect tariff class parameter usage",
        314 => "Incorrect service description parameter usage",
        315 => "Incorrect transport type parameter usage",
        316 => "Incorrect message type parameter usage",
        318 => "Incorrect MMs parameter usage",
        319 => "Incorrect operation timer parameter usage",
        320 => "Incorrect dialogue ID parameter usage",
        321 => "Incorrect alpha originator address usage",
        322 => "Invalid data for alphanumeric originator",
        323 => "Online closed user group rejection",
        324 => "Licence expired",
        // Enquire message status
        400 => "Incorrect address parameter usage",
        401 => "Incorrect scts parameter usage",
        // Delivery request
        500 => "Incorrect scts parameter usage",
        501 => "Incorrect mode parameter usage",
        502 => "Incorrect parameter combination",
        // Cancel message
        600 => "Incorrect scts parameter usage",
        601 => "Incorrect address parameter usage",
        602 => "Incorrect mode parameter usage",
        603 => "Incorrect parameter combination",
        // Deliver message
        700 => "Delivery OK / waiting for delivery",
        710 => "Generic failure",
        711 => "Unsupported DCS",
        712 => "Unsupported UDH",
        730 => "Unknown subscriber",
        // Set
        800 => "Changing password failed",
        801 => "Changing password not allowed",
        // Get
        900 => "Unsupported item requested",
        _ => return None,
    })
}

/// Diagnostic text for a delivery status error code (parameter 061/062).
pub fn status_error_text(code: u16) -> Option<&'static str> {
    Some(match code {
        // SMSC
        0 => "No error",
        1 => "Unknown subscriber",
        9 => "Illegal subscriber",
        11 => "Teleservice not provisioned",
        13 => "Call barred",
        15 => "OCUG reject",
        19 => "No SMS support in MS",
        20 => "Error in MS",
        21 => "Facility not supported",
        22 => "Memory capacity exceeded",
        29 => "Absent subscriber",
        30 => "MS busy for MT-SMS",
        36 => "Network/Protocol failure",
        44 => "Illegal equipment",
        60 => "No paging response",
        61 => "GMSC congestion",
        63 => "HLR timeout",
        64 => "MSC/SGSN timeout",
        70 => "SMRSE/TCP error",
        72 => "MT congestion",
        75 => "GPRS suspended",
        80 => "No paging response via MSC",
        81 => "IMSI detached",
        82 => "Roaming restriction",
        83 => "Deregistered in HLR for GSM",
        84 => "Purged for GSM",
        85 => "No paging response via SGSN",
        86 => "GPRS detached",
        87 => "Deregistered in HLR for GPRS",
        88 => "The MS purged for GPRS",
        89 => "Unidentified subscriber via MSC",
        90 => "Unidentified subscriber via SGSN",
        112 => "Originator missing credit on prepaid account",
        113 => "Destination missing credit on prepaid account",
        114 => "Error in prepaid system",
        // USSD centre connection
        750 => "Release, call barred",
        751 => "Release, system failure",
        752 => "Release, data missing",
        753 => "Release, unexpected data value",
        754 => "Release, absent subscriber",
        755 => "Release, illegal subscriber",
        756 => "Release, illegal equipment",
        757 => "Release, unknown alphabet",
        758 => "Release, USSD busy",
        759 => "Release, operation timer expired",
        760 => "Release, unexpected primitive",
        761 => "Release, wait timer expired",
        762 => "Release, data error",
        763 => "Release, too long USSD data",
        764 => "Release, unknown MS address",
        765 => "Release, network congestion",
        766 => "Release, internal congestion",
        767 => "Release, no network connection",
        768 => "Release, USSD not supported",
        _ => return None,
    })
}
