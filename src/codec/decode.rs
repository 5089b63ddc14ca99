//! Frame parsing and parameter extraction.

use nom::{
    bytes::complete::{tag, take_while, take_while_m_n},
    combinator::{all_consuming, map},
    multi::many0,
    sequence::{pair, preceded, separated_pair, terminated},
    IResult,
};
use thiserror::Error;

use cimd_types::{
    core::{ETX, NUL, STX, TAB},
    frame::Frame,
    opcode::OpCode,
    param::{Param, ParamCode},
};

use super::encode::checksum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The input does not yet hold a complete frame.
    #[error("frame is incomplete")]
    Incomplete,
    /// The input is not a well-formed frame.
    #[error("frame is malformed")]
    Failed,
    /// The trailer checksum does not cover the received bytes. Carried
    /// checksums are two uppercase hex digits.
    #[error("checksum mismatch: frame carries {carried:02X}, computed {computed:02X}")]
    ChecksumMismatch { carried: u8, computed: u8 },
    #[error("unknown opcode {0:02}")]
    UnknownOpcode(u8),
    /// A parameter value holds bytes outside UTF-8.
    #[error("frame is not valid UTF-8")]
    BadUtf8,
}

/// Parse one complete frame, from STX through ETX.
///
/// When the byte before ETX is not the final TAB, the two bytes after that
/// TAB are taken as the carried checksum and verified over the prefix.
/// Parameters with codes outside the dictionary are dropped;
/// [`extract_all_param_values`] still surfaces them raw.
pub fn parse_frame(input: &[u8]) -> Result<Frame, DecodeError> {
    let body = match input.split_last() {
        Some((&ETX, body)) => body,
        Some(_) => return Err(DecodeError::Incomplete),
        None => return Err(DecodeError::Incomplete),
    };

    let content = match body.last() {
        Some(&TAB) => body,
        Some(_) if body.len() >= 3 => {
            let (prefix, hex) = body.split_at(body.len() - 2);
            if prefix.last() != Some(&TAB) {
                return Err(DecodeError::Failed);
            }
            let carried = parse_hex2(hex)?;
            let computed = checksum(prefix);
            if carried != computed {
                return Err(DecodeError::ChecksumMismatch { carried, computed });
            }
            prefix
        }
        _ => return Err(DecodeError::Failed),
    };

    let (_, ((opcode, packet_number), raw_params)) =
        all_consuming(pair(frame_header, many0(param_block)))(content).map_err(
            |error: nom::Err<nom::error::Error<&[u8]>>| match error {
                nom::Err::Incomplete(_) => DecodeError::Incomplete,
                nom::Err::Error(_) | nom::Err::Failure(_) => DecodeError::Failed,
            },
        )?;

    let opcode =
        OpCode::from_code(opcode as u8).ok_or(DecodeError::UnknownOpcode(opcode as u8))?;
    let packet_number = u8::try_from(packet_number).map_err(|_| DecodeError::Failed)?;

    let mut params = Vec::with_capacity(raw_params.len());
    for (code, value) in raw_params {
        let value = std::str::from_utf8(value).map_err(|_| DecodeError::BadUtf8)?;
        match ParamCode::from_code(code) {
            Some(code) => params.push(Param::new(code, value)),
            None => log::debug!("dropping parameter with unknown code {code:03}"),
        }
    }

    Ok(Frame::new(opcode, packet_number, params))
}

/// `STX OO ":" PPP TAB`
fn frame_header(input: &[u8]) -> IResult<&[u8], (u16, u16)> {
    terminated(
        preceded(
            tag(b"\x02"),
            separated_pair(digits(2), tag(b":"), digits(3)),
        ),
        tag(b"\t"),
    )(input)
}

/// `ccc ":" value TAB`
fn param_block(input: &[u8]) -> IResult<&[u8], (u16, &[u8])> {
    terminated(
        separated_pair(digits(3), tag(b":"), take_while(is_value_byte)),
        tag(b"\t"),
    )(input)
}

fn digits<'a>(width: usize) -> impl FnMut(&'a [u8]) -> IResult<&'a [u8], u16> {
    map(
        take_while_m_n(width, width, |byte: u8| byte.is_ascii_digit()),
        |digits: &[u8]| {
            digits
                .iter()
                .fold(0u16, |acc, byte| acc * 10 + u16::from(byte - b'0'))
        },
    )
}

fn is_value_byte(byte: u8) -> bool {
    !matches!(byte, NUL | STX | ETX | TAB)
}

fn parse_hex2(hex: &[u8]) -> Result<u8, DecodeError> {
    match (hex_value(hex[0]), hex_value(hex[1])) {
        (Some(hi), Some(lo)) => Ok(hi << 4 | lo),
        _ => Err(DecodeError::Failed),
    }
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

/// Value of `code` in a raw frame: the bytes between `TAB ccc ":"` and the
/// next control byte.
///
/// The scan is structural, so a code can match neither the opcode position
/// nor a value substring. Values run to the next delimiter and may contain
/// spaces and punctuation. Returns `None` on an empty frame or when the
/// code is absent.
pub fn extract_param_value(frame: &[u8], code: ParamCode) -> Option<&str> {
    let mut needle = [TAB, 0, 0, 0, b':'];
    let code = code.code();
    needle[1] = b'0' + (code / 100) as u8;
    needle[2] = b'0' + (code / 10 % 10) as u8;
    needle[3] = b'0' + (code % 10) as u8;

    let start = frame
        .windows(needle.len())
        .position(|window| window == needle.as_slice())?
        + needle.len();
    value_at(frame, start)
}

/// Every `TAB ddd ":" value` occurrence of a raw frame, in textual order.
/// Unknown codes are included.
pub fn extract_all_param_values(frame: &[u8]) -> Vec<(u16, &str)> {
    let mut values = Vec::new();
    let mut cursor = 0;

    while cursor + 5 <= frame.len() {
        let window = &frame[cursor..cursor + 5];
        if window[0] == TAB
            && window[1].is_ascii_digit()
            && window[2].is_ascii_digit()
            && window[3].is_ascii_digit()
            && window[4] == b':'
        {
            let code = window[1..4]
                .iter()
                .fold(0u16, |acc, byte| acc * 10 + u16::from(byte - b'0'));
            let start = cursor + 5;
            let end = value_end(frame, start);
            if let Some(value) = value_at(frame, start) {
                values.push((code, value));
            }
            cursor = end;
        } else {
            cursor += 1;
        }
    }
    values
}

fn value_end(frame: &[u8], start: usize) -> usize {
    frame[start..]
        .iter()
        .position(|byte| *byte < 0x20)
        .map(|offset| start + offset)
        .unwrap_or(frame.len())
}

fn value_at(frame: &[u8], start: usize) -> Option<&str> {
    std::str::from_utf8(&frame[start..value_end(frame, start)]).ok()
}

#[cfg(test)]
mod tests {
    use cimd_types::{command::Command, core::PacketNumber};

    use super::*;
    use crate::codec::{escape, serialize};

    fn frame_bytes(text: &str) -> Vec<u8> {
        escape::encode(text).unwrap()
    }

    #[test]
    fn parses_what_serialize_produces() {
        let login = Command::login("name", "password", Some(3), None).unwrap();
        let bytes = serialize(&login, PacketNumber::FIRST, false);

        let frame = parse_frame(&bytes).unwrap();
        assert_eq!(frame.opcode(), OpCode::Login);
        assert_eq!(frame.packet_number(), 1);
        assert_eq!(frame.param(ParamCode::UserId), Some("name"));
        assert_eq!(frame.param(ParamCode::Password), Some("password"));
        assert_eq!(frame.param(ParamCode::SubAddr), Some("3"));
    }

    #[test]
    fn parses_a_checksummed_frame() {
        let alive = Command::alive();
        let bytes = serialize(&alive, PacketNumber::try_from(5u8).unwrap(), true);

        let frame = parse_frame(&bytes).unwrap();
        assert_eq!(frame.opcode(), OpCode::Alive);
        assert_eq!(frame.packet_number(), 5);
        assert!(frame.params().is_empty());
    }

    #[test]
    fn rejects_a_corrupted_checksum() {
        let alive = Command::alive();
        let mut bytes = serialize(&alive, PacketNumber::try_from(5u8).unwrap(), true);
        // Flip the packet number; the carried checksum no longer covers it.
        let position = bytes.iter().position(|b| *b == b'5').unwrap();
        bytes[position] = b'7';

        assert!(matches!(
            parse_frame(&bytes),
            Err(DecodeError::ChecksumMismatch { carried: 0x3E, .. })
        ));
    }

    #[test]
    fn malformed_frames() {
        let tests: [(&[u8], DecodeError); 7] = [
            (b"", DecodeError::Incomplete),
            (b"\x0240:005\x09", DecodeError::Incomplete),
            (b"\x0240:005\x09ZZ\x03", DecodeError::Failed),
            (b"\x0240:005ab\x03", DecodeError::Failed),
            (b"40:005\x09\x03", DecodeError::Failed),
            (b"\x0240:999\x09\x03", DecodeError::Failed),
            (b"\x0207:001\x09\x03", DecodeError::UnknownOpcode(7)),
        ];

        for (input, expected) in tests {
            let got = parse_frame(input);
            assert_eq!(Err(expected), got, "{:?}", escape::decode(input));
        }
    }

    #[test]
    fn unknown_parameter_codes_are_dropped_from_the_frame() {
        let bytes = frame_bytes("{STX}51:001{TAB}999:x{TAB}900:0{TAB}{ETX}");
        let frame = parse_frame(&bytes).unwrap();

        assert_eq!(frame.params().len(), 1);
        assert_eq!(frame.param(ParamCode::ErrorCode), Some("0"));
    }

    #[test]
    fn extracts_a_single_value() {
        let bytes = frame_bytes("{STX}03:001{TAB}021:123456789{TAB}033:sometext{TAB}{ETX}");

        assert_eq!(
            extract_param_value(&bytes, ParamCode::DestAddr),
            Some("123456789")
        );
        assert_eq!(
            extract_param_value(&bytes, ParamCode::UserData),
            Some("sometext")
        );
        assert_eq!(extract_param_value(&bytes, ParamCode::OrigAddr), None);
        assert_eq!(extract_param_value(b"", ParamCode::DestAddr), None);
    }

    #[test]
    fn extracted_values_keep_spaces() {
        let bytes = frame_bytes("{STX}20:002{TAB}021:123{TAB}027:JG 2006{TAB}{ETX}");

        assert_eq!(
            extract_param_value(&bytes, ParamCode::AlphaOrigAddr),
            Some("JG 2006")
        );
    }

    #[test]
    fn extracts_all_values_in_textual_order() {
        let bytes = frame_bytes("{STX}23:001{TAB}021:123{TAB}060:060927094900{TAB}061:1{TAB}{ETX}");

        assert_eq!(
            extract_all_param_values(&bytes),
            [(21, "123"), (60, "060927094900"), (61, "1")]
        );
        assert!(extract_all_param_values(b"").is_empty());
    }

    #[test]
    fn extraction_does_not_match_inside_values() {
        // "021:" appears inside the user data but not after a TAB.
        let bytes = frame_bytes("{STX}03:001{TAB}033:call 021:now{TAB}021:456{TAB}{ETX}");

        assert_eq!(extract_param_value(&bytes, ParamCode::DestAddr), Some("456"));
    }
}
