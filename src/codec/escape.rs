//! Brace-escape text form of framed bytes.
//!
//! Frames are control-byte delimited, so logs, tests and documentation
//! write them with the four delimiters spelled out: `{STX}01:001{TAB}...`.
//! [`encode`] turns that text into raw bytes, [`decode`] renders raw bytes
//! back.
//!
//! The two directions are deliberately not inverses: [`decode`] is a
//! diagnostic rendering that passes every printable byte through and drops
//! control bytes it has no name for, while [`encode`] is strict and rejects
//! escapes it does not know.

use thiserror::Error;

use cimd_types::core::{ETX, NUL, STX, TAB};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EscapeError {
    #[error("unknown escape `{0}` at byte {1}")]
    Unknown(String, usize),
    #[error("truncated escape at byte {0}")]
    Truncated(usize),
}

/// Convert brace-escaped text into raw bytes.
///
/// An escape is exactly five bytes: `{`, a three-letter name
/// (case-insensitive), `}`. Everything else is copied through.
pub fn encode(text: &str) -> Result<Vec<u8>, EscapeError> {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut cursor = 0;

    while cursor < bytes.len() {
        if bytes[cursor] != b'{' {
            out.push(bytes[cursor]);
            cursor += 1;
            continue;
        }

        if cursor + 5 > bytes.len() {
            return Err(EscapeError::Truncated(cursor));
        }
        let escape = &bytes[cursor..cursor + 5];
        let name = [
            escape[1].to_ascii_lowercase(),
            escape[2].to_ascii_lowercase(),
            escape[3].to_ascii_lowercase(),
        ];
        let byte = match (&name, escape[4]) {
            (b"nul", b'}') => NUL,
            (b"stx", b'}') => STX,
            (b"etx", b'}') => ETX,
            (b"tab", b'}') => TAB,
            _ => {
                return Err(EscapeError::Unknown(
                    String::from_utf8_lossy(escape).into_owned(),
                    cursor,
                ))
            }
        };
        out.push(byte);
        cursor += 5;
    }

    Ok(out)
}

/// Render raw bytes as brace-escaped text.
///
/// Printable bytes (above 0x1F) pass through, the four named delimiters
/// become their brace forms, and any other control byte is dropped.
pub fn decode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for &byte in bytes {
        match byte {
            NUL => out.push_str("{NUL}"),
            STX => out.push_str("{STX}"),
            ETX => out.push_str("{ETX}"),
            TAB => out.push_str("{TAB}"),
            byte if byte > 0x1F => out.push(char::from(byte)),
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_expands_escapes() {
        let tests: [(&str, &[u8]); 5] = [
            ("", b""),
            ("plain", b"plain"),
            ("{STX}01:001{TAB}{ETX}", b"\x0201:001\x09\x03"),
            ("{stx}{NuL}{tab}{etx}", b"\x02\x00\x09\x03"),
            ("a{TAB}b", b"a\x09b"),
        ];

        for (text, expected) in tests {
            assert_eq!(encode(text).as_deref(), Ok(expected), "{text:?}");
        }
    }

    #[test]
    fn encode_rejects_malformed_escapes() {
        assert_eq!(
            encode("{BEL}"),
            Err(EscapeError::Unknown("{BEL}".into(), 0))
        );
        assert_eq!(
            encode("ab{STX"),
            Err(EscapeError::Truncated(2))
        );
        assert_eq!(
            encode("{STXX"),
            Err(EscapeError::Unknown("{STXX".into(), 0))
        );
    }

    #[test]
    fn decode_names_delimiters_and_drops_the_rest() {
        assert_eq!(decode(b"\x0201:001\x09\x03"), "{STX}01:001{TAB}{ETX}");
        assert_eq!(decode(b"\x00ok\x07\x1f!"), "{NUL}ok!");
        assert_eq!(decode(b""), "");
    }

    #[test]
    fn encode_after_decode_is_stable() {
        // decode is lossy on unnamed control bytes, but once a byte string
        // survives a round trip it is a fixed point.
        for text in ["{STX}03:001{TAB}021:123{TAB}{ETX}", "user data 33", ""] {
            let encoded = encode(text).unwrap();
            let round_tripped = encode(&decode(&encoded)).unwrap();
            assert_eq!(round_tripped, encoded);
        }
    }
}
