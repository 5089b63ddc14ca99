use std::io::Error as IoError;

use bytes::{Bytes, BytesMut};
use thiserror::Error;
use tokio_util::codec::{Decoder, Encoder};

use cimd_types::{core::ETX, frame::Frame};

use crate::codec::decode::{parse_frame, DecodeError};

const DEFAULT_MAX_FRAME_LENGTH: usize = 4096;

/// The connection starts with a banner line, then switches to
/// control-byte-delimited frames.
#[derive(Debug, Clone, PartialEq, Eq)]
enum FramingState {
    /// One LF-terminated line.
    ReadBanner,
    /// ETX-delimited frames from then on.
    ReadFrame,
}

/// Frame splitter for one connection in the client role.
///
/// A fresh codec expects the banner first; everything after it is parsed
/// as frames. The encoder side transmits pre-serialized frame bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCodec {
    state: FramingState,
    max_frame_length: usize,
}

impl ClientCodec {
    pub fn new() -> Self {
        Self::with_max_frame_length(DEFAULT_MAX_FRAME_LENGTH)
    }

    pub fn with_max_frame_length(max_frame_length: usize) -> Self {
        Self {
            state: FramingState::ReadBanner,
            max_frame_length,
        }
    }
}

impl Default for ClientCodec {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Error)]
pub enum ClientCodecError {
    #[error(transparent)]
    Io(#[from] IoError),
    #[error("no terminator within {max} bytes")]
    FrameTooLarge { max: usize },
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl PartialEq for ClientCodecError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Io(error1), Self::Io(error2)) => error1.kind() == error2.kind(),
            (Self::FrameTooLarge { max: max1 }, Self::FrameTooLarge { max: max2 }) => {
                max1 == max2
            }
            (Self::Decode(error1), Self::Decode(error2)) => error1 == error2,
            _ => false,
        }
    }
}

/// One inbound unit. Frames keep their raw bytes for observability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Banner(String),
    Frame { frame: Frame, raw: Bytes },
}

impl Decoder for ClientCodec {
    type Item = Event;
    type Error = ClientCodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let terminator = match self.state {
            FramingState::ReadBanner => b'\n',
            FramingState::ReadFrame => ETX,
        };

        let position = match src.iter().position(|byte| *byte == terminator) {
            Some(position) => position,
            None => {
                return if src.len() > self.max_frame_length {
                    Err(ClientCodecError::FrameTooLarge {
                        max: self.max_frame_length,
                    })
                } else {
                    Ok(None)
                };
            }
        };

        let raw = src.split_to(position + 1).freeze();
        match self.state {
            FramingState::ReadBanner => {
                let line = &raw[..raw.len() - 1];
                let line = line.strip_suffix(b"\r").unwrap_or(line);
                self.state = FramingState::ReadFrame;
                Ok(Some(Event::Banner(
                    String::from_utf8_lossy(line).into_owned(),
                )))
            }
            FramingState::ReadFrame => {
                let frame = parse_frame(&raw)?;
                Ok(Some(Event::Frame { frame, raw }))
            }
        }
    }
}

impl Encoder<Vec<u8>> for ClientCodec {
    type Error = ClientCodecError;

    fn encode(&mut self, item: Vec<u8>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.extend_from_slice(&item);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use cimd_types::{opcode::OpCode, param::ParamCode};

    use super::*;
    use crate::codec::escape;

    #[test]
    fn decoder_switches_from_banner_to_frames() {
        let tests: [(&[u8], Result<Option<Event>, ClientCodecError>); 6] = [
            (b"CIMD2-A ConnectionInfo: SessionId = 1234567", Ok(None)),
            (
                b" PIN = 99999\r\n",
                Ok(Some(Event::Banner(
                    "CIMD2-A ConnectionInfo: SessionId = 1234567 PIN = 99999".into(),
                ))),
            ),
            (b"\x0251:001\x09", Ok(None)),
            (b"900:0\x09", Ok(None)),
            (
                b"\x03",
                Ok(Some(Event::Frame {
                    frame: parse_frame(b"\x0251:001\x09900:0\x09\x03").unwrap(),
                    raw: Bytes::from_static(b"\x0251:001\x09900:0\x09\x03"),
                })),
            ),
            (b"", Ok(None)),
        ];

        let mut src = BytesMut::new();
        let mut codec = ClientCodec::new();

        for (chunk, expected) in tests {
            src.extend_from_slice(chunk);
            let got = codec.decode(&mut src);
            assert_eq!(expected, got, "{:?}", escape::decode(chunk));
        }
    }

    #[test]
    fn decoded_frames_expose_header_and_params() {
        let mut src = BytesMut::new();
        src.extend_from_slice(b"banner\n");
        src.extend_from_slice(&escape::encode("{STX}53:003{TAB}060:060927094900{TAB}{ETX}").unwrap());

        let mut codec = ClientCodec::new();
        codec.decode(&mut src).unwrap();

        match codec.decode(&mut src).unwrap() {
            Some(Event::Frame { frame, .. }) => {
                assert_eq!(frame.opcode(), OpCode::SubmitMessageResponse);
                assert_eq!(frame.packet_number(), 3);
                assert_eq!(
                    frame.param(ParamCode::ServCentreTimestamp),
                    Some("060927094900")
                );
            }
            other => panic!("expected a frame, got {other:?}"),
        }
    }

    #[test]
    fn decoder_reports_malformed_frames_and_recovers() {
        let mut src = BytesMut::new();
        src.extend_from_slice(b"banner\n");

        let mut codec = ClientCodec::new();
        codec.decode(&mut src).unwrap();

        src.extend_from_slice(b"junk\x03\x0290:001\x09\x03");
        assert_eq!(
            codec.decode(&mut src),
            Err(ClientCodecError::Decode(DecodeError::Failed)),
        );

        // The bad frame was consumed; the next one decodes.
        match codec.decode(&mut src) {
            Ok(Some(Event::Frame { frame, .. })) => {
                assert_eq!(frame.opcode(), OpCode::AliveResponse);
            }
            other => panic!("expected a frame, got {other:?}"),
        }
    }

    #[test]
    fn decoder_bounds_unterminated_input() {
        let mut src = BytesMut::new();
        let mut codec = ClientCodec::with_max_frame_length(16);

        src.extend_from_slice(b"0123456789abcdef!");
        assert_eq!(
            codec.decode(&mut src),
            Err(ClientCodecError::FrameTooLarge { max: 16 }),
        );
    }

    #[test]
    fn encoder_passes_serialized_bytes_through() {
        let mut codec = ClientCodec::new();
        let mut dst = BytesMut::new();

        codec.encode(b"\x0240:001\x09\x03".to_vec(), &mut dst).unwrap();
        assert_eq!(&dst[..], b"\x0240:001\x09\x03");
    }
}
