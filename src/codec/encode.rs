//! Frame serialization.

use cimd_types::{
    command::Command,
    core::{PacketNumber, ETX, STX, TAB},
    param::Param,
};

const HEX_UPPER: &[u8; 16] = b"0123456789ABCDEF";

/// 8-bit modular sum of all byte values.
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0, |sum, byte| sum.wrapping_add(*byte))
}

/// Append the frame header: `STX OO ":" PPP TAB`.
pub fn header(dst: &mut Vec<u8>, opcode: u8, packet_number: PacketNumber) {
    dst.push(STX);
    push_digits(dst, u16::from(opcode), 2);
    dst.push(b':');
    push_digits(dst, u16::from(packet_number.get()), 3);
    dst.push(TAB);
}

/// Append one parameter block: `ccc ":" value TAB`.
pub fn param_block(dst: &mut Vec<u8>, param: &Param) {
    push_digits(dst, param.code().code(), 3);
    dst.push(b':');
    dst.extend_from_slice(param.value().as_bytes());
    dst.push(TAB);
}

/// Append the trailer. With `use_checksum` the two uppercase hex digits of
/// the checksum over everything already in `dst` precede the ETX.
pub fn trailer(dst: &mut Vec<u8>, use_checksum: bool) {
    if use_checksum {
        let sum = checksum(dst);
        dst.push(HEX_UPPER[usize::from(sum >> 4)]);
        dst.push(HEX_UPPER[usize::from(sum & 0x0F)]);
    }
    dst.push(ETX);
}

/// Serialize a complete frame: header, the parameter blocks in their
/// construction order, trailer.
pub fn serialize(command: &Command, packet_number: PacketNumber, use_checksum: bool) -> Vec<u8> {
    let params_len: usize = command
        .params()
        .iter()
        .map(|param| param.value().len() + 5)
        .sum();
    let mut dst = Vec::with_capacity(8 + params_len + 3);

    header(&mut dst, command.opcode().code(), packet_number);
    for param in command.params() {
        param_block(&mut dst, param);
    }
    trailer(&mut dst, use_checksum);
    dst
}

fn push_digits(dst: &mut Vec<u8>, value: u16, width: u32) {
    for position in (0..width).rev() {
        let digit = (value / 10u16.pow(position)) % 10;
        dst.push(b'0' + digit as u8);
    }
}

#[cfg(test)]
mod tests {
    use cimd_types::{command::MessageParams, core::PacketCounter, param::ParamCode};

    use super::*;
    use crate::codec::escape;

    fn pn(n: u8) -> PacketNumber {
        PacketNumber::try_from(n).unwrap()
    }

    #[test]
    fn header_formation_follows_the_counter() {
        let mut counter = PacketCounter::new();
        counter.reset();

        let mut dst = Vec::new();
        header(&mut dst, 5, counter.advance());
        assert_eq!(escape::decode(&dst), "{STX}05:001{TAB}");

        let mut dst = Vec::new();
        header(&mut dst, 55, counter.advance());
        assert_eq!(escape::decode(&dst), "{STX}55:003{TAB}");

        // An explicit packet number leaves the counter untouched.
        let mut dst = Vec::new();
        header(&mut dst, 55, pn(9));
        assert_eq!(escape::decode(&dst), "{STX}55:009{TAB}");
        assert_eq!(counter.current().get(), 5);
    }

    #[test]
    fn checksum_is_a_modular_byte_sum() {
        assert_eq!(checksum(b"abc123"), 188);
        assert_eq!(checksum(b""), 0);
        assert_eq!(checksum(&[0xFF, 0x02]), 1);
    }

    #[test]
    fn trailer_renders_uppercase_hex() {
        let mut dst = b"abc123".to_vec();
        trailer(&mut dst, true);
        assert_eq!(escape::decode(&dst), "abc123BC{ETX}");

        let mut dst = b"abc123".to_vec();
        trailer(&mut dst, false);
        assert_eq!(escape::decode(&dst), "abc123{ETX}");
    }

    #[test]
    fn login_without_checksum() {
        let login = Command::login("name", "password", None, None).unwrap();
        let bytes = serialize(&login, pn(1), false);
        assert_eq!(
            escape::decode(&bytes),
            "{STX}01:001{TAB}010:name{TAB}011:password{TAB}{ETX}",
        );
    }

    #[test]
    fn login_with_checksum_and_optional_fields() {
        let login = Command::login("name", "password", Some(3), Some(3)).unwrap();
        let bytes = serialize(&login, pn(3), true);
        assert_eq!(
            escape::decode(&bytes),
            "{STX}01:003{TAB}010:name{TAB}011:password{TAB}012:3{TAB}019:3{TAB}0F{ETX}",
        );
    }

    #[test]
    fn submit_with_text() {
        let params = MessageParams {
            dest_addr: Some("123456789".into()),
            user_data: Some("sometext".into()),
            ..Default::default()
        }
        .into_params()
        .unwrap();
        let submit = Command::submit(params).unwrap();
        let bytes = serialize(&submit, pn(1), false);
        assert_eq!(
            escape::decode(&bytes),
            "{STX}03:001{TAB}021:123456789{TAB}033:sometext{TAB}{ETX}",
        );
    }

    #[test]
    fn deliver_status_report_frame() {
        let params = MessageParams {
            dest_addr: Some("123456789".into()),
            serv_centre_timestamp: Some("060927094900".into()),
            status_code: Some(1),
            discharge_time: Some("060927104900".into()),
            ..Default::default()
        }
        .into_params()
        .unwrap();
        let report = Command::deliver_status_report(params).unwrap();
        let bytes = serialize(&report, pn(1), false);
        assert_eq!(
            escape::decode(&bytes),
            "{STX}23:001{TAB}021:123456789{TAB}060:060927094900{TAB}061:1{TAB}063:060927104900{TAB}{ETX}",
        );
    }

    #[test]
    fn checksum_covers_the_full_prefix() {
        let alive = Command::alive();
        let bytes = serialize(&alive, pn(5), true);

        let end = bytes.len();
        let prefix = &bytes[..end - 3];
        let expected = format!("{:02X}", checksum(prefix));
        assert_eq!(&bytes[end - 3..end - 1], expected.as_bytes());
        assert_eq!(bytes[end - 1], ETX);
        assert_eq!(escape::decode(&bytes), "{STX}40:005{TAB}3E{ETX}");
    }

    #[test]
    fn get_param_frame() {
        let get = Command::get_param(ParamCode::McTime);
        let bytes = serialize(&get, pn(1), false);
        assert_eq!(escape::decode(&bytes), "{STX}09:001{TAB}500:501{TAB}{ETX}");
    }
}
