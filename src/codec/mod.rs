//! Wire form of CIMD2 frames: serialization, parsing, checksums and the
//! brace-escape diagnostic rendering.

pub mod decode;
pub mod encode;
pub mod escape;

pub use decode::{extract_all_param_values, extract_param_value, parse_frame, DecodeError};
pub use encode::{checksum, serialize};
