//! # triex-codec: Wire Format
//!
//! Every message on the socket is a frame: an 8-byte big-endian length
//! followed by exactly that many payload bytes. Request payloads carry the
//! `(operation, argument)` tuple; response payloads are UTF-8 text.

pub mod frame;
pub mod payload;

pub use frame::{encode_frame, read_frame, write_frame, HEADER_LEN};
pub use payload::{decode_reply, decode_request, encode_raw, encode_reply, encode_request};
