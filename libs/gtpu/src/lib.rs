//! lib - encode and decode the GTP-U packets that carry userplane traffic (TS29.281)

mod header;
mod teid;

pub use header::{
    DecodeError, EncodeError, GTPU_PORT, HEADER_LEN, LengthCheck, MAX_PAYLOAD, MESSAGE_TYPE_GPDU,
    decode, encode,
};
pub use teid::Teid;
