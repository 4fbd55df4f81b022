//! Wire-format decoding, leaf first: a bounds-checked cursor, name
//! decompression, the fixed header, single records, and the whole message.

pub mod cursor;
pub mod header;
pub mod message;
pub mod name;
pub mod record;

pub use message::decode_message;
