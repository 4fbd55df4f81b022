//! Decode raw DNS messages (queries or responses, as carried over UDP or
//! TCP) into an owned, printable [`Message`].
//!
//! ```
//! let packet = [
//!     0xF2, 0xEB, 0x01, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
//!     0x03, b'w', b'w', b'w', 0x07, b'e', b'x', b'a', b'm', b'p', b'l', b'e', 0x00,
//!     0x00, 0x01, 0x00, 0x01,
//! ];
//! let message = dns_inspect::Message::decode(&packet).unwrap();
//! assert_eq!(message.id(), 0xF2EB);
//! ```

pub mod codec;
pub mod errors;
pub mod parsers;
pub mod protocol;

#[cfg(test)]
mod fixtures;

pub use errors::{CodecError, DecodeError};
pub use parsers::name::DomainName;
pub use protocol::{Flags, Message, QueryClass, RdataValue, Record, RecordType, SectionKind};
