//! DNS message codec for tokio_util
//!
//! This module provides a Decoder implementation that hands complete DNS
//! messages to the wire decoder, either one per datagram or split out of a
//! TCP-style stream where each message carries a two-byte length prefix
//! (RFC 1035 section 4.2.2).

use bytes::{Buf, BytesMut};
use tokio_util::codec::Decoder;
use tracing::{debug, error};

use crate::errors::CodecError;
use crate::parsers::decode_message;
use crate::protocol::Message;

/// Largest message a two-byte length prefix can announce.
pub const MAX_MESSAGE_SIZE: usize = u16::MAX as usize;

const LENGTH_PREFIX: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// Each buffer handed to `decode` is exactly one whole message, as
    /// received from a datagram socket. There is no boundary on a byte
    /// stream, so this mode does not belong under `FramedRead` over a
    /// reader: a partial read would be decoded as a short message. Read the
    /// whole input first, or use `LengthPrefixed`.
    Datagram,
    /// Messages follow each other, each prefixed by its big-endian length.
    LengthPrefixed,
}

/// DNS message codec for use with tokio_util framed streams
#[derive(Debug, Clone)]
pub struct DnsCodec {
    framing: Framing,
    max_message_size: usize,
}

impl DnsCodec {
    pub fn new(framing: Framing) -> Self {
        Self {
            framing,
            max_message_size: MAX_MESSAGE_SIZE,
        }
    }

    pub fn datagram() -> Self {
        Self::new(Framing::Datagram)
    }

    pub fn length_prefixed() -> Self {
        Self::new(Framing::LengthPrefixed)
    }

    /// Reject messages larger than `max` before decoding them.
    pub fn with_max_message_size(mut self, max: usize) -> Self {
        self.max_message_size = max;
        self
    }

    pub fn framing(&self) -> Framing {
        self.framing
    }

    fn check_size(&self, size: usize) -> Result<(), CodecError> {
        if size > self.max_message_size {
            return Err(CodecError::FrameTooLarge {
                size,
                max: self.max_message_size,
            });
        }
        Ok(())
    }

    fn decode_frame(&self, frame: &[u8]) -> Result<Message, CodecError> {
        match decode_message(frame) {
            Ok(message) => {
                debug!(
                    "Decoded DNS message {} from {} bytes",
                    message.id(),
                    frame.len()
                );
                Ok(message)
            }
            Err(e) => {
                error!("DNS decoding error: {}", e);
                Err(e.into())
            }
        }
    }
}

impl Default for DnsCodec {
    fn default() -> Self {
        Self::datagram()
    }
}

impl Decoder for DnsCodec {
    type Item = Message;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.framing {
            Framing::Datagram => {
                if src.is_empty() {
                    return Ok(None);
                }
                let size = src.len();
                // A datagram is consumed whole, even when it is rejected.
                let frame = src.split_to(size);
                self.check_size(size)?;
                self.decode_frame(&frame).map(Some)
            }
            Framing::LengthPrefixed => {
                if src.len() < LENGTH_PREFIX {
                    return Ok(None);
                }

                let size = u16::from_be_bytes([src[0], src[1]]) as usize;
                self.check_size(size)?;

                if src.len() < LENGTH_PREFIX + size {
                    debug!(
                        "Incomplete DNS frame, need {} bytes, have {}",
                        LENGTH_PREFIX + size,
                        src.len()
                    );
                    src.reserve(LENGTH_PREFIX + size - src.len());
                    return Ok(None);
                }

                src.advance(LENGTH_PREFIX);
                let frame = src.split_to(size);
                self.decode_frame(&frame).map(Some)
            }
        }
    }
}
