use nom::{
    bytes::complete::take,
    number::complete::{be_u16, be_u32, be_u8},
    IResult,
};

use crate::errors::DecodeError;

/// Bounds-checked read position over an immutable packet buffer.
///
/// Sequential reads go through nom's big-endian parsers against the
/// unread tail; absolute reads (`peek_at`) never move the position.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    packet: &'a [u8],
    position: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(packet: &'a [u8]) -> Self {
        Self::at(packet, 0)
    }

    pub fn at(packet: &'a [u8], position: usize) -> Self {
        ByteCursor {
            packet,
            position: position.min(packet.len()),
        }
    }

    /// The whole buffer, for absolute lookups.
    pub fn packet(&self) -> &'a [u8] {
        self.packet
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.packet.len() - self.position
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Move to an absolute offset, which may be at most the buffer end.
    pub fn seek(&mut self, position: usize) -> Result<(), DecodeError> {
        if position > self.packet.len() {
            return Err(DecodeError::OutOfBounds {
                offset: position,
                len: self.packet.len(),
            });
        }
        self.position = position;
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        self.parse(1, be_u8)
    }

    pub fn read_u16(&mut self) -> Result<u16, DecodeError> {
        self.parse(2, be_u16)
    }

    pub fn read_u32(&mut self) -> Result<u32, DecodeError> {
        self.parse(4, be_u32)
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        self.parse(len, take(len))
    }

    /// Absolute read that leaves the position untouched.
    pub fn peek_at(&self, offset: usize) -> Result<u8, DecodeError> {
        self.packet
            .get(offset)
            .copied()
            .ok_or(DecodeError::OutOfBounds {
                offset,
                len: self.packet.len(),
            })
    }

    fn parse<O, P>(&mut self, needed: usize, mut parser: P) -> Result<O, DecodeError>
    where
        P: FnMut(&'a [u8]) -> IResult<&'a [u8], O>,
    {
        let packet = self.packet;
        let input = &packet[self.position..];
        match parser(input) {
            Ok((rest, value)) => {
                self.position = packet.len() - rest.len();
                Ok(value)
            }
            Err(_) => Err(DecodeError::Truncated {
                offset: self.position,
                needed,
                available: input.len(),
            }),
        }
    }
}
