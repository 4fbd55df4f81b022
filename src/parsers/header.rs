use super::cursor::ByteCursor;
use crate::errors::DecodeError;
use crate::protocol::{Flags, Header};

pub const HEADER_LEN: usize = 12;

/// Read the fixed 12-byte header. Any flag bit pattern is accepted.
pub fn decode_header(cursor: &mut ByteCursor<'_>) -> Result<Header, DecodeError> {
    if cursor.remaining() < HEADER_LEN {
        return Err(DecodeError::Truncated {
            offset: cursor.position(),
            needed: HEADER_LEN,
            available: cursor.remaining(),
        });
    }

    let id = cursor.read_u16()?;
    let flags = decode_flags(cursor.read_u16()?);
    let qdcount = cursor.read_u16()?;
    let ancount = cursor.read_u16()?;
    let nscount = cursor.read_u16()?;
    let arcount = cursor.read_u16()?;

    Ok(Header {
        id,
        flags,
        qdcount,
        ancount,
        nscount,
        arcount,
    })
}

pub fn decode_flags(flags: u16) -> Flags {
    Flags {
        // qr (Query/Response): bit 15
        is_response: (flags & 0x8000) != 0,
        // opcode: bits 11-14
        opcode: ((flags & 0x7800) >> 11) as u8,
        // aa (Authoritative Answer): bit 10
        authoritative: (flags & 0x0400) != 0,
        // tc (Truncated): bit 9
        truncated: (flags & 0x0200) != 0,
        // rd (Recursion Desired): bit 8
        recursion_desired: (flags & 0x0100) != 0,
        // ra (Recursion Available): bit 7
        recursion_available: (flags & 0x0080) != 0,
        // z (Reserved): bit 6
        z: (flags & 0x0040) != 0,
        // ad (Authentic Data): bit 5
        authentic_data: (flags & 0x0020) != 0,
        // cd (Checking Disabled): bit 4
        checking_disabled: (flags & 0x0010) != 0,
        // rcode (Response Code): bits 0-3
        response_code: (flags & 0x000F) as u8,
    }
}
