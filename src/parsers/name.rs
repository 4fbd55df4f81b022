use std::collections::HashSet;
use std::fmt;

use tracing::trace;

use super::cursor::ByteCursor;
use crate::errors::DecodeError;

/// Longest name on the wire, length octets and root terminator included.
pub const MAX_NAME_LEN: usize = 255;

const POINTER_MASK: u8 = 0b1100_0000;

/// A decompressed domain name.
///
/// Labels are kept as decoded; non-UTF-8 bytes are replaced lossily.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct DomainName {
    labels: Vec<String>,
}

impl DomainName {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn from_labels(labels: Vec<String>) -> Self {
        DomainName { labels }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn is_root(&self) -> bool {
        self.labels.is_empty()
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return f.write_str(".");
        }
        f.write_str(&self.labels.join("."))
    }
}

impl PartialEq<str> for DomainName {
    fn eq(&self, other: &str) -> bool {
        self.to_string() == other
    }
}

impl PartialEq<&str> for DomainName {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

/// Decode the name at the cursor, following compression pointers anywhere
/// in the packet.
///
/// On success the cursor sits right after the name as stored in place: past
/// the root terminator, or past the first two-byte pointer if the name was
/// compressed. Jumps only move a private read position.
pub fn decode_name(cursor: &mut ByteCursor<'_>) -> Result<DomainName, DecodeError> {
    let end = cursor.packet().len();
    decode_name_within(cursor, end)
}

/// Like [`decode_name`], but the in-place part of the name must end before
/// `limit`. Reaching `limit` without a terminator or pointer is `Truncated`
/// at that point. Pointer targets still resolve against the whole packet.
pub fn decode_name_within(
    cursor: &mut ByteCursor<'_>,
    limit: usize,
) -> Result<DomainName, DecodeError> {
    let limit = limit.min(cursor.packet().len());
    let start = cursor.position();
    let mut position = start;
    let mut resume_at: Option<usize> = None;
    let mut visited = HashSet::new();
    let mut labels = Vec::new();
    let mut wire_len = 0;

    loop {
        let jumped = resume_at.is_some();
        let length = byte_at(cursor, position, limit, jumped)?;

        match length & POINTER_MASK {
            0b0000_0000 if length == 0 => {
                wire_len += 1;
                if wire_len > MAX_NAME_LEN {
                    return Err(DecodeError::NameTooLong { offset: start });
                }
                position += 1;
                break;
            }
            0b0000_0000 => {
                let label_start = position + 1;
                let label_end = label_start + length as usize;
                if label_end > bound(cursor, limit, jumped) {
                    return Err(past_end(
                        cursor,
                        label_start,
                        length as usize,
                        limit,
                        jumped,
                    ));
                }

                // Leave room for the root terminator that has to follow.
                wire_len += 1 + length as usize;
                if wire_len + 1 > MAX_NAME_LEN {
                    return Err(DecodeError::NameTooLong { offset: start });
                }

                let label = &cursor.packet()[label_start..label_end];
                labels.push(String::from_utf8_lossy(label).into_owned());
                position = label_end;
            }
            POINTER_MASK => {
                let low = byte_at(cursor, position + 1, limit, jumped)?;
                let target = (((length & !POINTER_MASK) as usize) << 8) | low as usize;

                if resume_at.is_none() {
                    resume_at = Some(position + 2);
                }
                if target >= cursor.packet().len() {
                    return Err(DecodeError::OutOfBounds {
                        offset: target,
                        len: cursor.packet().len(),
                    });
                }
                if !visited.insert(target) {
                    return Err(DecodeError::CompressionLoop { offset: position });
                }

                trace!(from = position, to = target, "following compression pointer");
                position = target;
            }
            _ => {
                return Err(DecodeError::InvalidLabelType {
                    offset: position,
                    byte: length,
                })
            }
        }
    }

    cursor.seek(resume_at.unwrap_or(position))?;
    Ok(DomainName::from_labels(labels))
}

// In place, reads stop at `limit`; after a jump, at the packet end.
fn bound(cursor: &ByteCursor<'_>, limit: usize, jumped: bool) -> usize {
    if jumped {
        cursor.packet().len()
    } else {
        limit
    }
}

fn byte_at(
    cursor: &ByteCursor<'_>,
    offset: usize,
    limit: usize,
    jumped: bool,
) -> Result<u8, DecodeError> {
    if offset >= bound(cursor, limit, jumped) {
        return Err(past_end(cursor, offset, 1, limit, jumped));
    }
    cursor.peek_at(offset)
}

// Running off the end in place means the name was cut short; after a jump
// it means the pointer led somewhere the packet does not cover.
fn past_end(
    cursor: &ByteCursor<'_>,
    offset: usize,
    needed: usize,
    limit: usize,
    jumped: bool,
) -> DecodeError {
    if jumped {
        DecodeError::OutOfBounds {
            offset: offset + needed,
            len: cursor.packet().len(),
        }
    } else {
        DecodeError::Truncated {
            offset,
            needed,
            available: limit.saturating_sub(offset),
        }
    }
}
