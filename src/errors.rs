use crate::protocol::RecordType;

/// Errors that can occur while decoding a DNS message.
///
/// Every variant is terminal: the first failure in buffer order aborts the
/// whole decode and no partial message is produced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("truncated at offset {offset}: need {needed} bytes, have {available}")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("offset {offset} is outside the {len} byte message")]
    OutOfBounds { offset: usize, len: usize },

    #[error("compression pointer loop at offset {offset}")]
    CompressionLoop { offset: usize },

    #[error("name starting at offset {offset} exceeds 255 octets")]
    NameTooLong { offset: usize },

    #[error("reserved label type 0x{byte:02x} at offset {offset}")]
    InvalidLabelType { offset: usize, byte: u8 },

    #[error("{record_type} rdata of {rdlength} bytes is malformed")]
    Malformed {
        record_type: RecordType,
        rdlength: u16,
    },

    #[error("{remaining} unexpected bytes after the last record at offset {offset}")]
    TrailingBytes { offset: usize, remaining: usize },
}

/// Errors that can occur during DNS message codec operations
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("Frame of {size} bytes exceeds the {max} byte limit")]
    FrameTooLarge { size: usize, max: usize },

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
