// DNS message data model and its text rendering

use std::collections::BTreeMap;
use std::fmt;
use std::net::Ipv4Addr;

use crate::parsers::name::DomainName;

/// Header flag bits, decoded from the 16-bit flags word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Flags {
    pub is_response: bool,         // QR, bit 15
    pub opcode: u8,                // 4 bits, bits 14-11
    pub authoritative: bool,       // AA, bit 10
    pub truncated: bool,           // TC, bit 9
    pub recursion_desired: bool,   // RD, bit 8
    pub recursion_available: bool, // RA, bit 7
    pub z: bool,                   // reserved, bit 6
    pub authentic_data: bool,      // AD, bit 5
    pub checking_disabled: bool,   // CD, bit 4
    pub response_code: u8,         // 4 bits, bits 3-0
}

impl Flags {
    pub fn opcode_name(&self) -> &'static str {
        match self.opcode {
            0 => "QUERY",
            1 => "IQUERY",
            2 => "STATUS",
            4 => "NOTIFY",
            5 => "UPDATE",
            _ => "RESERVED",
        }
    }

    pub fn response_code_name(&self) -> &'static str {
        match self.response_code {
            0 => "NOERROR",
            1 => "FORMERR",
            2 => "SERVFAIL",
            3 => "NXDOMAIN",
            4 => "NOTIMP",
            5 => "REFUSED",
            _ => "UNKNOWN",
        }
    }
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Headers:")?;
        writeln!(
            f,
            "  Type               : {}",
            if self.is_response { "answer" } else { "question" }
        )?;
        writeln!(f, "  Opcode             : {}", self.opcode)?;
        writeln!(f, "  Authoritative      : {}", self.authoritative)?;
        writeln!(f, "  Truncated          : {}", self.truncated)?;
        writeln!(f, "  Recursion Desired  : {}", self.recursion_desired)?;
        writeln!(f, "  Recursion Available: {}", self.recursion_available)?;
        write!(f, "  Response Code      : {}", self.response_code)
    }
}

/// The fixed 12-byte message header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub id: u16,
    pub flags: Flags,
    pub qdcount: u16,
    pub ancount: u16,
    pub nscount: u16,
    pub arcount: u16,
}

impl Header {
    /// Declared record count for a section.
    pub fn count(&self, kind: SectionKind) -> u16 {
        match kind {
            SectionKind::Question => self.qdcount,
            SectionKind::Answer => self.ancount,
            SectionKind::Authority => self.nscount,
            SectionKind::Additional => self.arcount,
        }
    }
}

/// The four record sections, ordered as they appear on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SectionKind {
    Question,
    Answer,
    Authority,
    Additional,
}

impl SectionKind {
    pub const ALL: [SectionKind; 4] = [
        SectionKind::Question,
        SectionKind::Answer,
        SectionKind::Authority,
        SectionKind::Additional,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SectionKind::Question => "question",
            SectionKind::Answer => "answer",
            SectionKind::Authority => "authority",
            SectionKind::Additional => "additional",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resource record type. Codes outside the known table are kept as `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    A,
    NS,
    CNAME,
    SOA,
    NULL,
    PTR,
    HINFO,
    MX,
    TXT,
    SIG,
    KEY,
    AAAA,
    LOC,
    SRV,
    TSIG,
    IXFR,
    AXFR,
    ANY,
    ZXFR,
    Unknown(u16),
}

impl RecordType {
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => RecordType::A,
            2 => RecordType::NS,
            5 => RecordType::CNAME,
            6 => RecordType::SOA,
            10 => RecordType::NULL,
            12 => RecordType::PTR,
            13 => RecordType::HINFO,
            15 => RecordType::MX,
            16 => RecordType::TXT,
            24 => RecordType::SIG,
            25 => RecordType::KEY,
            28 => RecordType::AAAA,
            29 => RecordType::LOC,
            33 => RecordType::SRV,
            250 => RecordType::TSIG,
            251 => RecordType::IXFR,
            252 => RecordType::AXFR,
            255 => RecordType::ANY,
            256 => RecordType::ZXFR,
            other => RecordType::Unknown(other),
        }
    }

    pub fn code(&self) -> u16 {
        match *self {
            RecordType::A => 1,
            RecordType::NS => 2,
            RecordType::CNAME => 5,
            RecordType::SOA => 6,
            RecordType::NULL => 10,
            RecordType::PTR => 12,
            RecordType::HINFO => 13,
            RecordType::MX => 15,
            RecordType::TXT => 16,
            RecordType::SIG => 24,
            RecordType::KEY => 25,
            RecordType::AAAA => 28,
            RecordType::LOC => 29,
            RecordType::SRV => 33,
            RecordType::TSIG => 250,
            RecordType::IXFR => 251,
            RecordType::AXFR => 252,
            RecordType::ANY => 255,
            RecordType::ZXFR => 256,
            RecordType::Unknown(code) => code,
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mnemonic = match *self {
            RecordType::A => "A",
            RecordType::NS => "NS",
            RecordType::CNAME => "CNAME",
            RecordType::SOA => "SOA",
            RecordType::NULL => "NULL",
            RecordType::PTR => "PTR",
            RecordType::HINFO => "HINFO",
            RecordType::MX => "MX",
            RecordType::TXT => "TXT",
            RecordType::SIG => "SIG",
            RecordType::KEY => "KEY",
            RecordType::AAAA => "AAAA",
            RecordType::LOC => "LOC",
            RecordType::SRV => "SRV",
            RecordType::TSIG => "TSIG",
            RecordType::IXFR => "IXFR",
            RecordType::AXFR => "AXFR",
            RecordType::ANY => "ANY",
            RecordType::ZXFR => "ZXFR",
            RecordType::Unknown(code) => return write!(f, "Unknown ({})", code),
        };
        f.write_str(mnemonic)
    }
}

/// Record class. Only IN and NONE are named.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryClass {
    IN,
    None,
    Unknown(u16),
}

impl QueryClass {
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => QueryClass::IN,
            254 => QueryClass::None,
            other => QueryClass::Unknown(other),
        }
    }

    pub fn code(&self) -> u16 {
        match *self {
            QueryClass::IN => 1,
            QueryClass::None => 254,
            QueryClass::Unknown(code) => code,
        }
    }
}

impl fmt::Display for QueryClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            QueryClass::IN => f.write_str("IN"),
            QueryClass::None => f.write_str("None"),
            QueryClass::Unknown(code) => write!(f, "Unknown ({})", code),
        }
    }
}

/// Interpreted record data, keyed by the record's type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RdataValue {
    /// Question records carry no rdata.
    Empty,
    Ipv4(Ipv4Addr),
    /// NS, CNAME, PTR, and the primary name server of an SOA.
    Name(DomainName),
    Mx {
        preference: u16,
        exchange: DomainName,
    },
    /// Everything without a dedicated interpretation.
    Opaque(Vec<u8>),
}

impl fmt::Display for RdataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RdataValue::Empty => Ok(()),
            RdataValue::Ipv4(addr) => write!(f, "{}", addr),
            RdataValue::Name(name) => write!(f, "{}", name),
            RdataValue::Mx {
                preference,
                exchange,
            } => write!(f, "{} {}", preference, exchange),
            // RFC 3597 generic form
            RdataValue::Opaque(bytes) => {
                write!(f, "\\# {}", bytes.len())?;
                if !bytes.is_empty() {
                    f.write_str(" ")?;
                    for byte in bytes {
                        write!(f, "{:02x}", byte)?;
                    }
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub name: DomainName,
    pub record_type: RecordType,
    pub class: QueryClass,
    pub ttl: u32,
    pub rdata: RdataValue,
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let line = format!(
            "{:<23} {:<7} {:<7} {:<7} {}",
            self.name.to_string(),
            self.ttl,
            self.class.to_string(),
            self.record_type.to_string(),
            self.rdata
        );
        f.write_str(line.trim_end())
    }
}

/// A fully decoded DNS message.
///
/// Owns all of its data, so it outlives the buffer it was decoded from.
/// Sections whose declared count is zero are not stored; the accessors
/// report them as empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    id: u16,
    flags: Flags,
    sections: BTreeMap<SectionKind, Vec<Record>>,
}

impl Message {
    pub(crate) fn new(id: u16, flags: Flags, sections: BTreeMap<SectionKind, Vec<Record>>) -> Self {
        Message {
            id,
            flags,
            sections,
        }
    }

    /// Decode a complete wire-format message.
    pub fn decode(packet: &[u8]) -> Result<Message, crate::DecodeError> {
        crate::parsers::decode_message(packet)
    }

    pub fn id(&self) -> u16 {
        self.id
    }

    pub fn flags(&self) -> &Flags {
        &self.flags
    }

    pub fn has_section(&self, kind: SectionKind) -> bool {
        self.sections.contains_key(&kind)
    }

    pub fn section(&self, kind: SectionKind) -> &[Record] {
        self.sections.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn record_count(&self, kind: SectionKind) -> usize {
        self.section(kind).len()
    }

    pub fn record(&self, kind: SectionKind, index: usize) -> Option<&Record> {
        self.section(kind).get(index)
    }

    /// Present sections, in wire order.
    pub fn sections(&self) -> impl Iterator<Item = (SectionKind, &[Record])> {
        self.sections
            .iter()
            .map(|(kind, records)| (*kind, records.as_slice()))
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ID     : {}", self.id)?;
        write!(f, "{}", self.flags)?;
        for (kind, records) in self.sections() {
            write!(f, "\n\n;; {} SECTION:", kind.name().to_uppercase())?;
            for record in records {
                write!(f, "\n{}", record)?;
            }
        }
        Ok(())
    }
}
