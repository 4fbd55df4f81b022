use std::collections::BTreeMap;

use tracing::debug;

use super::cursor::ByteCursor;
use super::header::decode_header;
use super::record::decode_record;
use crate::errors::DecodeError;
use crate::protocol::{Message, SectionKind};

/// Decode a complete DNS message.
///
/// The header is followed by exactly the declared number of records in
/// each section, and nothing else: the first failure, or any bytes left
/// over after the last record, fails the whole message.
pub fn decode_message(packet: &[u8]) -> Result<Message, DecodeError> {
    let mut cursor = ByteCursor::new(packet);
    let header = decode_header(&mut cursor)?;

    debug!(
        target: "dns_inspect::header",
        packet_id = header.id,
        query_response = if header.flags.is_response { "Response" } else { "Query" },
        opcode = header.flags.opcode_name(),
        authoritative = header.flags.authoritative,
        truncated = header.flags.truncated,
        recursion_desired = header.flags.recursion_desired,
        recursion_available = header.flags.recursion_available,
        response_code = header.flags.response_code_name(),
        question_count = header.qdcount,
        answer_count = header.ancount,
        authority_count = header.nscount,
        additional_count = header.arcount,
        "DNS header parsed"
    );

    let mut sections = BTreeMap::new();
    for kind in SectionKind::ALL {
        let count = header.count(kind);
        if count == 0 {
            continue;
        }

        // Every record needs at least a root name, type and class.
        let mut records = Vec::with_capacity((count as usize).min(cursor.remaining() / 5));
        for _ in 0..count {
            records.push(decode_record(&mut cursor, kind == SectionKind::Question)?);
        }
        debug!(section = %kind, records = records.len(), "section decoded");
        sections.insert(kind, records);
    }

    if !cursor.is_empty() {
        return Err(DecodeError::TrailingBytes {
            offset: cursor.position(),
            remaining: cursor.remaining(),
        });
    }

    Ok(Message::new(header.id, header.flags, sections))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{company_query, oreilly_response, PacketBuilder};
    use crate::protocol::{QueryClass, RdataValue, RecordType};
    use rand::{rngs::StdRng, Rng, SeedableRng};

    #[test]
    fn test_company_query() {
        let message = decode_message(&company_query()).unwrap();

        assert_eq!(message.id(), 0xF2EB);
        assert!(!message.flags().is_response);
        assert!(message.flags().recursion_desired);
        assert_eq!(message.record_count(SectionKind::Question), 1);

        let question = message.record(SectionKind::Question, 0).unwrap();
        assert_eq!(question.name, "www.company.example");
        assert_eq!(question.record_type, RecordType::A);
        assert_eq!(question.class, QueryClass::IN);

        for kind in [
            SectionKind::Answer,
            SectionKind::Authority,
            SectionKind::Additional,
        ] {
            assert!(!message.has_section(kind));
        }
    }

    #[test]
    fn test_oreilly_response() {
        let message = decode_message(&oreilly_response()).unwrap();

        assert_eq!(message.id(), 0x1d2c);
        let flags = message.flags();
        assert!(flags.is_response && flags.recursion_desired && flags.recursion_available);
        assert!(!flags.authoritative && !flags.truncated);
        assert_eq!(flags.response_code, 0);

        let kinds: Vec<_> = message.sections().map(|(kind, _)| kind).collect();
        assert_eq!(kinds, SectionKind::ALL.to_vec());

        let answer = &message.section(SectionKind::Answer)[0];
        assert_eq!(answer.name, "oreilly.com");
        assert_eq!(answer.rdata.to_string(), "20 smtp1.oreilly.com");

        let authority: Vec<String> = message
            .section(SectionKind::Authority)
            .iter()
            .map(|record| record.rdata.to_string())
            .collect();
        assert_eq!(authority, ["ns1.oreilly.com", "ns2.oreilly.com"]);

        let glue = message.record(SectionKind::Additional, 0).unwrap();
        assert_eq!(glue.name, "smtp1.oreilly.com");
        assert_eq!(glue.ttl, 300);
        assert_eq!(
            glue.rdata,
            RdataValue::Ipv4(std::net::Ipv4Addr::new(192, 168, 1, 1))
        );
    }

    #[test]
    fn test_header_fields_survive() {
        // id, flags and counts as written into the fixture
        let packet = PacketBuilder::new(0xBEEF, 0x8583, [1, 0, 1, 0])
            .question("example.net", 6, 1)
            .pointer(12)
            .record_body(6, 1, 900, &[0x02, b'n', b's', 0xC0, 0x0C])
            .build();
        let message = decode_message(&packet).unwrap();

        assert_eq!(message.id(), 0xBEEF);
        let flags = message.flags();
        assert!(flags.is_response && flags.authoritative && flags.recursion_desired);
        assert!(flags.recursion_available);
        assert_eq!(flags.response_code, 3);
        assert_eq!(message.record_count(SectionKind::Question), 1);
        assert_eq!(message.record_count(SectionKind::Answer), 0);
        assert_eq!(message.record_count(SectionKind::Authority), 1);
        assert_eq!(message.record_count(SectionKind::Additional), 0);
        assert_eq!(
            message.section(SectionKind::Authority)[0].rdata.to_string(),
            "ns.example.net"
        );
    }

    #[test]
    fn test_short_buffers_are_truncated() {
        let packet = company_query();
        for len in 0..12 {
            assert!(matches!(
                decode_message(&packet[..len]),
                Err(DecodeError::Truncated { .. })
            ));
        }
    }

    #[test]
    fn test_header_only_message() {
        let packet = PacketBuilder::new(9, 0, [0, 0, 0, 0]).build();
        let message = decode_message(&packet).unwrap();
        assert_eq!(message.sections().count(), 0);
    }

    #[test]
    fn test_missing_record_aborts_decode() {
        // header promises two answers, only one is present
        let packet = PacketBuilder::new(1, 0x8180, [1, 2, 0, 0])
            .question("oreilly.com", 1, 1)
            .pointer(12)
            .record_body(1, 1, 60, &[10, 0, 0, 1])
            .build();
        assert!(matches!(
            decode_message(&packet),
            Err(DecodeError::Truncated { .. })
        ));
    }

    #[test]
    fn test_first_error_wins() {
        // malformed A in the answer, self-referencing pointer after it
        let packet = PacketBuilder::new(1, 0x8180, [1, 1, 1, 0])
            .question("oreilly.com", 1, 1)
            .pointer(12)
            .record_body(1, 1, 60, &[10, 0, 0])
            .pointer(44)
            .build();
        assert_eq!(
            decode_message(&packet),
            Err(DecodeError::Malformed {
                record_type: RecordType::A,
                rdlength: 3
            })
        );
    }

    #[test]
    fn test_unterminated_rdata_name_blames_its_record() {
        // CNAME rdata "a" with no terminator, then an additional record
        // whose name opens with a reserved label type
        let packet = PacketBuilder::new(1, 0x8180, [1, 1, 0, 1])
            .question("oreilly.com", 5, 1)
            .pointer(12)
            .record_body(5, 1, 60, &[0x01, b'a'])
            .bytes(&[0x80, 0x00, 0x01, 0x00, 0x01])
            .u32(60)
            .u16(0)
            .build();
        assert_eq!(
            decode_message(&packet),
            Err(DecodeError::Malformed {
                record_type: RecordType::CNAME,
                rdlength: 2
            })
        );
    }

    #[test]
    fn test_self_pointer_in_question() {
        let packet = PacketBuilder::new(1, 0, [1, 0, 0, 0])
            .pointer(12)
            .u16(1)
            .u16(1)
            .build();
        assert!(matches!(
            decode_message(&packet),
            Err(DecodeError::CompressionLoop { .. })
        ));
    }

    #[test]
    fn test_pointer_past_end() {
        let packet = PacketBuilder::new(1, 0, [1, 0, 0, 0])
            .pointer(0x3FFF)
            .u16(1)
            .u16(1)
            .build();
        assert_eq!(
            decode_message(&packet),
            Err(DecodeError::OutOfBounds {
                offset: 0x3FFF,
                len: packet.len()
            })
        );
    }

    #[test]
    fn test_trailing_bytes() {
        let mut packet = company_query();
        let len = packet.len();
        packet.extend_from_slice(&[0, 0]);
        assert_eq!(
            decode_message(&packet),
            Err(DecodeError::TrailingBytes {
                offset: len,
                remaining: 2
            })
        );
    }

    #[test]
    fn test_message_outlives_buffer() {
        let message = {
            let packet = oreilly_response();
            decode_message(&packet).unwrap()
        };
        assert_eq!(message.record_count(SectionKind::Authority), 2);
    }

    #[test]
    fn test_random_buffers_are_rejected() {
        let mut rng = StdRng::seed_from_u64(0x5eed_d0d0);
        for _ in 0..50 {
            let len = rng.gen_range(20..80);
            let mut packet = vec![0u8; len];
            rng.fill(&mut packet[..]);
            assert!(decode_message(&packet).is_err(), "decoded {:02x?}", packet);
        }
    }

    #[test]
    fn test_every_prefix_fails_cleanly() {
        let packet = oreilly_response();
        for len in 0..packet.len() {
            assert!(decode_message(&packet[..len]).is_err());
        }
        assert!(decode_message(&packet).is_ok());
    }

    #[test]
    fn test_rendering() {
        let message = decode_message(&oreilly_response()).unwrap();
        let expected = [
            "ID     : 7468",
            "Headers:",
            "  Type               : answer",
            "  Opcode             : 0",
            "  Authoritative      : false",
            "  Truncated          : false",
            "  Recursion Desired  : true",
            "  Recursion Available: true",
            "  Response Code      : 0",
            "",
            ";; QUESTION SECTION:",
            "oreilly.com             0       IN      MX",
            "",
            ";; ANSWER SECTION:",
            "oreilly.com             3600    IN      MX      20 smtp1.oreilly.com",
            "",
            ";; AUTHORITY SECTION:",
            "oreilly.com             86400   IN      NS      ns1.oreilly.com",
            "oreilly.com             86400   IN      NS      ns2.oreilly.com",
            "",
            ";; ADDITIONAL SECTION:",
            "smtp1.oreilly.com       300     IN      A       192.168.1.1",
        ]
        .join("\n");
        assert_eq!(message.to_string(), expected);
    }
}
