use std::net::Ipv4Addr;

use super::cursor::ByteCursor;
use super::name::{decode_name, decode_name_within, DomainName};
use crate::errors::DecodeError;
use crate::protocol::{QueryClass, RdataValue, Record, RecordType};

/// Decode one record at the cursor.
///
/// Question records stop after the class field; every other record also
/// carries ttl, rdlength and exactly rdlength bytes of rdata.
pub fn decode_record(cursor: &mut ByteCursor<'_>, is_question: bool) -> Result<Record, DecodeError> {
    let name = decode_name(cursor)?;
    let record_type = RecordType::from_code(cursor.read_u16()?);
    let class = QueryClass::from_code(cursor.read_u16()?);

    if is_question {
        return Ok(Record {
            name,
            record_type,
            class,
            ttl: 0,
            rdata: RdataValue::Empty,
        });
    }

    let ttl = cursor.read_u32()?;
    let rdlength = cursor.read_u16()?;
    let rdata_start = cursor.position();
    let rdata = cursor.read_bytes(rdlength as usize)?;
    let rdata = decode_rdata(cursor.packet(), record_type, rdata_start, rdata)?;

    Ok(Record {
        name,
        record_type,
        class,
        ttl,
        rdata,
    })
}

/// Interpret rdata by type. Names inside rdata may point anywhere in the
/// packet, so the whole buffer is passed along with the rdata offset.
fn decode_rdata(
    packet: &[u8],
    record_type: RecordType,
    start: usize,
    rdata: &[u8],
) -> Result<RdataValue, DecodeError> {
    let malformed = || DecodeError::Malformed {
        record_type,
        rdlength: rdata.len() as u16,
    };

    match record_type {
        RecordType::A => {
            let octets: [u8; 4] = rdata.try_into().map_err(|_| malformed())?;
            Ok(RdataValue::Ipv4(Ipv4Addr::from(octets)))
        }
        // Only the primary name server of an SOA is interpreted.
        RecordType::NS | RecordType::CNAME | RecordType::SOA | RecordType::PTR => {
            if rdata.is_empty() {
                return Err(malformed());
            }
            let mut cursor = ByteCursor::at(packet, start);
            let name = rdata_name(&mut cursor, start + rdata.len(), malformed)?;
            Ok(RdataValue::Name(name))
        }
        RecordType::MX => {
            if rdata.len() < 3 {
                return Err(malformed());
            }
            let mut cursor = ByteCursor::at(packet, start);
            let preference = cursor.read_u16()?;
            let exchange = rdata_name(&mut cursor, start + rdata.len(), malformed)?;
            Ok(RdataValue::Mx {
                preference,
                exchange,
            })
        }
        _ => Ok(RdataValue::Opaque(rdata.to_vec())),
    }
}

// A name whose in-place part runs past the rdata end is a fault of the
// record, not of whatever follows it.
fn rdata_name(
    cursor: &mut ByteCursor<'_>,
    end: usize,
    malformed: impl Fn() -> DecodeError,
) -> Result<DomainName, DecodeError> {
    decode_name_within(cursor, end).map_err(|e| match e {
        DecodeError::Truncated { .. } => malformed(),
        other => other,
    })
}
