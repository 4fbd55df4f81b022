//! Hand-built wire fixtures for unit tests.
//!
//! There is no encoder in the crate, so tests assemble packets byte by byte
//! with `BufMut`.

use bytes::{BufMut, BytesMut};

/// Encode a dotted name as uncompressed labels followed by the root byte.
pub fn encode_name(name: &str) -> Vec<u8> {
    let mut dst = BytesMut::new();
    put_name(&mut dst, name);
    dst.to_vec()
}

pub fn put_name(dst: &mut BytesMut, name: &str) {
    for label in name.split('.') {
        // Skip empty labels (e.g., from trailing dots)
        if label.is_empty() {
            continue;
        }
        dst.put_u8(label.len() as u8);
        dst.put_slice(label.as_bytes());
    }
    dst.put_u8(0);
}

/// Builder for test packets. Counts are written exactly as given, so a
/// fixture can lie about them.
pub struct PacketBuilder {
    buf: BytesMut,
}

impl PacketBuilder {
    pub fn new(id: u16, flags: u16, counts: [u16; 4]) -> Self {
        let mut buf = BytesMut::with_capacity(512);
        buf.put_u16(id);
        buf.put_u16(flags);
        for count in counts {
            buf.put_u16(count);
        }
        PacketBuilder { buf }
    }

    pub fn offset(&self) -> usize {
        self.buf.len()
    }

    pub fn name(mut self, name: &str) -> Self {
        put_name(&mut self.buf, name);
        self
    }

    pub fn pointer(mut self, offset: u16) -> Self {
        self.buf.put_u16(0xC000 | offset);
        self
    }

    pub fn question(self, name: &str, qtype: u16, qclass: u16) -> Self {
        self.name(name).u16(qtype).u16(qclass)
    }

    /// Type, class, ttl, rdlength and rdata following an already written name.
    pub fn record_body(self, rtype: u16, rclass: u16, ttl: u32, rdata: &[u8]) -> Self {
        self.u16(rtype)
            .u16(rclass)
            .u32(ttl)
            .u16(rdata.len() as u16)
            .bytes(rdata)
    }

    pub fn u16(mut self, value: u16) -> Self {
        self.buf.put_u16(value);
        self
    }

    pub fn u32(mut self, value: u32) -> Self {
        self.buf.put_u32(value);
        self
    }

    pub fn bytes(mut self, data: &[u8]) -> Self {
        self.buf.put_slice(data);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.buf.to_vec()
    }
}

/// Query for www.company.example, type A class IN, ID 0xF2EB with RD set.
pub fn company_query() -> Vec<u8> {
    PacketBuilder::new(0xF2EB, 0x0100, [1, 0, 0, 0])
        .question("www.company.example", 1, 1)
        .build()
}

/// Response for oreilly.com MX: one answer, two NS authority records and an
/// A glue record, all compressed against the question name at offset 12.
pub fn oreilly_response() -> Vec<u8> {
    PacketBuilder::new(0x1d2c, 0x8180, [1, 1, 2, 1])
        .question("oreilly.com", 15, 1)
        // answer: MX 20 smtp1.oreilly.com
        .pointer(12)
        .record_body(
            15,
            1,
            3600,
            &[0x00, 0x14, 0x05, b's', b'm', b't', b'p', b'1', 0xc0, 0x0c],
        )
        // authority: NS ns1.oreilly.com, NS ns2.oreilly.com
        .pointer(12)
        .record_body(2, 1, 86400, &[0x03, b'n', b's', b'1', 0xc0, 0x0c])
        .pointer(12)
        .record_body(2, 1, 86400, &[0x03, b'n', b's', b'2', 0xc0, 0x0c])
        // additional: smtp1.oreilly.com A 192.168.1.1
        .bytes(&[0x05, b's', b'm', b't', b'p', b'1'])
        .pointer(12)
        .record_body(1, 1, 300, &[0xc0, 0xa8, 0x01, 0x01])
        .build()
}
