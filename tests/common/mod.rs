//! Shared builder for well-formed heap-dump byte streams
//!
//! Tests assemble dumps in memory instead of shipping fixture files; the
//! builder mirrors the wire grammar (LEB128 varints, length-prefixed
//! strings and byte runs, zero-terminated field lists).

#![allow(dead_code)]

pub struct DumpWriter {
    buf: Vec<u8>,
}

impl DumpWriter {
    /// Start a dump with the magic header in place.
    pub fn new() -> Self {
        Self { buf: b"go1.7 heap dump\n".to_vec() }
    }

    /// Start an empty stream (for malformed-header tests).
    pub fn bare() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn raw(&mut self, data: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(data);
        self
    }

    pub fn uvarint(&mut self, mut value: u64) -> &mut Self {
        loop {
            let mut byte = (value & 0x7f) as u8;
            value >>= 7;
            if value != 0 {
                byte |= 0x80;
            }
            self.buf.push(byte);
            if value == 0 {
                return self;
            }
        }
    }

    pub fn bytes(&mut self, data: &[u8]) -> &mut Self {
        self.uvarint(data.len() as u64).raw(data)
    }

    pub fn string(&mut self, s: &str) -> &mut Self {
        self.bytes(s.as_bytes())
    }

    pub fn bool(&mut self, value: bool) -> &mut Self {
        self.uvarint(u64::from(value))
    }

    /// Field list: every offset written with kind 1, then the terminator.
    pub fn field_list(&mut self, offsets: &[u64]) -> &mut Self {
        for &offset in offsets {
            self.uvarint(1).uvarint(offset);
        }
        self.uvarint(0)
    }

    /// DumpParams for a little-endian, 8-byte-pointer dump.
    pub fn params_le64(&mut self) -> &mut Self {
        self.params(false, 8)
    }

    pub fn params(&mut self, big_endian: bool, pointer_size: u64) -> &mut Self {
        self.uvarint(6)
            .bool(big_endian)
            .uvarint(pointer_size)
            .uvarint(0x10000)
            .uvarint(0xffff_0000)
            .string("amd64")
            .string("")
            .uvarint(4)
    }

    pub fn object(&mut self, address: u64, contents: &[u8], fields: &[u64]) -> &mut Self {
        self.uvarint(1).uvarint(address).bytes(contents).field_list(fields)
    }

    pub fn other_root(&mut self, description: &str, address: u64) -> &mut Self {
        self.uvarint(2).string(description).uvarint(address)
    }

    pub fn stack_frame(
        &mut self,
        address: u64,
        depth: u64,
        child_pointer: u64,
        contents: &[u8],
        name: &str,
        fields: &[u64],
    ) -> &mut Self {
        self.uvarint(5)
            .uvarint(address)
            .uvarint(depth)
            .uvarint(child_pointer)
            .bytes(contents)
            .uvarint(0x40_0000)
            .uvarint(0x40_0010)
            .uvarint(0)
            .string(name)
            .field_list(fields)
    }

    pub fn registered_finalizer(&mut self, object_address: u64) -> &mut Self {
        self.uvarint(7)
            .uvarint(object_address)
            .uvarint(0xdead)
            .uvarint(0xbeef)
            .uvarint(1)
            .uvarint(2)
    }

    pub fn data_segment(&mut self, address: u64, contents: &[u8], fields: &[u64]) -> &mut Self {
        self.uvarint(12).uvarint(address).bytes(contents).field_list(fields)
    }

    pub fn bss_segment(&mut self, address: u64, contents: &[u8], fields: &[u64]) -> &mut Self {
        self.uvarint(13).uvarint(address).bytes(contents).field_list(fields)
    }

    pub fn itab(&mut self, address: u64, type_descriptor: u64) -> &mut Self {
        self.uvarint(8).uvarint(address).uvarint(type_descriptor)
    }

    pub fn eof(&mut self) -> &mut Self {
        self.uvarint(0)
    }

    pub fn finish(&self) -> Vec<u8> {
        self.buf.clone()
    }
}

/// 8-byte little-endian pointer payload.
pub fn ptr_le(value: u64) -> [u8; 8] {
    value.to_le_bytes()
}
