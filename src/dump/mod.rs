//! Heap-dump wire format: record types, streaming decoder, pointer
//! extraction, record listing
//!
//! The format is the "go1.7 heap dump" record stream: a 16-byte magic
//! header, then varint-tagged records through EndOfFile. See the
//! heapdump15-through-heapdump17 format notes for the field tables.

pub mod decoder;
pub mod pointers;
pub mod print;
pub mod record;
pub mod varint;

pub use decoder::{read_header, read_record, HEADER};
pub use pointers::{pointer_info, pointer_source_for_target, PointerInfo};
pub use print::print_records;
pub use record::{DumpParams, GoroutineStatus, OwnerView, Record};
