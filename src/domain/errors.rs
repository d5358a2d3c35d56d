//! Structured error types for heapclimb
//!
//! Using thiserror for automatic Display implementation and error chaining.

use thiserror::Error;

/// Errors raised while decoding a heap-dump byte stream or building the
/// reverse-ownership index. Any of these aborts the build.
#[derive(Error, Debug)]
pub enum DumpError {
    #[error("bad dump header: read {0:?} where \"go1.7 heap dump\\n\" was expected")]
    MalformedHeader(String),

    #[error("unexpected record tag {0}")]
    UnknownRecordTag(u64),

    #[error("varint overflows a 64-bit integer")]
    VarintOverflow,

    #[error("owner record at 0x{0:x} appears before the dump parameters record")]
    OwnerBeforeParams(u64),

    #[error("cannot handle pointers of size {0}")]
    UnsupportedPointerSize(u64),

    #[error(
        "pointer field at offset {offset} does not fit in the {len}-byte contents of the record at 0x{address:x}"
    )]
    FieldOutOfRange { address: u64, offset: u64, len: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors raised by queries against a built index.
///
/// Traversals prune the failing branch and keep walking siblings; only a
/// failure at the queried address itself reaches the caller.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("no record found for address 0x{0:x}")]
    RecordNotFound(u64),

    #[error("record {kind} at 0x{address:x} has no contents")]
    NoContents { address: u64, kind: &'static str },

    #[error("loop: already visited address 0x{0:x}")]
    Loop(u64),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
