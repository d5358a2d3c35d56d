//! Streaming decoder for the heap-dump record format
//!
//! A dump is the 16-byte magic header followed by varint-tagged records,
//! ending with an EndOfFile record. Decoding is strictly sequential; any
//! failure aborts the stream.

use crate::domain::DumpError;
use crate::dump::record::{
    AllocProfile, AllocSample, DeferRecord, DumpParams, Finalizer, Goroutine, GoroutineStatus,
    Itab, MemStats, Object, OsThread, OtherRoot, PanicRecord, ProfileFrame, Record, Segment,
    StackFrame, TypeDescriptor,
};
use crate::dump::varint::{
    read_bool, read_bytes, read_field_list, read_string, read_uvarint, read_uvarint_vec,
};
use crate::symbols::SymbolTable;
use byteorder::{ByteOrder, LittleEndian};
use std::io::{self, Read};

/// Magic bytes opening every supported dump.
pub const HEADER: &[u8; 16] = b"go1.7 heap dump\n";

mod tag {
    pub const EOF: u64 = 0;
    pub const OBJECT: u64 = 1;
    pub const OTHER_ROOT: u64 = 2;
    pub const TYPE_DESCRIPTOR: u64 = 3;
    pub const GOROUTINE: u64 = 4;
    pub const STACK_FRAME: u64 = 5;
    pub const DUMP_PARAMS: u64 = 6;
    pub const REGISTERED_FINALIZER: u64 = 7;
    pub const ITAB: u64 = 8;
    pub const OS_THREAD: u64 = 9;
    pub const MEM_STATS: u64 = 10;
    pub const QUEUED_FINALIZER: u64 = 11;
    pub const DATA_SEGMENT: u64 = 12;
    pub const BSS_SEGMENT: u64 = 13;
    pub const DEFER_RECORD: u64 = 14;
    pub const PANIC_RECORD: u64 = 15;
    pub const ALLOC_PROFILE: u64 = 16;
    pub const ALLOC_SAMPLE: u64 = 17;
}

/// Consume and verify the dump header. A short or mismatching prefix is a
/// [`DumpError::MalformedHeader`].
pub fn read_header<R: Read>(reader: &mut R) -> Result<(), DumpError> {
    let mut buf = [0u8; HEADER.len()];
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
    if filled < buf.len() || buf != *HEADER {
        return Err(DumpError::MalformedHeader(
            String::from_utf8_lossy(&buf[..filled]).into_owned(),
        ));
    }
    Ok(())
}

/// Decode one record: a varint tag, then the tag's field sequence.
///
/// Object records consult the symbol table's OID map and register any
/// resolved class name back under the object's address, so later graph
/// labels can name the pointing location.
pub fn read_record<R: Read>(
    reader: &mut R,
    symbols: &mut SymbolTable,
) -> Result<Record, DumpError> {
    let tag = read_uvarint(reader)?;
    match tag {
        tag::EOF => Ok(Record::EndOfFile),
        tag::OBJECT => read_object(reader, symbols).map(Record::Object),
        tag::OTHER_ROOT => read_other_root(reader).map(Record::OtherRoot),
        tag::TYPE_DESCRIPTOR => read_type_descriptor(reader).map(Record::TypeDescriptor),
        tag::GOROUTINE => read_goroutine(reader).map(Record::Goroutine),
        tag::STACK_FRAME => read_stack_frame(reader).map(Record::StackFrame),
        tag::DUMP_PARAMS => read_dump_params(reader).map(Record::DumpParams),
        tag::REGISTERED_FINALIZER => read_finalizer(reader).map(Record::RegisteredFinalizer),
        tag::ITAB => read_itab(reader).map(Record::Itab),
        tag::OS_THREAD => read_os_thread(reader).map(Record::OsThread),
        tag::MEM_STATS => read_mem_stats(reader).map(|m| Record::MemStats(Box::new(m))),
        tag::QUEUED_FINALIZER => read_finalizer(reader).map(Record::QueuedFinalizer),
        tag::DATA_SEGMENT => read_segment(reader).map(Record::DataSegment),
        tag::BSS_SEGMENT => read_segment(reader).map(Record::BssSegment),
        tag::DEFER_RECORD => read_defer(reader).map(Record::DeferRecord),
        tag::PANIC_RECORD => read_panic(reader).map(Record::PanicRecord),
        tag::ALLOC_PROFILE => read_alloc_profile(reader).map(Record::AllocProfile),
        tag::ALLOC_SAMPLE => read_alloc_sample(reader).map(Record::AllocSample),
        other => Err(DumpError::UnknownRecordTag(other)),
    }
}

fn read_object<R: Read>(reader: &mut R, symbols: &mut SymbolTable) -> Result<Object, DumpError> {
    let address = read_uvarint(reader)?;
    let contents = read_bytes(reader)?;
    let fields = read_field_list(reader)?;

    let mut object = Object { address, contents, fields, name: None };

    // User-instrumented objects carry a little-endian OID cookie in their
    // first eight bytes, independent of the dump's byte order.
    if object.contents.len() >= 8 {
        let oid = LittleEndian::read_u64(&object.contents[..8]);
        if let Some(class) = symbols.class_for_oid(oid) {
            let class = class.to_owned();
            symbols.add_name(address, class.clone());
            object.name = Some(class);
        }
    }

    Ok(object)
}

fn read_other_root<R: Read>(reader: &mut R) -> Result<OtherRoot, DumpError> {
    Ok(OtherRoot {
        description: read_string(reader)?,
        address: read_uvarint(reader)?,
    })
}

fn read_type_descriptor<R: Read>(reader: &mut R) -> Result<TypeDescriptor, DumpError> {
    Ok(TypeDescriptor {
        address: read_uvarint(reader)?,
        type_size: read_uvarint(reader)?,
        name: read_string(reader)?,
        indirect: read_bool(reader)?,
    })
}

fn read_goroutine<R: Read>(reader: &mut R) -> Result<Goroutine, DumpError> {
    Ok(Goroutine {
        address: read_uvarint(reader)?,
        stack_pointer: read_uvarint(reader)?,
        routine_id: read_uvarint(reader)?,
        creator_pointer: read_uvarint(reader)?,
        status: GoroutineStatus::from(read_uvarint(reader)?),
        system: read_bool(reader)?,
        background: read_bool(reader)?,
        wait_start: read_uvarint(reader)?,
        wait_reason: read_string(reader)?,
        current_context_pointer: read_uvarint(reader)?,
        os_thread_descriptor_address: read_uvarint(reader)?,
        top_defer: read_uvarint(reader)?,
        top_panic: read_uvarint(reader)?,
    })
}

fn read_stack_frame<R: Read>(reader: &mut R) -> Result<StackFrame, DumpError> {
    Ok(StackFrame {
        address: read_uvarint(reader)?,
        depth: read_uvarint(reader)?,
        child_pointer: read_uvarint(reader)?,
        contents: read_bytes(reader)?,
        entry_pc: read_uvarint(reader)?,
        current_pc: read_uvarint(reader)?,
        continuation_pc: read_uvarint(reader)?,
        name: read_string(reader)?,
        fields: read_field_list(reader)?,
    })
}

fn read_dump_params<R: Read>(reader: &mut R) -> Result<DumpParams, DumpError> {
    Ok(DumpParams {
        big_endian: read_bool(reader)?,
        pointer_size: read_uvarint(reader)?,
        heap_start: read_uvarint(reader)?,
        heap_end: read_uvarint(reader)?,
        architecture: read_string(reader)?,
        go_experiment: read_string(reader)?,
        ncpu: read_uvarint(reader)?,
    })
}

fn read_finalizer<R: Read>(reader: &mut R) -> Result<Finalizer, DumpError> {
    Ok(Finalizer {
        object_address: read_uvarint(reader)?,
        finalizer_address: read_uvarint(reader)?,
        entry_pc: read_uvarint(reader)?,
        finalizer_type: read_uvarint(reader)?,
        object_type: read_uvarint(reader)?,
    })
}

fn read_itab<R: Read>(reader: &mut R) -> Result<Itab, DumpError> {
    Ok(Itab {
        address: read_uvarint(reader)?,
        type_descriptor_address: read_uvarint(reader)?,
    })
}

fn read_os_thread<R: Read>(reader: &mut R) -> Result<OsThread, DumpError> {
    Ok(OsThread {
        thread_descriptor_address: read_uvarint(reader)?,
        go_id: read_uvarint(reader)?,
        os_id: read_uvarint(reader)?,
    })
}

fn read_mem_stats<R: Read>(reader: &mut R) -> Result<MemStats, DumpError> {
    let mut stats = MemStats {
        alloc: read_uvarint(reader)?,
        total_alloc: read_uvarint(reader)?,
        sys: read_uvarint(reader)?,
        lookups: read_uvarint(reader)?,
        mallocs: read_uvarint(reader)?,
        frees: read_uvarint(reader)?,
        heap_alloc: read_uvarint(reader)?,
        heap_sys: read_uvarint(reader)?,
        heap_idle: read_uvarint(reader)?,
        heap_inuse: read_uvarint(reader)?,
        heap_released: read_uvarint(reader)?,
        heap_objects: read_uvarint(reader)?,
        stack_inuse: read_uvarint(reader)?,
        stack_sys: read_uvarint(reader)?,
        mspan_inuse: read_uvarint(reader)?,
        mspan_sys: read_uvarint(reader)?,
        mcache_inuse: read_uvarint(reader)?,
        mcache_sys: read_uvarint(reader)?,
        buck_hash_sys: read_uvarint(reader)?,
        gc_sys: read_uvarint(reader)?,
        other_sys: read_uvarint(reader)?,
        next_gc: read_uvarint(reader)?,
        last_gc: read_uvarint(reader)?,
        pause_total_ns: read_uvarint(reader)?,
        pause_ns: [0u64; 256],
        num_gc: 0,
    };
    let pauses = read_uvarint_vec(reader, 256)?;
    stats.pause_ns.copy_from_slice(&pauses);
    stats.num_gc = read_uvarint(reader)?;
    Ok(stats)
}

fn read_segment<R: Read>(reader: &mut R) -> Result<Segment, DumpError> {
    Ok(Segment {
        address: read_uvarint(reader)?,
        contents: read_bytes(reader)?,
        fields: read_field_list(reader)?,
    })
}

fn read_defer<R: Read>(reader: &mut R) -> Result<DeferRecord, DumpError> {
    Ok(DeferRecord {
        address: read_uvarint(reader)?,
        goroutine: read_uvarint(reader)?,
        argp: read_uvarint(reader)?,
        pc: read_uvarint(reader)?,
        func_val: read_uvarint(reader)?,
        entry_pc: read_uvarint(reader)?,
        next: read_uvarint(reader)?,
    })
}

fn read_panic<R: Read>(reader: &mut R) -> Result<PanicRecord, DumpError> {
    Ok(PanicRecord {
        address: read_uvarint(reader)?,
        goroutine: read_uvarint(reader)?,
        arg_type: read_uvarint(reader)?,
        arg_data: read_uvarint(reader)?,
        defer_record: read_uvarint(reader)?,
        next: read_uvarint(reader)?,
    })
}

fn read_alloc_profile<R: Read>(reader: &mut R) -> Result<AllocProfile, DumpError> {
    let id = read_uvarint(reader)?;
    let size = read_uvarint(reader)?;
    let frame_count = read_uvarint(reader)?;
    let mut frames = Vec::with_capacity(frame_count as usize);
    for _ in 0..frame_count {
        frames.push(ProfileFrame {
            name: read_string(reader)?,
            file: read_string(reader)?,
            line: read_uvarint(reader)?,
        });
    }
    Ok(AllocProfile {
        id,
        size,
        frames,
        allocation_count: read_uvarint(reader)?,
        free_count: read_uvarint(reader)?,
    })
}

fn read_alloc_sample<R: Read>(reader: &mut R) -> Result<AllocSample, DumpError> {
    Ok(AllocSample {
        address: read_uvarint(reader)?,
        profile_id: read_uvarint(reader)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_header_accepts_magic() {
        let mut reader = &HEADER[..];
        assert!(read_header(&mut reader).is_ok());
    }

    #[test]
    fn test_read_header_rejects_mismatch_and_short_input() {
        let mut reader = &b"go1.6 heap dump\n"[..];
        assert!(matches!(
            read_header(&mut reader),
            Err(DumpError::MalformedHeader(_))
        ));

        let mut reader = &b"go1.7"[..];
        assert!(matches!(
            read_header(&mut reader),
            Err(DumpError::MalformedHeader(_))
        ));
    }

    #[test]
    fn test_unknown_tag_is_reported_with_value() {
        let mut symbols = SymbolTable::new();
        let mut reader = &[99u8][..];
        assert!(matches!(
            read_record(&mut reader, &mut symbols),
            Err(DumpError::UnknownRecordTag(99))
        ));
    }
}
