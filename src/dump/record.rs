//! Record types for the "go1.7 heap dump" format
//!
//! One variant per wire record kind. Capability accessors replace the
//! original format's notion of "addressable" and "owner" records:
//! [`Record::address`] yields the described construct's address, and
//! [`Record::owner_view`] exposes the contents buffer plus pointer-field
//! offsets for the four variants that carry them (Object, StackFrame,
//! DataSegment, BssSegment).

use std::fmt;

/// A decoded heap-dump record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    EndOfFile,
    Object(Object),
    OtherRoot(OtherRoot),
    TypeDescriptor(TypeDescriptor),
    Goroutine(Goroutine),
    StackFrame(StackFrame),
    DumpParams(DumpParams),
    RegisteredFinalizer(Finalizer),
    Itab(Itab),
    OsThread(OsThread),
    MemStats(Box<MemStats>),
    QueuedFinalizer(Finalizer),
    DataSegment(Segment),
    BssSegment(Segment),
    DeferRecord(DeferRecord),
    PanicRecord(PanicRecord),
    AllocProfile(AllocProfile),
    AllocSample(AllocSample),
}

/// A heap object: contents plus the offsets of its pointer fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Object {
    pub address: u64,
    pub contents: Vec<u8>,
    pub fields: Vec<u64>,
    /// Class name resolved from the object's leading OID cookie, if any.
    pub name: Option<String>,
}

impl Object {
    /// The OID-derived class name, or the generic label.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Object")
    }
}

/// A miscellaneous runtime root (its address is the root pointer's target,
/// not the address of an addressable record).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtherRoot {
    pub description: String,
    pub address: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    pub address: u64,
    pub type_size: u64,
    pub name: String,
    pub indirect: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Goroutine {
    pub address: u64,
    pub stack_pointer: u64,
    pub routine_id: u64,
    pub creator_pointer: u64,
    pub status: GoroutineStatus,
    pub system: bool,
    pub background: bool,
    pub wait_start: u64,
    pub wait_reason: String,
    pub current_context_pointer: u64,
    pub os_thread_descriptor_address: u64,
    pub top_defer: u64,
    pub top_panic: u64,
}

/// Scheduler status of a goroutine. Value 2 is not defined by the format
/// and renders as "Unknown status 2".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoroutineStatus {
    Idle,
    Runnable,
    Syscall,
    Waiting,
    Unknown(u64),
}

impl From<u64> for GoroutineStatus {
    fn from(value: u64) -> Self {
        match value {
            0 => GoroutineStatus::Idle,
            1 => GoroutineStatus::Runnable,
            3 => GoroutineStatus::Syscall,
            4 => GoroutineStatus::Waiting,
            other => GoroutineStatus::Unknown(other),
        }
    }
}

impl fmt::Display for GoroutineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GoroutineStatus::Idle => write!(f, "Idle"),
            GoroutineStatus::Runnable => write!(f, "Runnable"),
            GoroutineStatus::Syscall => write!(f, "Syscall"),
            GoroutineStatus::Waiting => write!(f, "Waiting"),
            GoroutineStatus::Unknown(value) => write!(f, "Unknown status {value}"),
        }
    }
}

/// One frame of a goroutine stack. `child_pointer` is the stack pointer of
/// the next deeper frame, or 0 for the innermost one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrame {
    pub address: u64,
    pub depth: u64,
    pub child_pointer: u64,
    pub contents: Vec<u8>,
    pub entry_pc: u64,
    pub current_pc: u64,
    pub continuation_pc: u64,
    pub name: String,
    pub fields: Vec<u64>,
}

/// Dump-wide parameters; governs how pointer payloads inside owner
/// contents are decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpParams {
    pub big_endian: bool,
    pub pointer_size: u64,
    pub heap_start: u64,
    pub heap_end: u64,
    pub architecture: String,
    pub go_experiment: String,
    pub ncpu: u64,
}

/// A finalizer attachment; registered and queued finalizers share a wire
/// layout and are treated alike by the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finalizer {
    pub object_address: u64,
    pub finalizer_address: u64,
    pub entry_pc: u64,
    pub finalizer_type: u64,
    pub object_type: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Itab {
    pub address: u64,
    pub type_descriptor_address: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsThread {
    pub thread_descriptor_address: u64,
    pub go_id: u64,
    pub os_id: u64,
}

/// Runtime memory statistics snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemStats {
    pub alloc: u64,
    pub total_alloc: u64,
    pub sys: u64,
    pub lookups: u64,
    pub mallocs: u64,
    pub frees: u64,
    pub heap_alloc: u64,
    pub heap_sys: u64,
    pub heap_idle: u64,
    pub heap_inuse: u64,
    pub heap_released: u64,
    pub heap_objects: u64,
    pub stack_inuse: u64,
    pub stack_sys: u64,
    pub mspan_inuse: u64,
    pub mspan_sys: u64,
    pub mcache_inuse: u64,
    pub mcache_sys: u64,
    pub buck_hash_sys: u64,
    pub gc_sys: u64,
    pub other_sys: u64,
    pub next_gc: u64,
    pub last_gc: u64,
    pub pause_total_ns: u64,
    pub pause_ns: [u64; 256],
    pub num_gc: u64,
}

/// A data or BSS segment; which one is recorded by the enclosing variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub address: u64,
    pub contents: Vec<u8>,
    pub fields: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeferRecord {
    pub address: u64,
    pub goroutine: u64,
    pub argp: u64,
    pub pc: u64,
    pub func_val: u64,
    pub entry_pc: u64,
    pub next: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanicRecord {
    pub address: u64,
    pub goroutine: u64,
    pub arg_type: u64,
    pub arg_data: u64,
    pub defer_record: u64,
    pub next: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocProfile {
    pub id: u64,
    pub size: u64,
    pub frames: Vec<ProfileFrame>,
    pub allocation_count: u64,
    pub free_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileFrame {
    pub name: String,
    pub file: String,
    pub line: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocSample {
    pub address: u64,
    pub profile_id: u64,
}

/// Borrowed view of a record that carries contents and pointer fields.
#[derive(Debug, Clone, Copy)]
pub struct OwnerView<'a> {
    pub address: u64,
    pub contents: &'a [u8],
    pub fields: &'a [u64],
}

impl Record {
    /// Address of the in-memory construct this record describes, for the
    /// addressable variants. An OtherRoot's address names its target, not
    /// a record of its own, so it is not addressable.
    #[must_use]
    pub fn address(&self) -> Option<u64> {
        match self {
            Record::Object(r) => Some(r.address),
            Record::TypeDescriptor(r) => Some(r.address),
            Record::Goroutine(r) => Some(r.address),
            Record::StackFrame(r) => Some(r.address),
            Record::Itab(r) => Some(r.address),
            Record::DataSegment(r) | Record::BssSegment(r) => Some(r.address),
            Record::DeferRecord(r) => Some(r.address),
            Record::PanicRecord(r) => Some(r.address),
            Record::AllocSample(r) => Some(r.address),
            _ => None,
        }
    }

    /// Contents and pointer-field offsets, for the four owner variants.
    #[must_use]
    pub fn owner_view(&self) -> Option<OwnerView<'_>> {
        match self {
            Record::Object(r) => Some(OwnerView {
                address: r.address,
                contents: &r.contents,
                fields: &r.fields,
            }),
            Record::StackFrame(r) => Some(OwnerView {
                address: r.address,
                contents: &r.contents,
                fields: &r.fields,
            }),
            Record::DataSegment(r) | Record::BssSegment(r) => Some(OwnerView {
                address: r.address,
                contents: &r.contents,
                fields: &r.fields,
            }),
            _ => None,
        }
    }

    /// Whether this record can pin a heap object on its own.
    #[must_use]
    pub fn is_root(&self) -> bool {
        matches!(
            self,
            Record::OtherRoot(_)
                | Record::StackFrame(_)
                | Record::DataSegment(_)
                | Record::BssSegment(_)
        )
    }

    /// Record kind tag, as used in graph labels and error messages.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Record::EndOfFile => "EndOfFile",
            Record::Object(_) => "Object",
            Record::OtherRoot(_) => "OtherRoot",
            Record::TypeDescriptor(_) => "TypeDescriptor",
            Record::Goroutine(_) => "Goroutine",
            Record::StackFrame(_) => "StackFrame",
            Record::DumpParams(_) => "DumpParams",
            Record::RegisteredFinalizer(_) => "RegisteredFinalizer",
            Record::Itab(_) => "Itab",
            Record::OsThread(_) => "OsThread",
            Record::MemStats(_) => "MemStats",
            Record::QueuedFinalizer(_) => "QueuedFinalizer",
            Record::DataSegment(_) => "DataSegment",
            Record::BssSegment(_) => "BssSegment",
            Record::DeferRecord(_) => "DeferRecord",
            Record::PanicRecord(_) => "PanicRecord",
            Record::AllocProfile(_) => "AllocFreeProfileRecord",
            Record::AllocSample(_) => "AllocStackTraceSample",
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Record::EndOfFile => write!(f, "End Of File"),
            Record::Object(r) => write!(
                f,
                "{} @ 0x{:x} with {} pointers in {} bytes",
                r.display_name(),
                r.address,
                r.fields.len(),
                r.contents.len()
            ),
            Record::OtherRoot(r) => {
                write!(f, "OtherRoot @ 0x{:x}: {}", r.address, r.description)
            }
            Record::TypeDescriptor(r) => write!(
                f,
                "TypeDescriptor for '{}' @ 0x{:x}: Objects are {} bytes",
                r.name, r.address, r.type_size
            ),
            Record::Goroutine(r) => {
                if r.status == GoroutineStatus::Waiting {
                    write!(
                        f,
                        "Goroutine[{}] @ 0x{:x}: {} ({}), Stack @ 0x{:x}",
                        r.routine_id, r.address, r.status, r.wait_reason, r.stack_pointer
                    )
                } else {
                    write!(
                        f,
                        "Goroutine[{}] @ 0x{:x}: {}, Stack @ 0x{:x}",
                        r.routine_id, r.address, r.status, r.stack_pointer
                    )
                }
            }
            Record::StackFrame(r) => write!(
                f,
                "StackFrame[{}] @ 0x{:x}: {} with {} pointers in {} bytes; child = 0x{:x}",
                r.depth,
                r.address,
                r.name,
                r.fields.len(),
                r.contents.len(),
                r.child_pointer
            ),
            Record::DumpParams(r) => write!(
                f,
                "DumpParams: BigEndian={}, PointerSize={}, Heap=0x{:x}-0x{:x}, \
                 Architecture={}, GOEXPERIMENT={}, Cpus={}",
                r.big_endian,
                r.pointer_size,
                r.heap_start,
                r.heap_end,
                r.architecture,
                r.go_experiment,
                r.ncpu
            ),
            Record::RegisteredFinalizer(r) => write!(
                f,
                "RegisteredFinalizer @ 0x{:x}: FuncVal: 0x{:x}, Type: 0x{:x}, Object Type: 0x{:x}",
                r.object_address, r.finalizer_address, r.finalizer_type, r.object_type
            ),
            Record::QueuedFinalizer(r) => write!(
                f,
                "QueuedFinalizer @ 0x{:x}: FuncVal: 0x{:x}, Type: 0x{:x}, Object Type: 0x{:x}",
                r.object_address, r.finalizer_address, r.finalizer_type, r.object_type
            ),
            Record::Itab(r) => {
                write!(f, "Itab @ 0x{:x}: 0x{:x}", r.address, r.type_descriptor_address)
            }
            Record::OsThread(r) => write!(
                f,
                "OsThread @ 0x{:x}: GoId = {}; OsId = 0x{:x}",
                r.thread_descriptor_address, r.go_id, r.os_id
            ),
            Record::MemStats(r) => write!(
                f,
                "MemStats: Alloc={}, TotalAlloc={}, Sys={}, HeapAlloc={}, HeapInuse={}, \
                 HeapObjects={}, PauseTotalNs={}, NumGC={}",
                r.alloc,
                r.total_alloc,
                r.sys,
                r.heap_alloc,
                r.heap_inuse,
                r.heap_objects,
                r.pause_total_ns,
                r.num_gc
            ),
            Record::DataSegment(r) => write!(
                f,
                "DataSegment @ 0x{:x}-0x{:x} with {} pointers",
                r.address,
                r.address + r.contents.len() as u64,
                r.fields.len()
            ),
            Record::BssSegment(r) => write!(
                f,
                "BssSegment @ 0x{:x}-0x{:x} with {} pointers",
                r.address,
                r.address + r.contents.len() as u64,
                r.fields.len()
            ),
            Record::DeferRecord(r) => write!(
                f,
                "DeferRecord @ 0x{:x}: Goroutine 0x{:x}, FuncVal 0x{:x}, Next 0x{:x}",
                r.address, r.goroutine, r.func_val, r.next
            ),
            Record::PanicRecord(r) => write!(
                f,
                "PanicRecord @ 0x{:x}: Goroutine 0x{:x}, Next 0x{:x}",
                r.address, r.goroutine, r.next
            ),
            Record::AllocProfile(r) => write!(
                f,
                "AllocFreeProfileRecord[{}]: {} bytes in {} frames, {} allocs, {} frees",
                r.id,
                r.size,
                r.frames.len(),
                r.allocation_count,
                r.free_count
            ),
            Record::AllocSample(r) => write!(
                f,
                "AllocStackTraceSample @ 0x{:x}: profile {}",
                r.address, r.profile_id
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display_covers_undefined_value() {
        assert_eq!(GoroutineStatus::from(0).to_string(), "Idle");
        assert_eq!(GoroutineStatus::from(1).to_string(), "Runnable");
        assert_eq!(GoroutineStatus::from(2).to_string(), "Unknown status 2");
        assert_eq!(GoroutineStatus::from(3).to_string(), "Syscall");
        assert_eq!(GoroutineStatus::from(4).to_string(), "Waiting");
    }

    #[test]
    fn test_object_display_uses_oid_name() {
        let mut object = Object {
            address: 0x1000,
            contents: vec![0u8; 24],
            fields: vec![0, 8],
            name: None,
        };
        assert_eq!(
            Record::Object(object.clone()).to_string(),
            "Object @ 0x1000 with 2 pointers in 24 bytes"
        );

        object.name = Some("session::Cache".to_owned());
        assert_eq!(
            Record::Object(object).to_string(),
            "session::Cache @ 0x1000 with 2 pointers in 24 bytes"
        );
    }

    #[test]
    fn test_other_root_is_rooty_but_not_addressable() {
        let root = Record::OtherRoot(OtherRoot {
            description: "finalizer queue".to_owned(),
            address: 0x8000,
        });
        assert!(root.is_root());
        assert_eq!(root.address(), None);
        assert!(root.owner_view().is_none());
    }

    #[test]
    fn test_owner_view_exposes_contents_and_fields() {
        let segment = Record::BssSegment(Segment {
            address: 0x6000,
            contents: vec![1, 2, 3, 4],
            fields: vec![0],
        });
        let view = segment.owner_view().unwrap();
        assert_eq!(view.address, 0x6000);
        assert_eq!(view.contents, &[1, 2, 3, 4]);
        assert_eq!(view.fields, &[0]);
        assert_eq!(segment.address(), Some(0x6000));
    }
}
