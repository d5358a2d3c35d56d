//! Reverse-ownership index built from a single pass over a heap dump
//!
//! Records are decoded once into a flat store; three maps index them by
//! address, by pointee, and by finalized object. Everything is immutable
//! after the build, so queries can run back to back without interfering.

use crate::domain::{DumpError, RecordId};
use crate::dump::{self, pointer_info, DumpParams, Record};
use crate::symbols::SymbolTable;
use log::info;
use std::collections::HashMap;
use std::io::Read;

/// Indexed view of one heap dump.
#[derive(Debug)]
pub struct HeapIndex {
    records: Vec<Record>,
    params: Option<DumpParams>,
    /// Address of every addressable record.
    memory: HashMap<u64, RecordId>,
    /// Pointee address to the records holding a pointer with that exact
    /// target value. Targets may land inside another record's interior.
    owners: HashMap<u64, Vec<RecordId>>,
    /// Object address to its registered or queued finalizer.
    finalizers: HashMap<u64, RecordId>,
}

impl HeapIndex {
    /// Decode an entire dump stream and build the indices. Object records
    /// consult (and extend) the symbol table while decoding.
    ///
    /// The dump parameters record must precede any owner record; owner
    /// pointers cannot be decoded without it.
    pub fn build<R: Read>(
        reader: &mut R,
        symbols: &mut SymbolTable,
    ) -> Result<Self, DumpError> {
        dump::read_header(reader)?;

        let mut index = HeapIndex {
            records: Vec::new(),
            params: None,
            memory: HashMap::new(),
            owners: HashMap::new(),
            finalizers: HashMap::new(),
        };

        loop {
            let record = dump::read_record(reader, symbols)?;
            let id = RecordId(index.records.len());

            match &record {
                Record::EndOfFile => break,
                Record::DumpParams(params) => {
                    if !matches!(params.pointer_size, 2 | 4 | 8) {
                        return Err(DumpError::UnsupportedPointerSize(params.pointer_size));
                    }
                    index.params = Some(params.clone());
                }
                Record::RegisteredFinalizer(fin) | Record::QueuedFinalizer(fin) => {
                    index.finalizers.insert(fin.object_address, id);
                }
                _ => {}
            }

            if let Some(address) = record.address() {
                index.memory.insert(address, id);
            }

            if let Some(view) = record.owner_view() {
                let params = index
                    .params
                    .as_ref()
                    .ok_or(DumpError::OwnerBeforeParams(view.address))?;
                let info = pointer_info(&view, params)?;
                for target in info.targets {
                    if target != 0 {
                        index.owners.entry(target).or_default().push(id);
                    }
                }
            }

            index.records.push(record);
        }

        info!(
            "indexed {} records ({} addressable, {} pointees, {} finalizers)",
            index.records.len(),
            index.memory.len(),
            index.owners.len(),
            index.finalizers.len()
        );

        Ok(index)
    }

    /// All decoded records, in file order (EndOfFile excluded).
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    #[must_use]
    pub fn params(&self) -> Option<&DumpParams> {
        self.params.as_ref()
    }

    #[must_use]
    pub fn record(&self, id: RecordId) -> &Record {
        &self.records[id.0]
    }

    /// The addressable record at `address`, if any.
    #[must_use]
    pub fn record_at(&self, address: u64) -> Option<&Record> {
        self.memory.get(&address).map(|&id| self.record(id))
    }

    /// Records holding a pointer whose target is exactly `address`, in
    /// file order.
    #[must_use]
    pub fn owners_of(&self, address: u64) -> &[RecordId] {
        self.owners.get(&address).map_or(&[], Vec::as_slice)
    }

    /// The finalizer attached to the object at `address`, if any.
    #[must_use]
    pub fn finalizer_for(&self, address: u64) -> Option<&Record> {
        self.finalizers.get(&address).map(|&id| self.record(id))
    }
}
