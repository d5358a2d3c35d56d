//! Ownership traversals: owners-to-depth, root anchors, hexdump
//!
//! Both walks climb the reverse-ownership edges away from pointer
//! direction, from a queried address up toward whatever pins it. Each call
//! owns a fresh visited set, so queries are independent of one another and
//! terminate on cyclic ownership.

use crate::analysis::HeapIndex;
use crate::domain::QueryError;
use crate::dump::Record;
use crate::format;
use log::debug;
use std::collections::HashSet;
use std::io::Write;

impl HeapIndex {
    /// Print the record at `address`, then the owners pinning it, `depth`
    /// levels up (negative for unbounded). Cycles are pruned silently; a
    /// branch that fails is reported inline and pruned while its siblings
    /// continue.
    pub fn print_owners<W: Write>(
        &self,
        address: u64,
        depth: i64,
        out: &mut W,
    ) -> Result<(), QueryError> {
        let mut visited = HashSet::new();
        // One extra level so the queried record itself prints before
        // `depth` levels of owners.
        let depth = if depth > 0 { depth + 1 } else { depth };
        self.walk_owners(address, depth, "", &mut visited, out)
    }

    fn walk_owners<W: Write>(
        &self,
        address: u64,
        depth: i64,
        indent: &str,
        visited: &mut HashSet<u64>,
        out: &mut W,
    ) -> Result<(), QueryError> {
        if depth == 0 {
            return Ok(());
        }
        if !visited.insert(address) {
            return Ok(());
        }
        let record = self
            .record_at(address)
            .ok_or(QueryError::RecordNotFound(address))?;
        writeln!(out, "{indent}{record}")?;

        let child_indent = format!("{indent}  ");
        for &id in self.owners_of(address) {
            let Some(owner_address) = self.record(id).address() else {
                continue;
            };
            if let Err(err) =
                self.walk_owners(owner_address, depth - 1, &child_indent, visited, out)
            {
                writeln!(out, "{child_indent}{err}")?;
            }
        }
        Ok(())
    }

    /// Print every root anchor that transitively pins `address`. An object
    /// pinned along several independent paths lists each root it reaches.
    pub fn print_anchors<W: Write>(&self, address: u64, out: &mut W) -> Result<(), QueryError> {
        let mut visited = HashSet::new();
        self.walk_anchors(address, &mut visited, out)
    }

    fn walk_anchors<W: Write>(
        &self,
        address: u64,
        visited: &mut HashSet<u64>,
        out: &mut W,
    ) -> Result<(), QueryError> {
        if !visited.insert(address) {
            return Err(QueryError::Loop(address));
        }
        let record = self
            .record_at(address)
            .ok_or(QueryError::RecordNotFound(address))?;

        if record.is_root() {
            writeln!(out, "{record}")?;
            if let Record::StackFrame(frame) = record {
                // Deeper frames of the same stack, down to the running
                // one; stop at a zero pointer, a missing frame, or a
                // frame already printed (corrupt dumps can cycle).
                let mut seen = HashSet::new();
                let mut child = frame.child_pointer;
                while child != 0 && seen.insert(child) {
                    match self.record_at(child) {
                        Some(Record::StackFrame(frame)) => {
                            writeln!(out, "  [{}] {}", frame.depth, frame.name)?;
                            child = frame.child_pointer;
                        }
                        _ => break,
                    }
                }
            }
        }

        for &id in self.owners_of(address) {
            let Some(owner_address) = self.record(id).address() else {
                continue;
            };
            if let Err(err) = self.walk_anchors(owner_address, visited, out) {
                debug!("anchor walk pruned: {err}");
            }
        }
        Ok(())
    }

    /// Canonical hexdump of the contents at `address`, followed by one
    /// line per pointer-field offset.
    pub fn hexdump(&self, address: u64) -> Result<String, QueryError> {
        let record = self
            .record_at(address)
            .ok_or(QueryError::RecordNotFound(address))?;
        let view = record.owner_view().ok_or(QueryError::NoContents {
            address,
            kind: record.kind_name(),
        })?;

        let mut out = format::hexdump(view.contents);
        for &field in view.fields {
            out.push_str(&format!("Pointer: 0x{field:x}\n"));
        }
        Ok(out)
    }
}
