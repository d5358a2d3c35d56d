//! Pointer extraction from owner records
//!
//! An owner's field list names byte offsets inside its contents; the value
//! at each offset is a pointer of the dump's pointer size and byte order.

use crate::domain::DumpError;
use crate::dump::record::{DumpParams, OwnerView};
use byteorder::{BigEndian, ByteOrder, LittleEndian};

/// Parallel source/target sequences for every pointer field of an owner:
/// `sources[i]` is the absolute address of field `i` and `targets[i]` the
/// pointer value stored there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointerInfo {
    pub sources: Vec<u64>,
    pub targets: Vec<u64>,
}

/// Decode every pointer field of `owner` under `params`.
pub fn pointer_info(
    owner: &OwnerView<'_>,
    params: &DumpParams,
) -> Result<PointerInfo, DumpError> {
    let size = params.pointer_size;
    let mut sources = Vec::with_capacity(owner.fields.len());
    let mut targets = Vec::with_capacity(owner.fields.len());

    for &offset in owner.fields {
        let start = usize::try_from(offset)
            .ok()
            .filter(|&start| start <= owner.contents.len());
        let end = start
            .and_then(|start| start.checked_add(size as usize))
            .filter(|&end| end <= owner.contents.len());
        let (Some(start), Some(end)) = (start, end) else {
            return Err(DumpError::FieldOutOfRange {
                address: owner.address,
                offset,
                len: owner.contents.len(),
            });
        };

        let window = &owner.contents[start..end];
        let target = match (size, params.big_endian) {
            (2, false) => u64::from(LittleEndian::read_u16(window)),
            (2, true) => u64::from(BigEndian::read_u16(window)),
            (4, false) => u64::from(LittleEndian::read_u32(window)),
            (4, true) => u64::from(BigEndian::read_u32(window)),
            (8, false) => LittleEndian::read_u64(window),
            (8, true) => BigEndian::read_u64(window),
            _ => return Err(DumpError::UnsupportedPointerSize(size)),
        };

        sources.push(owner.address + offset);
        targets.push(target);
    }

    Ok(PointerInfo { sources, targets })
}

/// First pointer source within `owner` whose decoded target equals
/// `target`, or 0 when none does. Used to label graph edges with the
/// symbol of the pointing location.
#[must_use]
pub fn pointer_source_for_target(
    owner: &OwnerView<'_>,
    target: u64,
    params: &DumpParams,
) -> u64 {
    match pointer_info(owner, params) {
        Ok(info) => info
            .targets
            .iter()
            .position(|&t| t == target)
            .map_or(0, |i| info.sources[i]),
        Err(_) => 0,
    }
}
