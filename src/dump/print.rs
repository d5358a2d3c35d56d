//! Record-stream listing for `--print` and `--find`
//!
//! Streams the dump without building any index: each record prints as it
//! decodes, so even dumps too large to index comfortably can be listed.

use crate::domain::DumpError;
use crate::dump::record::{DumpParams, Record};
use crate::dump::{self, pointer_info};
use crate::symbols::SymbolTable;
use anyhow::{Context, Result};
use regex::Regex;
use std::io::{Read, Write};

/// Print every record in the dump; with a non-empty `search`, print only
/// Object records whose OID-derived name matches the pattern. Owner
/// records are annotated with their non-zero pointer fields, symbol names
/// included where known.
pub fn print_records<R: Read, W: Write>(
    reader: &mut R,
    search: &str,
    symbols: &mut SymbolTable,
    out: &mut W,
) -> Result<()> {
    let filter = Regex::new(search).with_context(|| format!("bad regex '{search}'"))?;

    dump::read_header(reader).context("reading header")?;

    let mut params: Option<DumpParams> = None;
    loop {
        let record = dump::read_record(reader, symbols)?;
        let eof = matches!(record, Record::EndOfFile);

        if let Record::DumpParams(p) = &record {
            params = Some(p.clone());
        }

        if !search.is_empty() && !eof {
            let matched = match &record {
                Record::Object(object) => filter.is_match(object.name.as_deref().unwrap_or("")),
                _ => false,
            };
            if !matched {
                continue;
            }
        }

        writeln!(out, "{record}")?;

        if let Some(view) = record.owner_view() {
            let params = params
                .as_ref()
                .ok_or(DumpError::OwnerBeforeParams(view.address))?;
            let info = pointer_info(&view, params)?;
            for (i, (&source, &target)) in info.sources.iter().zip(&info.targets).enumerate() {
                if target != 0 {
                    writeln!(
                        out,
                        "  Pointer[{i}]@{} = {}",
                        symbols.format_addr(source),
                        symbols.format_addr(target)
                    )?;
                }
            }
        }

        if eof {
            return Ok(());
        }
    }
}
