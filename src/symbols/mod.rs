//! Symbol and OID registries
//!
//! Two read-mostly maps populated before record decoding starts: a 64-bit
//! OID to class-name map (user-provided file) and an absolute-address to
//! symbol-name map (output of the platform `nm` tool). The decoder
//! consults the OID map while post-processing Object records and registers
//! the resulting class names back under each object's address, so pointer
//! annotations and graph edge labels can name instrumented objects.
//!
//! The table is an explicit value owned by the analyzer session; there is
//! no process-wide state.

use log::debug;
use std::collections::HashMap;
use std::io::{self, BufRead};

#[derive(Debug, Default)]
pub struct SymbolTable {
    oids: HashMap<u64, String>,
    names: HashMap<u64, String>,
}

impl SymbolTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_oid(&mut self, oid: u64, class: impl Into<String>) {
        self.oids.insert(oid, class.into());
    }

    pub fn add_name(&mut self, address: u64, name: impl Into<String>) {
        self.names.insert(address, name.into());
    }

    #[must_use]
    pub fn class_for_oid(&self, oid: u64) -> Option<&str> {
        self.oids.get(&oid).map(String::as_str)
    }

    #[must_use]
    pub fn name_for(&self, address: u64) -> Option<&str> {
        self.names.get(&address).map(String::as_str)
    }

    /// Render an address, annotated with its symbol name when known.
    #[must_use]
    pub fn format_addr(&self, address: u64) -> String {
        match self.name_for(address) {
            Some(name) => format!("0x{address:x} ({name})"),
            None => format!("0x{address:x}"),
        }
    }

    /// Load `<oid> <class>` lines. OIDs may be decimal or 0x-prefixed hex;
    /// blank or malformed lines are skipped. Returns the number of entries
    /// loaded.
    pub fn load_oids<R: BufRead>(&mut self, reader: R) -> io::Result<usize> {
        let mut loaded = 0;
        for line in reader.lines() {
            let line = line?;
            let mut parts = line.split_whitespace();
            let (Some(oid), Some(class)) = (parts.next(), parts.next()) else {
                continue;
            };
            match parse_u64(oid) {
                Some(oid) if oid > 0 => {
                    self.add_oid(oid, class);
                    loaded += 1;
                }
                _ => debug!("skipping OID line: {line:?}"),
            }
        }
        Ok(loaded)
    }

    /// Load `nm`-style `<hex-address> <kind> <name>` lines; lines with a
    /// different field count or an unparsable address are skipped. Returns
    /// the number of entries loaded.
    pub fn load_symbols<R: BufRead>(&mut self, reader: R) -> io::Result<usize> {
        let mut loaded = 0;
        for line in reader.lines() {
            let line = line?;
            let parts: Vec<&str> = line.split_whitespace().collect();
            let [address, _kind, name] = parts[..] else {
                continue;
            };
            match u64::from_str_radix(address, 16) {
                Ok(address) => {
                    self.add_name(address, name);
                    loaded += 1;
                }
                Err(_) => debug!("skipping symbol line: {line:?}"),
            }
        }
        Ok(loaded)
    }
}

/// Parse a decimal or 0x-prefixed hexadecimal u64. Shared by the OID
/// loader and the CLI's `--address` option.
#[must_use]
pub fn parse_u64(s: &str) -> Option<u64> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).ok()
    } else {
        s.parse().ok()
    }
}
