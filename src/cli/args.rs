//! CLI argument definitions

use crate::symbols;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about = "Reverse-reachability analyzer for Go heap dumps")]
pub struct Args {
    /// Heap dump file to read
    pub dumpfile: Option<PathBuf>,

    /// Heap dump file to read (alternative to the positional argument)
    #[arg(long = "dumpfile", value_name = "PATH", hide = true)]
    pub dumpfile_flag: Option<PathBuf>,

    /// Output file for the ownership graph (Graphviz DOT)
    #[arg(long, value_name = "PATH", default_value = "heapdump.dot")]
    pub output: PathBuf,

    /// File that maps from OIDs to object names
    #[arg(long, value_name = "PATH")]
    pub oid: Option<PathBuf>,

    /// Program binary to read symbol information from (via nm)
    #[arg(long, value_name = "PATH")]
    pub program: Option<PathBuf>,

    /// Address of the object to analyze (decimal or 0x-prefixed hex)
    #[arg(long, value_parser = parse_address, default_value = "0")]
    pub address: u64,

    /// List all dump records and exit
    #[arg(long)]
    pub print: bool,

    /// Print Object records whose name matches the regular expression
    #[arg(long, value_name = "REGEX")]
    pub find: Option<String>,

    /// Print a hexdump of the object at --address and exit
    #[arg(long)]
    pub hexdump: bool,

    /// Print the anchors keeping the object at --address alive
    #[arg(long)]
    pub anchors: bool,

    /// Print owners of the object at --address to this depth
    /// (negative = unbounded, 0 = disabled)
    #[arg(
        long,
        value_name = "DEPTH",
        default_value_t = 0,
        allow_negative_numbers = true
    )]
    pub owners: i64,
}

fn parse_address(s: &str) -> Result<u64, String> {
    symbols::parse_u64(s).ok_or_else(|| format!("invalid address '{s}'"))
}
