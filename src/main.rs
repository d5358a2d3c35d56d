//! heapclimb entry point
//!
//! Loads the OID and symbol registries, then runs exactly one mode:
//! record listing (`--print`/`--find`), anchors, owners, hexdump, or the
//! default ownership-graph export. Exits nonzero on any unrecovered error.

use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser};
use heapclimb::analysis::HeapIndex;
use heapclimb::cli::Args;
use heapclimb::dump::print_records;
use heapclimb::export::{self, DotGraph};
use heapclimb::symbols::SymbolTable;
use log::info;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::process::Command;

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();

    let Some(dumpfile) = args.dumpfile.clone().or_else(|| args.dumpfile_flag.clone()) else {
        eprint!("{}", Args::command().render_help());
        std::process::exit(2);
    };

    let mut symbols = SymbolTable::new();

    if let Some(oid_path) = &args.oid {
        let file = File::open(oid_path)
            .with_context(|| format!("open OID file '{}'", oid_path.display()))?;
        let loaded = symbols
            .load_oids(BufReader::new(file))
            .with_context(|| format!("reading OID file '{}'", oid_path.display()))?;
        info!("loaded {loaded} OIDs from {}", oid_path.display());
    }

    if let Some(program) = &args.program {
        let output = Command::new("nm")
            .arg(program)
            .output()
            .with_context(|| format!("running nm on '{}'", program.display()))?;
        if !output.status.success() {
            bail!(
                "nm on '{}' failed: {}",
                program.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        let loaded = symbols
            .load_symbols(&output.stdout[..])
            .context("reading symbol listing")?;
        info!("loaded {loaded} symbols from {}", program.display());
    }

    let file =
        File::open(&dumpfile).with_context(|| format!("open '{}'", dumpfile.display()))?;
    let mut reader = BufReader::new(file);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if args.print || args.find.is_some() {
        let search = args.find.as_deref().unwrap_or("");
        return print_records(&mut reader, search, &mut symbols, &mut out);
    }

    let index = HeapIndex::build(&mut reader, &mut symbols)
        .with_context(|| format!("reading '{}'", dumpfile.display()))?;

    if args.anchors {
        index.print_anchors(args.address, &mut out)?;
        return Ok(());
    }

    if args.owners != 0 {
        index.print_owners(args.address, args.owners, &mut out)?;
        return Ok(());
    }

    if args.hexdump {
        let dump = index.hexdump(args.address)?;
        out.write_all(dump.as_bytes())?;
        return Ok(());
    }

    let output = File::create(&args.output)
        .with_context(|| format!("create '{}'", args.output.display()))?;
    let mut writer = BufWriter::new(output);
    let mut sink = DotGraph::new();
    export::write_image(&index, &symbols, args.address, &mut sink, &mut writer)?;
    writer.flush()?;
    println!(
        "Wrote ownership graph for 0x{:x} to {}",
        args.address,
        args.output.display()
    );

    Ok(())
}
