//! # heapclimb - reverse-reachability analyzer for Go heap dumps
//!
//! heapclimb reads heap-dump files in the "go1.7 heap dump" format and
//! answers the question operators actually ask while chasing a leak: what
//! keeps this object alive? Given an address it lists the chain of owners
//! pointing at the object, the root anchors (stack frames, data/BSS
//! segments, other runtime roots) pinning it, and can draw the whole owner
//! neighborhood as a Graphviz DOT graph.
//!
//! ## Architecture Overview
//!
//! ```text
//! dump bytes ──▶ dump::decoder ──▶ Record stream
//!                     │                  │
//!              symbols::SymbolTable      ▼
//!              (OID + nm names)   analysis::HeapIndex
//!                     │           (memory / owners / finalizers)
//!                     │                  │
//!                     └────────┬─────────┤
//!                              ▼         ▼
//!                        export::graph  analysis walks
//!                        (DOT output)   (owners / anchors / hexdump)
//! ```
//!
//! ## Module Structure
//!
//! - [`dump`]: wire-format primitives, record types, the streaming
//!   decoder, pointer extraction, and record listing
//! - [`symbols`]: OID and symbol registries loaded before decoding
//! - [`analysis`]: the reverse-ownership index and its traversal queries
//! - [`export`]: owner-graph construction and the DOT rendering backend
//! - [`cli`]: command-line argument parsing
//! - [`domain`]: error types and small shared newtypes
//! - [`format`]: size pretty-printing and canonical hexdumps
//!
//! Everything is single-threaded and synchronous: one pass builds the
//! indices, and each query runs to completion on the caller's thread
//! against the immutable index.

pub mod analysis;
pub mod cli;
pub mod domain;
pub mod dump;
pub mod export;
pub mod format;
pub mod symbols;
