//! Core domain types shared across the analyzer

pub mod errors;

pub use errors::{DumpError, QueryError};

/// Index of a decoded record in the analyzer's flat record store.
///
/// The reverse-ownership graph is cyclic in the data (A can own B while B
/// owns A), so the indices hold these flat handles instead of references
/// between records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordId(pub usize);
