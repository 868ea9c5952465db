//! Persistence Adapters
//!
//! Implementations of `LedgerPort`.

pub mod in_memory;
pub mod jsonl;

pub use in_memory::InMemoryLedger;
pub use jsonl::JsonlLedger;
