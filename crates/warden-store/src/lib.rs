// crates/warden-store/src/lib.rs
//
// warden-store: Ledger storage backends for the Warden trust layer.
//
// Provides an in-memory store for tests and ephemeral runs, and a
// RocksDB-backed store that applies each transaction as one atomic batch.

pub mod memory;
pub mod rocks;

// Re-export key types for ergonomic access from downstream crates.
pub use memory::MemoryStore;
pub use rocks::RocksStore;
