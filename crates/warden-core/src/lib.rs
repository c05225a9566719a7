// crates/warden-core/src/lib.rs
//
// warden-core: Core types, errors, and ledger primitives for the Warden
// trust layer.
//
// This is the leaf crate that all other crates in the workspace depend on.
// It defines the fixed-width identity types, the error enum, the field hash
// shared with the external proof verifier, the ledger store trait with its
// buffered transaction, and the event types every component publishes.

pub mod crypto;
pub mod error;
pub mod events;
pub mod ledger;
pub mod traits;
pub mod types;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use warden_core::Address;`

pub use types::{Address, CallContext, Field, Proof, ReportId, Timestamp, PROOF_WORDS};

pub use crypto::{external_nullifier_hash, hash_to_field, signal_hash};

pub use error::{Role, WardenError};

pub use events::{EventLog, EventSink, LedgerEvent, TracingSink};

pub use ledger::{scan_table, Table, Transaction, WriteOp};

pub use traits::{LedgerStore, ProofInputs, ProofVerifier};

/// Basis-point denominator: 10,000 bps = 100%.
pub const BASIS_POINTS: u32 = 10_000;
