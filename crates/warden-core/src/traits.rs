// crates/warden-core/src/traits.rs

use crate::error::WardenError;
use crate::ledger::{Table, WriteOp};
use crate::types::{Address, Field, Proof};

/// Trait for the persistent key-value ledger.
///
/// Implemented by warden-store (in-memory and RocksDB backends).
pub trait LedgerStore: Send + Sync {
    /// Read one value.
    fn get(&self, table: Table, key: &[u8]) -> Result<Option<Vec<u8>>, WardenError>;

    /// List every `(key, value)` pair in a table, ordered by key.
    fn scan(&self, table: Table) -> Result<Vec<(Vec<u8>, Vec<u8>)>, WardenError>;

    /// Apply a batch of writes. Either all of them land or none do.
    fn commit(&self, writes: Vec<WriteOp>) -> Result<(), WardenError>;
}

/// Public inputs of an identity proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProofInputs {
    pub root: Field,
    pub group_id: Field,
    pub signal_hash: Field,
    pub nullifier_hash: Field,
    pub external_nullifier_hash: Field,
}

/// Trait for zero-knowledge proof verification.
///
/// Implemented by warden-verify. The gate treats it as a trusted, synchronous
/// oracle.
pub trait ProofVerifier: Send + Sync {
    /// Ledger address of the verifier this capability speaks for.
    fn address(&self) -> Address;

    /// Verify a proof. Returns `true` if the proof is valid for `inputs`.
    fn verify_proof(&self, inputs: &ProofInputs, proof: &Proof) -> Result<bool, WardenError>;
}
