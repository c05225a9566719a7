// crates/warden-verify/src/verifier.rs
//
// ProofVerifier implementations.
//
// StubVerifier: switchable accept/reject/error double that records every call.
// DigestVerifier: recomputes `DigestProver` words and compares them.

use std::sync::Mutex;

use warden_core::error::WardenError;
use warden_core::traits::{ProofInputs, ProofVerifier};
use warden_core::types::{Address, Proof};

use crate::prover::proof_word;

/// What a `StubVerifier` answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StubMode {
    Accept,
    Reject,
    /// Fail with `WardenError::Verifier` carrying this message.
    Error(String),
}

#[derive(Debug)]
struct StubState {
    mode: StubMode,
    calls: Vec<(ProofInputs, Proof)>,
}

/// A test double for the external proof verifier.
///
/// Does NOT check proofs. It answers according to its mode and keeps every
/// `(inputs, proof)` pair it was asked about.
#[derive(Debug)]
pub struct StubVerifier {
    address: Address,
    state: Mutex<StubState>,
}

impl StubVerifier {
    pub fn new(address: Address, mode: StubMode) -> Self {
        Self {
            address,
            state: Mutex::new(StubState {
                mode,
                calls: Vec::new(),
            }),
        }
    }

    /// A stub that accepts every proof.
    pub fn accepting(address: Address) -> Self {
        Self::new(address, StubMode::Accept)
    }

    /// A stub that rejects every proof.
    pub fn rejecting(address: Address) -> Self {
        Self::new(address, StubMode::Reject)
    }

    pub fn set_mode(&self, mode: StubMode) {
        match self.state.lock() {
            Ok(mut state) => state.mode = mode,
            Err(poisoned) => poisoned.into_inner().mode = mode,
        }
    }

    /// Number of verification calls received.
    pub fn call_count(&self) -> usize {
        self.calls().len()
    }

    /// Every `(inputs, proof)` pair received, oldest first.
    pub fn calls(&self) -> Vec<(ProofInputs, Proof)> {
        match self.state.lock() {
            Ok(state) => state.calls.clone(),
            Err(poisoned) => poisoned.into_inner().calls.clone(),
        }
    }

    pub fn last_inputs(&self) -> Option<ProofInputs> {
        self.calls().last().map(|(inputs, _)| *inputs)
    }
}

impl ProofVerifier for StubVerifier {
    fn address(&self) -> Address {
        self.address
    }

    fn verify_proof(&self, inputs: &ProofInputs, proof: &Proof) -> Result<bool, WardenError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| WardenError::Verifier("stub verifier lock poisoned".to_string()))?;
        state.calls.push((*inputs, *proof));
        match &state.mode {
            StubMode::Accept => Ok(true),
            StubMode::Reject => Ok(false),
            StubMode::Error(msg) => Err(WardenError::Verifier(msg.clone())),
        }
    }
}

/// Verifier for transparent digest proofs produced by `DigestProver`.
#[derive(Debug, Clone, Copy)]
pub struct DigestVerifier {
    address: Address,
}

impl DigestVerifier {
    pub fn new(address: Address) -> Self {
        Self { address }
    }
}

impl ProofVerifier for DigestVerifier {
    fn address(&self) -> Address {
        self.address
    }

    fn verify_proof(&self, inputs: &ProofInputs, proof: &Proof) -> Result<bool, WardenError> {
        let valid = proof
            .words()
            .iter()
            .enumerate()
            .all(|(i, word)| *word == proof_word(&self.address, inputs, i as u8));
        if !valid {
            tracing::debug!("Digest proof mismatch for nullifier {}", inputs.nullifier_hash);
        }
        Ok(valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prover::DigestProver;
    use warden_core::types::Field;

    fn inputs() -> ProofInputs {
        ProofInputs {
            root: Field::from_u64(10),
            group_id: Field::from_u64(1),
            signal_hash: Field::from_u64(20),
            nullifier_hash: Field::from_u64(30),
            external_nullifier_hash: Field::from_u64(40),
        }
    }

    #[test]
    fn test_stub_modes() {
        let stub = StubVerifier::accepting(Address([1; 20]));
        let proof = Proof([Field::ZERO; 8]);
        assert!(stub.verify_proof(&inputs(), &proof).unwrap());

        stub.set_mode(StubMode::Reject);
        assert!(!stub.verify_proof(&inputs(), &proof).unwrap());

        stub.set_mode(StubMode::Error("rpc down".to_string()));
        assert!(matches!(
            stub.verify_proof(&inputs(), &proof),
            Err(WardenError::Verifier(msg)) if msg == "rpc down"
        ));
        assert_eq!(stub.call_count(), 3);
        assert_eq!(stub.last_inputs(), Some(inputs()));
    }

    #[test]
    fn test_rejecting_stub_records_calls() {
        let addr = Address([2; 20]);
        let stub = StubVerifier::rejecting(addr);
        assert_eq!(stub.address(), addr);
        assert!(!stub.verify_proof(&inputs(), &Proof([Field::ZERO; 8])).unwrap());
        assert_eq!(stub.call_count(), 1);

        stub.set_mode(StubMode::Accept);
        assert!(stub.verify_proof(&inputs(), &Proof([Field::ZERO; 8])).unwrap());
    }

    #[test]
    fn test_digest_verifier_accepts_matching_proof() {
        let addr = Address([5; 20]);
        let proof = DigestProver::new(addr).prove(&inputs());
        assert!(DigestVerifier::new(addr).verify_proof(&inputs(), &proof).unwrap());
    }

    #[test]
    fn test_digest_verifier_rejects_other_inputs() {
        let addr = Address([5; 20]);
        let proof = DigestProver::new(addr).prove(&inputs());
        let mut tampered = inputs();
        tampered.signal_hash = Field::from_u64(21);
        assert!(!DigestVerifier::new(addr).verify_proof(&tampered, &proof).unwrap());
    }

    #[test]
    fn test_digest_verifier_rejects_other_verifier_address() {
        let proof = DigestProver::new(Address([5; 20])).prove(&inputs());
        assert!(!DigestVerifier::new(Address([6; 20]))
            .verify_proof(&inputs(), &proof)
            .unwrap());
    }
}
